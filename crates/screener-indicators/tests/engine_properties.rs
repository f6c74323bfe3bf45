//! 지표 엔진 통합 테스트.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use screener_core::{OhlcvPoint, OhlcvSeries};
use screener_indicators::{IndicatorEngine, IndicatorSeries, UpdatePlanner, MIN_HISTORY};

const CODE: &str = "600519";

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

/// (수익률, 고가 폭, 저가 폭, 거래량) 목록으로 랜덤 워크 시계열을 만듭니다.
fn build_series(steps: &[(f64, f64, f64, f64)]) -> OhlcvSeries {
    let mut close = 100.0;
    let points = steps
        .iter()
        .enumerate()
        .map(|(i, &(ret, up, down, volume))| {
            let open = close;
            close *= 1.0 + ret;
            let high = open.max(close) * (1.0 + up);
            let low = open.min(close) * (1.0 - down);
            OhlcvPoint::new(
                start_date() + Duration::days(i as i64),
                CODE,
                open,
                high,
                low,
                close,
                volume,
            )
        })
        .collect();
    OhlcvSeries::new(CODE, points)
}

fn linear_series(len: usize) -> OhlcvSeries {
    let points = (0..len)
        .map(|i| {
            let close = 10.0 + i as f64;
            OhlcvPoint::new(
                start_date() + Duration::days(i as i64),
                CODE,
                close - 0.5,
                close + 0.5,
                close - 1.0,
                close,
                5_000.0,
            )
        })
        .collect();
    OhlcvSeries::new(CODE, points)
}

fn step() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (-0.08f64..0.08, 0.0f64..0.04, 0.0f64..0.04, 0.0f64..2_000_000.0)
}

fn arb_series(len: std::ops::Range<usize>) -> impl Strategy<Value = OhlcvSeries> {
    prop::collection::vec(step(), len).prop_map(|steps| build_series(&steps))
}

fn all_finite(series: &IndicatorSeries) -> bool {
    series
        .rows
        .iter()
        .all(|row| row.values.to_vec().iter().all(|v| v.is_finite()))
}

fn bits(series: &IndicatorSeries) -> Vec<Vec<u64>> {
    series
        .rows
        .iter()
        .map(|row| row.values.to_vec().iter().map(|v| v.to_bits()).collect())
        .collect()
}

proptest! {
    #[test]
    fn short_series_yields_empty_result(series in arb_series(0..MIN_HISTORY)) {
        let result = IndicatorEngine::new().compute(&series).unwrap();
        prop_assert!(result.is_empty());
    }

    #[test]
    fn outputs_are_always_finite(series in arb_series(MIN_HISTORY..160)) {
        let result = IndicatorEngine::new().compute(&series).unwrap();
        prop_assert_eq!(result.len(), series.len() - MIN_HISTORY + 1);
        prop_assert!(all_finite(&result));
    }

    #[test]
    fn engine_is_idempotent(series in arb_series(MIN_HISTORY..120)) {
        let engine = IndicatorEngine::new();
        let first = engine.compute(&series).unwrap();
        let second = engine.compute(&series).unwrap();
        prop_assert_eq!(first.dates(), second.dates());
        prop_assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn filter_equals_post_hoc_restriction(
        series in arb_series(MIN_HISTORY..120),
        offset in 0i64..140,
    ) {
        let watermark = start_date() + Duration::days(offset);
        let engine = IndicatorEngine::new();

        let full = engine.compute(&series).unwrap();
        let expected: Vec<_> = full.rows.iter().filter(|r| r.date > watermark).cloned().collect();
        let filtered = UpdatePlanner::filter(full, Some(watermark));

        prop_assert_eq!(filtered.rows, expected);
    }

    #[test]
    fn later_watermark_yields_date_suffix(
        series in arb_series(MIN_HISTORY..120),
        w1 in 0i64..120,
        gap in 1i64..40,
    ) {
        let engine = IndicatorEngine::new();
        let full = engine.compute(&series).unwrap();
        let earlier = UpdatePlanner::filter(full.clone(), Some(start_date() + Duration::days(w1)));
        let later = UpdatePlanner::filter(full, Some(start_date() + Duration::days(w1 + gap)));

        prop_assert!(later.len() <= earlier.len());
        let suffix = &earlier.rows[earlier.len() - later.len()..];
        prop_assert_eq!(suffix, later.rows.as_slice());
    }
}

#[test]
fn linear_uptrend_example() {
    let result = IndicatorEngine::new().compute(&linear_series(40)).unwrap();
    assert_eq!(result.len(), 7);

    let macdh: Vec<f64> = result.rows.iter().map(|r| r.values.macdh).collect();
    assert!(macdh.iter().all(|h| *h > 0.0), "macdh: {macdh:?}");

    for row in &result.rows {
        assert!((row.values.rsi - 100.0).abs() < 1e-9);
        assert!((row.values.rsi_6 - 100.0).abs() < 1e-9);
    }

    let obv: Vec<f64> = result.rows.iter().map(|r| r.values.obv).collect();
    assert!(obv.windows(2).all(|w| w[1] > w[0]), "obv: {obv:?}");
}

#[test]
fn vr_is_zero_without_down_volume() {
    let result = IndicatorEngine::new().compute(&linear_series(60)).unwrap();
    assert!(result.rows.iter().all(|r| r.values.vr == 0.0));
    assert!(result.rows.iter().all(|r| r.values.vr_6_sma == 0.0));
}

#[test]
fn flat_market_is_all_finite() {
    let points = (0..80)
        .map(|i| {
            OhlcvPoint::new(
                start_date() + Duration::days(i),
                CODE,
                10.0,
                10.0,
                10.0,
                10.0,
                0.0,
            )
        })
        .collect();
    let result = IndicatorEngine::new()
        .compute(&OhlcvSeries::new(CODE, points))
        .unwrap();

    assert_eq!(result.len(), 80 - 33);
    assert!(all_finite(&result));
}

#[test]
fn amount_changes_only_cr_family() {
    let base = linear_series(60);
    let mut with_amount = base.clone();
    for point in &mut with_amount.points {
        let close = point.close.unwrap_or_default();
        point.amount = Some((close + 0.3) * 5_000.0);
    }

    let engine = IndicatorEngine::new();
    let plain = engine.compute(&base).unwrap();
    let turnover = engine.compute(&with_amount).unwrap();

    let last_plain = plain.last().unwrap().values;
    let last_turnover = turnover.last().unwrap().values;
    assert_ne!(last_plain.cr, last_turnover.cr);
    assert_eq!(last_plain.macd, last_turnover.macd);
    assert_eq!(last_plain.mfi, last_turnover.mfi);
}
