//! 심리 지표 (Sentiment Indicators).
//!
//! - PSY (Psychological Line): 상승일 비율
//! - BRAR: 전일 종가(BR), 시가(AR) 대비 매수/매도 에너지
//! - ENE (Envelope): EMA ± 표준편차 밴드
//! - RVI (Relative Vigor Index)
//! - CR: 전일 중간 가격 대비 매수/매도 에너지

use super::{typical_price, BandResult, IndicatorFamily};
use crate::primitives::{
    diff, ema, flag, percent_ratio, positive, ratio, rolling_sum, safe_div, shift, sma, stddev,
    sub, swma4,
};
use crate::series::IndicatorColumns;
use crate::validator::ValidSeries;

/// PSY 기간 / 이동평균 기간.
pub const PSY_PERIODS: (usize, usize) = (12, 6);
/// BRAR 기간.
pub const BRAR_PERIOD: usize = 26;
/// ENE 기간.
pub const ENE_PERIOD: usize = 25;
/// ENE 표준편차 배수.
pub const ENE_MULTIPLIER: f64 = 2.0;
/// RVI 기간.
pub const RVI_PERIOD: usize = 10;
/// CR 기간.
pub const CR_PERIOD: usize = 26;
/// CR 이동평균 기간 (ma1, ma2, ma3).
pub const CR_MA_PERIODS: [usize; 3] = [5, 10, 20];

/// CR 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrResult {
    /// CR
    pub cr: Vec<f64>,
    /// CR 이동평균 (5, 10, 20)
    pub ma: [Vec<f64>; 3],
}

/// 심리 지표 계산기.
#[derive(Debug, Default)]
pub struct SentimentIndicators;

impl SentimentIndicators {
    /// 새로운 심리 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// PSY 계산: `100 × (n일 중 상승일 수) / n`.
    pub fn psy(&self, close: &[f64], period: usize) -> Vec<f64> {
        let up_days = flag(&diff(close, 1), |d| d > 0.0);
        rolling_sum(&up_days, period)
            .into_iter()
            .map(|count| 100.0 * count / period as f64)
            .collect()
    }

    /// BR, AR 계산.
    ///
    /// - BR = 100 × Σmax(H - C_prev, 0) / Σmax(C_prev - L, 0)
    /// - AR = 100 × Σmax(H - O, 0) / Σmax(O - L, 0)
    pub fn brar(
        &self,
        open: &[f64],
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        let prev_close = shift(close, 1);
        let br_up = positive(&sub(high, &prev_close));
        let br_down = positive(&sub(&prev_close, low));
        let br = percent_ratio(
            &rolling_sum(&br_up, period),
            &rolling_sum(&br_down, period),
        );

        let ar_up = positive(&sub(high, open));
        let ar_down = positive(&sub(open, low));
        let ar = percent_ratio(
            &rolling_sum(&ar_up, period),
            &rolling_sum(&ar_down, period),
        );

        (br, ar)
    }

    /// ENE 계산: `EMA(C) ± k × StdDev(C)`.
    pub fn envelope(&self, close: &[f64], period: usize, k: f64) -> BandResult {
        BandResult::around(ema(close, period), &stddev(close, period), k)
    }

    /// RVI 계산.
    ///
    /// RVI = SMA(SWMA(C - O)) / SMA(SWMA(H - L)), 시그널은 RVI의 SWMA.
    pub fn rvi(
        &self,
        open: &[f64],
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        let numerator = sma(&swma4(&sub(close, open)), period);
        let denominator = sma(&swma4(&sub(high, low)), period);
        let rvi = ratio(&numerator, &denominator);
        let signal = swma4(&rvi);
        (rvi, signal)
    }

    /// 중간 가격 (CR 기준가).
    ///
    /// 거래대금이 있으면 `거래대금 / 거래량`, 없거나 거래량이 0이면
    /// `(H + L + C) / 3`입니다.
    pub fn mid_price(&self, series: &ValidSeries) -> Vec<f64> {
        let typical = typical_price(&series.high, &series.low, &series.close);
        match &series.amount {
            Some(amount) => (0..typical.len())
                .map(|i| {
                    if series.volume[i] == 0.0 {
                        typical[i]
                    } else {
                        safe_div(amount[i], series.volume[i])
                    }
                })
                .collect(),
            None => typical,
        }
    }

    /// CR 계산.
    ///
    /// 전일 중간 가격 `m`에 대해 `100 × Σmax(H - m, 0) / Σmax(m - L, 0)`.
    pub fn cr(&self, series: &ValidSeries, period: usize) -> CrResult {
        let prev_mid = shift(&self.mid_price(series), 1);
        let up = positive(&sub(&series.high, &prev_mid));
        let down = positive(&sub(&prev_mid, &series.low));
        let cr = percent_ratio(&rolling_sum(&up, period), &rolling_sum(&down, period));

        let ma = CR_MA_PERIODS.map(|n| sma(&cr, n));
        CrResult { cr, ma }
    }
}

impl IndicatorFamily for SentimentIndicators {
    fn name(&self) -> &'static str {
        "sentiment"
    }

    fn fill(&self, series: &ValidSeries, out: &mut IndicatorColumns) {
        let (open, high, low, close) = (&series.open, &series.high, &series.low, &series.close);

        let (psy_period, psy_ma) = PSY_PERIODS;
        out.psy = self.psy(close, psy_period);
        out.psyma = sma(&out.psy, psy_ma);

        let (br, ar) = self.brar(open, high, low, close, BRAR_PERIOD);
        out.br = br;
        out.ar = ar;

        let ene = self.envelope(close, ENE_PERIOD, ENE_MULTIPLIER);
        out.ene_ue = ene.upper;
        out.ene = ene.middle;
        out.ene_le = ene.lower;

        let (rvi, rvis) = self.rvi(open, high, low, close, RVI_PERIOD);
        out.rvi = rvi;
        out.rvis = rvis;

        let CrResult {
            cr,
            ma: [ma1, ma2, ma3],
        } = self.cr(series, CR_PERIOD);
        out.cr = cr;
        out.cr_ma1 = ma1;
        out.cr_ma2 = ma2;
        out.cr_ma3 = ma3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{assert_close, linear_series, zigzag_series};

    #[test]
    fn test_psy_counts_up_days() {
        let close: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        let psy = SentimentIndicators::new().psy(&close, 12);

        assert!(psy[11].is_nan());
        assert_close(psy[12], 50.0);

        let rising: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert_close(SentimentIndicators::new().psy(&rising, 12)[19], 100.0);
    }

    #[test]
    fn test_ar_symmetric_bars() {
        // 시가가 고가/저가의 정중앙 → AR = 100
        let open = vec![10.0; 30];
        let high = vec![11.0; 30];
        let low = vec![9.0; 30];
        let close = vec![10.0; 30];
        let (br, ar) = SentimentIndicators::new().brar(&open, &high, &low, &close, 26);

        assert!(ar[24].is_nan());
        assert_close(ar[25], 100.0);
        assert!(br[25].is_nan());
        assert_close(br[26], 100.0);
    }

    #[test]
    fn test_br_zero_when_no_down_energy() {
        let open = vec![10.0; 30];
        let high = vec![12.0; 30];
        let low = vec![10.0; 30];
        let close = vec![10.0; 30];
        let (br, _) = SentimentIndicators::new().brar(&open, &high, &low, &close, 26);
        assert_eq!(br[29], 0.0);
    }

    #[test]
    fn test_envelope_constant() {
        let close = vec![20.0; 30];
        let ene = SentimentIndicators::new().envelope(&close, 25, 2.0);
        assert_close(ene.middle[29], 20.0);
        assert_close(ene.upper[29], 20.0);
        assert!(ene.middle[23].is_nan());
    }

    #[test]
    fn test_rvi_warmup() {
        let series = zigzag_series(40);
        let (rvi, rvis) = SentimentIndicators::new().rvi(
            &series.open,
            &series.high,
            &series.low,
            &series.close,
            10,
        );
        assert!(rvi[11].is_nan());
        assert!(!rvi[12].is_nan());
        assert!(rvis[14].is_nan());
        assert!(!rvis[15].is_nan());
    }

    #[test]
    fn test_rvi_constant_bodies() {
        // C - O = 0.5, H - L = 2
        let series = linear_series(40, 10.0, 1.0);
        let (rvi, rvis) = SentimentIndicators::new().rvi(
            &series.open,
            &series.high,
            &series.low,
            &series.close,
            RVI_PERIOD,
        );
        assert_close(rvi[12], 0.25);
        assert_close(rvi[39], 0.25);
        assert!(rvis[14].is_nan());
        assert_close(rvis[15], 0.25);
    }

    #[test]
    fn test_mid_price_uses_amount_when_present() {
        let mut series = linear_series(3, 10.0, 1.0);
        let calc = SentimentIndicators::new();
        assert_close(calc.mid_price(&series)[0], 10.0);

        series.amount = Some(vec![10_500.0, 0.0, 12_000.0]);
        series.volume = vec![1000.0, 0.0, 1000.0];
        let mid = calc.mid_price(&series);
        assert_close(mid[0], 10.5);
        // 거래량 0 → 대표 가격
        assert_close(mid[1], 11.0);
        assert_close(mid[2], 12.0);
    }

    #[test]
    fn test_cr_zero_without_down_energy() {
        let series = linear_series(60, 10.0, 1.0);
        let cr = SentimentIndicators::new().cr(&series, 26);

        assert!(cr.cr[25].is_nan());
        // H - m = 2, m - L = 0 → 하락 에너지 0 → 0
        assert_eq!(cr.cr[26], 0.0);
        assert!(!cr.ma[2].is_empty());
    }

    #[test]
    fn test_cr_balanced_bars() {
        let series = zigzag_series(60);
        let cr = SentimentIndicators::new().cr(&series, 26);
        assert!(cr.cr[26] > 0.0);
        assert!(cr.ma[0][29].is_nan());
        assert!(!cr.ma[0][30].is_nan());
    }
}
