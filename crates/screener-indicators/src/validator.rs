//! 시계열 검증.
//!
//! 최소 워밍업 길이, 필수 컬럼, 날짜 오름차순을 확인하고 계산기들이 바로
//! 사용할 수 있는 컬럼 형태(`ValidSeries`)로 변환합니다.

use chrono::NaiveDate;
use screener_core::{Column, OhlcvPoint, OhlcvSeries};

use crate::error::{IndicatorResult, SkipReason};

/// 엔진 하한 데이터 수.
///
/// MACD 시그널 라인(26 + 9 - 1)이 처음 정의되는 지점입니다.
pub const MIN_HISTORY: usize = 34;

/// 검증을 통과한 컬럼형 시계열.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSeries {
    /// 종목 코드
    pub code: String,
    /// 거래일 (엄격한 오름차순)
    pub dates: Vec<NaiveDate>,
    /// 시가
    pub open: Vec<f64>,
    /// 고가
    pub high: Vec<f64>,
    /// 저가
    pub low: Vec<f64>,
    /// 종가
    pub close: Vec<f64>,
    /// 거래량
    pub volume: Vec<f64>,
    /// 거래대금 (모든 행에 있을 때만)
    pub amount: Option<Vec<f64>>,
}

impl ValidSeries {
    /// 데이터 수.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// 비어 있는지 여부.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// 시계열 검증기.
#[derive(Debug, Clone, Copy)]
pub struct SeriesValidator {
    min_history: usize,
}

impl Default for SeriesValidator {
    fn default() -> Self {
        Self::new(MIN_HISTORY)
    }
}

impl SeriesValidator {
    /// 최소 데이터 수를 지정해 생성합니다.
    ///
    /// 엔진 하한보다 작은 값은 하한으로 올립니다.
    pub fn new(min_history: usize) -> Self {
        Self {
            min_history: min_history.max(MIN_HISTORY),
        }
    }

    /// 최소 데이터 수.
    pub fn min_history(&self) -> usize {
        self.min_history
    }

    /// 시계열을 검증합니다.
    pub fn validate(&self, series: &OhlcvSeries) -> IndicatorResult<ValidSeries> {
        let provided = series.len();
        if provided < self.min_history {
            return Err(SkipReason::InsufficientHistory {
                required: self.min_history,
                provided,
            });
        }

        let mut valid = ValidSeries {
            code: series.code.clone(),
            dates: Vec::with_capacity(provided),
            open: Vec::with_capacity(provided),
            high: Vec::with_capacity(provided),
            low: Vec::with_capacity(provided),
            close: Vec::with_capacity(provided),
            volume: Vec::with_capacity(provided),
            amount: None,
        };
        let mut amount = Vec::with_capacity(provided);
        let mut has_amount = true;

        for (index, point) in series.points.iter().enumerate() {
            if point.code != series.code {
                return Err(SkipReason::MixedCode {
                    expected: series.code.clone(),
                    found: point.code.clone(),
                });
            }

            if let Some(&previous) = valid.dates.last() {
                if point.date <= previous {
                    return Err(SkipReason::NotAscending {
                        index,
                        previous,
                        current: point.date,
                    });
                }
            }

            valid.dates.push(point.date);
            valid.open.push(require(point, Column::Open, index)?);
            valid.high.push(require(point, Column::High, index)?);
            valid.low.push(require(point, Column::Low, index)?);
            valid.close.push(require(point, Column::Close, index)?);
            valid.volume.push(require(point, Column::Volume, index)?);

            match point.amount {
                Some(value) if has_amount => amount.push(value),
                _ => has_amount = false,
            }
        }

        if has_amount {
            valid.amount = Some(amount);
        }
        Ok(valid)
    }
}

fn require(point: &OhlcvPoint, column: Column, index: usize) -> IndicatorResult<f64> {
    point
        .value(column)
        .ok_or(SkipReason::MissingColumn { column, index })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series(len: usize) -> OhlcvSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = (0..len)
            .map(|i| {
                let date = start + chrono::Duration::days(i as i64);
                let close = 10.0 + i as f64;
                OhlcvPoint::new(date, "000001", close, close + 1.0, close - 1.0, close, 1000.0)
                    .with_amount(close * 1000.0)
            })
            .collect();
        OhlcvSeries::new("000001", points)
    }

    #[test]
    fn test_valid_series() {
        let valid = SeriesValidator::default().validate(&sample_series(40)).unwrap();
        assert_eq!(valid.len(), 40);
        assert_eq!(valid.close[0], 10.0);
        assert_eq!(valid.amount.as_ref().map(Vec::len), Some(40));
    }

    #[test]
    fn test_insufficient_history() {
        let err = SeriesValidator::default()
            .validate(&sample_series(33))
            .unwrap_err();
        assert_eq!(
            err,
            SkipReason::InsufficientHistory {
                required: 34,
                provided: 33
            }
        );
    }

    #[test]
    fn test_min_history_never_below_engine_floor() {
        assert_eq!(SeriesValidator::new(10).min_history(), MIN_HISTORY);
        assert_eq!(SeriesValidator::new(120).min_history(), 120);
    }

    #[test]
    fn test_missing_column() {
        let mut series = sample_series(40);
        series.points[7].volume = None;

        let err = SeriesValidator::default().validate(&series).unwrap_err();
        assert_eq!(
            err,
            SkipReason::MissingColumn {
                column: Column::Volume,
                index: 7
            }
        );
    }

    #[test]
    fn test_missing_open_is_rejected() {
        let mut series = sample_series(40);
        series.points[0].open = None;

        let err = SeriesValidator::default().validate(&series).unwrap_err();
        assert!(matches!(
            err,
            SkipReason::MissingColumn {
                column: Column::Open,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_date_is_rejected() {
        let mut series = sample_series(40);
        series.points[5].date = series.points[4].date;

        let err = SeriesValidator::default().validate(&series).unwrap_err();
        assert!(matches!(err, SkipReason::NotAscending { index: 5, .. }));
    }

    #[test]
    fn test_mixed_code_is_rejected() {
        let mut series = sample_series(40);
        series.points[10].code = "600000".to_string();

        let err = SeriesValidator::default().validate(&series).unwrap_err();
        assert!(matches!(err, SkipReason::MixedCode { .. }));
    }

    #[test]
    fn test_partial_amount_is_dropped() {
        let mut series = sample_series(40);
        series.points[20].amount = None;

        let valid = SeriesValidator::default().validate(&series).unwrap();
        assert!(valid.amount.is_none());
    }
}
