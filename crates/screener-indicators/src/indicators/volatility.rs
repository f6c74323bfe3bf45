//! 변동성 지표 (Volatility Indicators).
//!
//! - TR (True Range, 실제 범위)
//! - ATR (Average True Range, 평균 실제 범위)

use super::IndicatorFamily;
use crate::primitives::wilder_smooth;
use crate::series::IndicatorColumns;
use crate::validator::ValidSeries;

/// ATR 기간.
pub const ATR_PERIOD: usize = 14;

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// True Range 계산.
    ///
    /// TR = max(H - L, |H - C_prev|, |L - C_prev|)
    ///
    /// 첫 봉은 이전 종가가 없으므로 `H - L`입니다.
    pub fn true_range(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        (0..close.len())
            .map(|i| {
                let range = high[i] - low[i];
                if i == 0 {
                    return range;
                }
                let prev_close = close[i - 1];
                range
                    .max((high[i] - prev_close).abs())
                    .max((low[i] - prev_close).abs())
            })
            .collect()
    }

    /// ATR 계산.
    ///
    /// 인덱스 1부터의 TR을 Wilder 평활합니다. 첫 값은 `period` 인덱스입니다.
    pub fn atr(&self, high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
        let mut tr = self.true_range(high, low, close);
        if let Some(first) = tr.first_mut() {
            *first = f64::NAN;
        }
        wilder_smooth(&tr, period)
    }
}

impl IndicatorFamily for VolatilityIndicators {
    fn name(&self) -> &'static str {
        "volatility"
    }

    fn fill(&self, series: &ValidSeries, out: &mut IndicatorColumns) {
        out.tr = self.true_range(&series.high, &series.low, &series.close);
        out.atr = self.atr(&series.high, &series.low, &series.close, ATR_PERIOD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{assert_close, linear_series};

    #[test]
    fn test_true_range_uses_previous_close() {
        let high = [10.0, 12.0, 11.0];
        let low = [8.0, 11.0, 7.0];
        let close = [9.0, 11.5, 8.0];
        let tr = VolatilityIndicators::new().true_range(&high, &low, &close);

        assert_close(tr[0], 2.0);
        // 갭 상승: |12 - 9| = 3
        assert_close(tr[1], 3.0);
        assert_close(tr[2], 4.5);
    }

    #[test]
    fn test_atr_constant_range() {
        let series = linear_series(40, 10.0, 1.0);
        let atr = VolatilityIndicators::new().atr(&series.high, &series.low, &series.close, 14);

        assert!(atr[13].is_nan());
        assert_close(atr[14], 2.0);
        assert_close(atr[39], 2.0);
    }
}
