//! 거래량 지표 (Volume Indicators).
//!
//! - OBV (On-Balance Volume): 종가 상승일 거래량은 더하고 하락일 거래량은 뺍니다.
//! - VR (Volume Ratio): 상승일 거래량 합 / 하락일 거래량 합
//! - VWMA (누적 거래량 가중 평균)
//! - MFI (Money Flow Index): 거래량 가중 RSI
//! - Force Index
//! - EMV (Ease of Movement)

use super::{typical_price, IndicatorFamily};
use crate::primitives::{
    cumsum, diff, percent_ratio, ratio, rolling_sum, safe_div, shift, sma, zip_with,
};
use crate::series::IndicatorColumns;
use crate::validator::ValidSeries;

/// OBV 이동평균 기간.
pub const MAOBV_PERIOD: usize = 30;
/// VR 기간 / 이동평균 기간.
pub const VR_PERIODS: (usize, usize) = (26, 6);
/// VWMA 이동평균 기간.
pub const MVWMA_PERIOD: usize = 6;
/// MFI 기간 / 이동평균 기간.
pub const MFI_PERIODS: (usize, usize) = (14, 6);
/// Force Index 평활 기간.
pub const FORCE_PERIODS: (usize, usize) = (2, 13);
/// EMV 합산 기간 / 이동평균 기간.
pub const EMV_PERIODS: (usize, usize) = (14, 9);

/// 거래량 지표 계산기.
#[derive(Debug, Default)]
pub struct VolumeIndicators;

impl VolumeIndicators {
    /// 새로운 거래량 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// OBV 계산.
    ///
    /// 첫 값은 0이며 종가가 같으면 변화가 없습니다.
    pub fn obv(&self, close: &[f64], volume: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(close.len());
        let mut acc = 0.0;
        for i in 0..close.len() {
            if i > 0 {
                if close[i] > close[i - 1] {
                    acc += volume[i];
                } else if close[i] < close[i - 1] {
                    acc -= volume[i];
                }
            }
            out.push(acc);
        }
        out
    }

    /// VR 계산: `100 × Σ(상승일 거래량) / Σ(하락일 거래량)`.
    ///
    /// 하락일 거래량 합이 0이면 0입니다.
    pub fn volume_ratio(&self, close: &[f64], volume: &[f64], period: usize) -> Vec<f64> {
        let change = diff(close, 1);
        let up = zip_with(&change, volume, |c, v| signed_pick(c, v, c > 0.0));
        let down = zip_with(&change, volume, |c, v| signed_pick(c, v, c < 0.0));
        percent_ratio(&rolling_sum(&up, period), &rolling_sum(&down, period))
    }

    /// VWMA 계산: `Σ(C × V) / ΣV` (누적).
    pub fn vwma(&self, close: &[f64], volume: &[f64]) -> Vec<f64> {
        let turnover = zip_with(close, volume, |c, v| c * v);
        ratio(&cumsum(&turnover), &cumsum(volume))
    }

    /// MFI 계산.
    ///
    /// 대표 가격이 오른 날의 자금 흐름(TP × V)을 양, 내린 날을 음으로 보고
    /// `100 × 양 / (양 + 음)`을 구합니다.
    pub fn mfi(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        volume: &[f64],
        period: usize,
    ) -> Vec<f64> {
        let tp = typical_price(high, low, close);
        let change = diff(&tp, 1);
        let flow = zip_with(&tp, volume, |p, v| p * v);

        let positive = zip_with(&change, &flow, |c, f| signed_pick(c, f, c > 0.0));
        let negative = zip_with(&change, &flow, |c, f| signed_pick(c, f, c < 0.0));
        let positive_sum = rolling_sum(&positive, period);
        let negative_sum = rolling_sum(&negative, period);

        zip_with(&positive_sum, &negative_sum, |p, n| 100.0 * safe_div(p, p + n))
    }

    /// Force Index 계산: `ΔC × V`.
    pub fn force_index(&self, close: &[f64], volume: &[f64]) -> Vec<f64> {
        zip_with(&diff(close, 1), volume, |d, v| d * v)
    }

    /// EMV 계산.
    ///
    /// `Σ[(mid - prev_mid) × (H - L) / V]`, `mid = (H + L) / 2`.
    /// 거래량이 0인 날은 0으로 봅니다.
    pub fn ease_of_movement(
        &self,
        high: &[f64],
        low: &[f64],
        volume: &[f64],
        period: usize,
    ) -> Vec<f64> {
        let mid = zip_with(high, low, |h, l| (h + l) / 2.0);
        let prev_mid = shift(&mid, 1);
        let terms: Vec<f64> = (0..mid.len())
            .map(|i| safe_div((mid[i] - prev_mid[i]) * (high[i] - low[i]), volume[i]))
            .collect();
        rolling_sum(&terms, period)
    }
}

/// 변화량 `change`가 조건을 만족하면 `value`, 아니면 0. 변화량이 NaN이면 NaN.
fn signed_pick(change: f64, value: f64, picked: bool) -> f64 {
    if change.is_nan() {
        f64::NAN
    } else if picked {
        value
    } else {
        0.0
    }
}

impl IndicatorFamily for VolumeIndicators {
    fn name(&self) -> &'static str {
        "volume"
    }

    fn fill(&self, series: &ValidSeries, out: &mut IndicatorColumns) {
        let (high, low, close, volume) = (&series.high, &series.low, &series.close, &series.volume);

        out.obv = self.obv(close, volume);
        out.maobv = sma(&out.obv, MAOBV_PERIOD);

        let (vr_period, vr_ma) = VR_PERIODS;
        out.vr = self.volume_ratio(close, volume, vr_period);
        out.vr_6_sma = sma(&out.vr, vr_ma);

        out.vwma = self.vwma(close, volume);
        out.mvwma = sma(&out.vwma, MVWMA_PERIOD);

        let (mfi_period, mfi_ma) = MFI_PERIODS;
        out.mfi = self.mfi(high, low, close, volume, mfi_period);
        out.mfisma = sma(&out.mfi, mfi_ma);

        let (short, long) = FORCE_PERIODS;
        out.fi = self.force_index(close, volume);
        out.force_2 = sma(&out.fi, short);
        out.force_13 = sma(&out.fi, long);

        let (emv_period, emv_ma) = EMV_PERIODS;
        out.emv = self.ease_of_movement(high, low, volume, emv_period);
        out.emva = sma(&out.emv, emv_ma);
    }
}
