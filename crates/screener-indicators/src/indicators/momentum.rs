//! 모멘텀 지표 (Momentum Indicators).
//!
//! 가격 모멘텀과 과매수/과매도 상태를 측정하는 지표들을 제공합니다.
//! - KDJ (Stochastic 기반)
//! - RSI (Relative Strength Index)
//! - Williams %R, CCI, StochRSI
//! - ROC, PPO, Wave Trend, BIAS, MTM

use serde::{Deserialize, Serialize};

use super::{typical_price, IndicatorFamily};
use crate::primitives::{
    diff, ema, mean_abs_deviation, percent_ratio, positive, rolling_max, rolling_min, safe_div,
    shift, sma, stddev, sub, wilder_smooth, zip_with,
};
use crate::series::IndicatorColumns;
use crate::validator::ValidSeries;

/// 기본 RSI 기간.
pub const RSI_PERIOD: usize = 14;
/// 보조 RSI 기간.
pub const RSI_SHORT_PERIODS: [usize; 3] = [6, 12, 24];
/// Williams %R 기간.
pub const WR_PERIODS: [usize; 3] = [6, 10, 14];
/// CCI 기간.
pub const CCI_PERIOD: usize = 14;
/// 장기 CCI 기간.
pub const CCI_LONG_PERIOD: usize = 84;
/// CCI 상수.
pub const CCI_CONSTANT: f64 = 0.015;
/// StochRSI 기간 / %D 기간.
pub const STOCHRSI_PERIODS: (usize, usize) = (14, 3);
/// ROC 기간 / SMA / EMA 기간.
pub const ROC_PERIODS: (usize, usize, usize) = (10, 6, 9);
/// Wave Trend 기간.
pub const WT_PERIODS: (usize, usize) = (10, 20);
/// BIAS 기간.
pub const BIAS_PERIODS: [usize; 3] = [6, 12, 24];
/// MTM 기간 / 이동평균 기간.
pub const MTM_PERIODS: (usize, usize) = (12, 6);

/// KDJ 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KdjParams {
    /// RSV 기간 (기본: 9).
    pub period: usize,
    /// %K 평활 기간 (기본: 5).
    pub k_period: usize,
    /// %D 평활 기간 (기본: 5).
    pub d_period: usize,
}

impl Default for KdjParams {
    fn default() -> Self {
        Self {
            period: 9,
            k_period: 5,
            d_period: 5,
        }
    }
}

/// KDJ 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KdjResult {
    /// %K
    pub k: Vec<f64>,
    /// %D
    pub d: Vec<f64>,
    /// %J = 3K - 2D
    pub j: Vec<f64>,
}

/// PPO 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PpoResult {
    /// PPO 라인
    pub ppo: Vec<f64>,
    /// 시그널 라인
    pub signal: Vec<f64>,
    /// 히스토그램
    pub histogram: Vec<f64>,
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// KDJ 계산.
    ///
    /// RSV = 100 × (C - LL) / (HH - LL), 가격 범위가 0이면 0.
    /// K = SMA(RSV), D = SMA(K), J = 3K - 2D.
    pub fn kdj(&self, high: &[f64], low: &[f64], close: &[f64], params: KdjParams) -> KdjResult {
        let highest = rolling_max(high, params.period);
        let lowest = rolling_min(low, params.period);
        let rsv: Vec<f64> = (0..close.len())
            .map(|i| 100.0 * safe_div(close[i] - lowest[i], highest[i] - lowest[i]))
            .collect();

        let k = sma(&rsv, params.k_period);
        let d = sma(&k, params.d_period);
        let j = zip_with(&k, &d, |k, d| 3.0 * k - 2.0 * d);

        KdjResult { k, d, j }
    }

    /// RSI 계산 (Wilder 평활).
    ///
    /// RSI = 100 × AvgGain / (AvgGain + AvgLoss), 둘 다 0이면 0.
    /// 첫 값은 `period` 인덱스입니다.
    pub fn rsi(&self, close: &[f64], period: usize) -> Vec<f64> {
        let change = diff(close, 1);
        let gains = positive(&change);
        let losses = positive(&change.iter().map(|c| -c).collect::<Vec<_>>());

        let avg_gain = wilder_smooth(&gains, period);
        let avg_loss = wilder_smooth(&losses, period);
        zip_with(&avg_gain, &avg_loss, |g, l| 100.0 * safe_div(g, g + l))
    }

    /// Williams %R 계산: `-100 × (HH - C) / (HH - LL)`.
    pub fn williams_r(&self, high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
        let highest = rolling_max(high, period);
        let lowest = rolling_min(low, period);
        (0..close.len())
            .map(|i| -100.0 * safe_div(highest[i] - close[i], highest[i] - lowest[i]))
            .collect()
    }

    /// CCI 계산: `(TP - SMA(TP)) / (0.015 × MAD(TP))`.
    pub fn cci(&self, high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
        let tp = typical_price(high, low, close);
        let mean = sma(&tp, period);
        let mad = mean_abs_deviation(&tp, period);
        (0..tp.len())
            .map(|i| safe_div(tp[i] - mean[i], CCI_CONSTANT * mad[i]))
            .collect()
    }

    /// StochRSI 계산.
    ///
    /// %K = 100 × (RSI - min(RSI)) / (max(RSI) - min(RSI)), %D = SMA(%K).
    pub fn stoch_rsi(&self, close: &[f64], period: usize, d_period: usize) -> (Vec<f64>, Vec<f64>) {
        let rsi = self.rsi(close, period);
        let lowest = rolling_min(&rsi, period);
        let highest = rolling_max(&rsi, period);
        let k: Vec<f64> = (0..rsi.len())
            .map(|i| 100.0 * safe_div(rsi[i] - lowest[i], highest[i] - lowest[i]))
            .collect();
        let d = sma(&k, d_period);
        (k, d)
    }

    /// ROC 계산: `100 × (C - C[n]) / C[n]`.
    pub fn roc(&self, close: &[f64], period: usize) -> Vec<f64> {
        percent_ratio(&diff(close, period), &shift(close, period))
    }

    /// PPO 계산: MACD를 장기 EMA 대비 백분율로 표현.
    pub fn ppo(&self, close: &[f64], fast: usize, slow: usize, signal: usize) -> PpoResult {
        let fast_ema = ema(close, fast);
        let slow_ema = ema(close, slow);
        let ppo = percent_ratio(&sub(&fast_ema, &slow_ema), &slow_ema);
        let signal = ema(&ppo, signal);
        let histogram = sub(&ppo, &signal);

        PpoResult {
            ppo,
            signal,
            histogram,
        }
    }

    /// Wave Trend 계산: `(C - SMA(C)) / StdDev(C)`.
    pub fn wave_trend(&self, close: &[f64], period: usize) -> Vec<f64> {
        let deviation = sub(close, &sma(close, period));
        zip_with(&deviation, &stddev(close, period), safe_div)
    }

    /// BIAS 계산: 이동평균 대비 이격도(%).
    pub fn bias(&self, close: &[f64], period: usize) -> Vec<f64> {
        let mean = sma(close, period);
        percent_ratio(&sub(close, &mean), &mean)
    }

    /// MTM 계산: `C - C[n]`.
    pub fn mtm(&self, close: &[f64], period: usize) -> Vec<f64> {
        diff(close, period)
    }
}

impl IndicatorFamily for MomentumCalculator {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn fill(&self, series: &ValidSeries, out: &mut IndicatorColumns) {
        let (high, low, close) = (&series.high, &series.low, &series.close);

        let kdj = self.kdj(high, low, close, KdjParams::default());
        out.kdjk = kdj.k;
        out.kdjd = kdj.d;
        out.kdjj = kdj.j;

        out.rsi = self.rsi(close, RSI_PERIOD);
        let [p6, p12, p24] = RSI_SHORT_PERIODS;
        out.rsi_6 = self.rsi(close, p6);
        out.rsi_12 = self.rsi(close, p12);
        out.rsi_24 = self.rsi(close, p24);

        let [w6, w10, w14] = WR_PERIODS;
        out.wr_6 = self.williams_r(high, low, close, w6);
        out.wr_10 = self.williams_r(high, low, close, w10);
        out.wr_14 = self.williams_r(high, low, close, w14);

        out.cci = self.cci(high, low, close, CCI_PERIOD);
        out.cci_84 = self.cci(high, low, close, CCI_LONG_PERIOD);

        let (period, d_period) = STOCHRSI_PERIODS;
        let (k, d) = self.stoch_rsi(close, period, d_period);
        out.stochrsi_k = k;
        out.stochrsi_d = d;

        let (roc_period, roc_sma, roc_ema) = ROC_PERIODS;
        out.roc = self.roc(close, roc_period);
        out.rocma = sma(&out.roc, roc_sma);
        out.rocema = ema(&out.roc, roc_ema);

        let ppo = self.ppo(close, 12, 26, 9);
        out.ppo = ppo.ppo;
        out.ppos = ppo.signal;
        out.ppoh = ppo.histogram;

        let (wt_fast, wt_slow) = WT_PERIODS;
        out.wt1 = self.wave_trend(close, wt_fast);
        out.wt2 = self.wave_trend(close, wt_slow);

        let [b6, b12, b24] = BIAS_PERIODS;
        out.bias = self.bias(close, b6);
        out.bias_12 = self.bias(close, b12);
        out.bias_24 = self.bias(close, b24);

        let (mtm_period, mtm_ma) = MTM_PERIODS;
        out.mtm = self.mtm(close, mtm_period);
        out.mtmma = sma(&out.mtm, mtm_ma);
    }
}
