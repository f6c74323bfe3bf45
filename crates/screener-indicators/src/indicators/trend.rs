//! 추세 지표 (Trend Indicators).
//!
//! 이동평균과 방향성 기반의 추세 지표들을 제공합니다.
//! - MACD (Moving Average Convergence Divergence)
//! - Bollinger Bands
//! - DMI / ADX / ADXR (Directional Movement Index)
//! - Parabolic SAR
//! - DPO, VHF, TRIX, DMA, TEMA

use serde::{Deserialize, Serialize};

use super::volatility::VolatilityIndicators;
use super::{BandResult, IndicatorFamily};
use crate::primitives::{
    diff, ema, percent_ratio, ratio, rolling_max, rolling_min, rolling_sum, safe_div, shift, sma,
    stddev, sub, wilder_smooth, zip_with,
};
use crate::series::IndicatorColumns;
use crate::validator::ValidSeries;

/// DMI 기간.
pub const DMI_PERIOD: usize = 14;
/// DPO 기간.
pub const DPO_PERIOD: usize = 20;
/// DPO 이동평균 기간.
pub const DPO_MA_PERIOD: usize = 6;
/// VHF 기간.
pub const VHF_PERIOD: usize = 28;
/// TRIX EMA 기간.
pub const TRIX_PERIOD: usize = 12;
/// TRIX 이동평균 기간.
pub const TRIX_MA_PERIOD: usize = 20;
/// DMA 단기/장기/이동평균 기간.
pub const DMA_PERIODS: (usize, usize, usize) = (10, 50, 10);
/// TEMA 기간.
pub const TEMA_PERIOD: usize = 14;

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Vec<f64>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Vec<f64>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Vec<f64>,
}

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

/// Parabolic SAR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SarParams {
    /// 가속 계수 시작값
    pub af_start: f64,
    /// 가속 계수 증가폭
    pub af_step: f64,
    /// 가속 계수 최댓값
    pub af_max: f64,
}

impl Default for SarParams {
    fn default() -> Self {
        Self {
            af_start: 0.02,
            af_step: 0.02,
            af_max: 0.2,
        }
    }
}

/// DMI 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmiResult {
    /// +DI
    pub pdi: Vec<f64>,
    /// -DI
    pub mdi: Vec<f64>,
    /// DX
    pub dx: Vec<f64>,
    /// ADX (DX의 Wilder 평균)
    pub adx: Vec<f64>,
    /// ADXR (현재 ADX와 `period - 1`봉 전 ADX의 평균)
    pub adxr: Vec<f64>,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// MACD 계산.
    ///
    /// - MACD Line = EMA(fast) - EMA(slow)
    /// - Signal Line = EMA(MACD Line, signal)
    /// - Histogram = MACD Line - Signal Line
    ///
    /// 시그널 라인은 `slow + signal - 2` 인덱스에서 처음 정의됩니다.
    pub fn macd(&self, close: &[f64], params: MacdParams) -> MacdResult {
        let fast = ema(close, params.fast_period);
        let slow = ema(close, params.slow_period);
        let macd = sub(&fast, &slow);
        let signal = ema(&macd, params.signal_period);
        let histogram = sub(&macd, &signal);

        MacdResult {
            macd,
            signal,
            histogram,
        }
    }

    /// 볼린저 밴드 계산.
    ///
    /// 중심선은 SMA, 밴드 폭은 모표준편차 × 배수입니다.
    pub fn bollinger_bands(&self, close: &[f64], params: BollingerParams) -> BandResult {
        let middle = sma(close, params.period);
        let deviation = stddev(close, params.period);
        BandResult::around(middle, &deviation, params.std_dev_multiplier)
    }

    /// DMI / ADX / ADXR 계산 (Wilder 방식).
    ///
    /// +DM, -DM, TR은 인덱스 1부터 정의되며 각각 Wilder 평활합니다.
    /// +DI, -DI 합이 0이면 DX는 0입니다.
    pub fn dmi(&self, high: &[f64], low: &[f64], close: &[f64], period: usize) -> DmiResult {
        let len = close.len();
        let mut plus_dm = vec![f64::NAN; len];
        let mut minus_dm = vec![f64::NAN; len];
        for i in 1..len {
            let up = high[i] - high[i - 1];
            let down = low[i - 1] - low[i];
            plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
            minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
        }

        let mut tr = VolatilityIndicators::new().true_range(high, low, close);
        if let Some(first) = tr.first_mut() {
            *first = f64::NAN;
        }

        let smoothed_tr = wilder_smooth(&tr, period);
        let pdi = percent_ratio(&wilder_smooth(&plus_dm, period), &smoothed_tr);
        let mdi = percent_ratio(&wilder_smooth(&minus_dm, period), &smoothed_tr);
        let dx = zip_with(&pdi, &mdi, |p, m| 100.0 * safe_div((p - m).abs(), p + m));
        let adx = wilder_smooth(&dx, period);
        let adxr = zip_with(&adx, &shift(&adx, period.saturating_sub(1)), |a, b| {
            (a + b) / 2.0
        });

        DmiResult {
            pdi,
            mdi,
            dx,
            adx,
            adxr,
        }
    }

    /// Parabolic SAR 계산.
    ///
    /// 첫 두 봉의 중간값 비교로 초기 방향을 정하고, 극값(EP)이 갱신될
    /// 때마다 가속 계수를 올립니다. SAR이 당일 가격을 침범하면 반전합니다.
    pub fn parabolic_sar(&self, high: &[f64], low: &[f64], params: SarParams) -> Vec<f64> {
        let len = high.len();
        let mut out = vec![f64::NAN; len];
        if len < 2 {
            return out;
        }

        let mut rising = high[1] + low[1] >= high[0] + low[0];
        let mut af = params.af_start;
        let (mut sar, mut ep) = if rising {
            (low[0], high[0])
        } else {
            (high[0], low[0])
        };

        for i in 1..len {
            sar += af * (ep - sar);

            if rising {
                // 직전 두 봉의 저가를 넘지 않음
                sar = sar.min(low[i - 1]);
                if i >= 2 {
                    sar = sar.min(low[i - 2]);
                }
                if low[i] < sar {
                    rising = false;
                    sar = ep;
                    ep = low[i];
                    af = params.af_start;
                } else if high[i] > ep {
                    ep = high[i];
                    af = (af + params.af_step).min(params.af_max);
                }
            } else {
                sar = sar.max(high[i - 1]);
                if i >= 2 {
                    sar = sar.max(high[i - 2]);
                }
                if high[i] > sar {
                    rising = true;
                    sar = ep;
                    ep = high[i];
                    af = params.af_start;
                } else if low[i] < ep {
                    ep = low[i];
                    af = (af + params.af_step).min(params.af_max);
                }
            }

            out[i] = sar;
        }
        out
    }

    /// DPO (Detrended Price Oscillator): `close - SMA(close, n)`.
    pub fn dpo(&self, close: &[f64], period: usize) -> Vec<f64> {
        sub(close, &sma(close, period))
    }

    /// VHF (Vertical Horizontal Filter).
    ///
    /// `(최고 종가 - 최저 종가) / Σ|Δclose|`, 분모가 0이면 0.
    pub fn vhf(&self, close: &[f64], period: usize) -> Vec<f64> {
        let range = sub(&rolling_max(close, period), &rolling_min(close, period));
        let moves: Vec<f64> = diff(close, 1).iter().map(|d| d.abs()).collect();
        ratio(&range, &rolling_sum(&moves, period))
    }

    /// TRIX: 3중 EMA의 1봉 변화율(%).
    pub fn trix(&self, close: &[f64], period: usize) -> Vec<f64> {
        let triple = ema(&ema(&ema(close, period), period), period);
        percent_ratio(&diff(&triple, 1), &shift(&triple, 1))
    }

    /// DMA (Different of Moving Average): `SMA(short) - SMA(long)`.
    pub fn dma(&self, close: &[f64], short: usize, long: usize) -> Vec<f64> {
        sub(&sma(close, short), &sma(close, long))
    }

    /// TEMA: `3·EMA1 - 3·EMA2 + EMA3`.
    pub fn tema(&self, close: &[f64], period: usize) -> Vec<f64> {
        let e1 = ema(close, period);
        let e2 = ema(&e1, period);
        let e3 = ema(&e2, period);
        e1.iter()
            .zip(&e2)
            .zip(&e3)
            .map(|((a, b), c)| 3.0 * a - 3.0 * b + c)
            .collect()
    }
}

impl IndicatorFamily for TrendIndicators {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn fill(&self, series: &ValidSeries, out: &mut IndicatorColumns) {
        let close = &series.close;

        let macd = self.macd(close, MacdParams::default());
        out.macd = macd.macd;
        out.macds = macd.signal;
        out.macdh = macd.histogram;

        let boll = self.bollinger_bands(close, BollingerParams::default());
        out.boll_ub = boll.upper;
        out.boll = boll.middle;
        out.boll_lb = boll.lower;

        let dmi = self.dmi(&series.high, &series.low, close, DMI_PERIOD);
        out.pdi = dmi.pdi;
        out.mdi = dmi.mdi;
        out.dx = dmi.dx;
        out.adx = dmi.adx;
        out.adxr = dmi.adxr;

        out.sar = self.parabolic_sar(&series.high, &series.low, SarParams::default());

        out.dpo = self.dpo(close, DPO_PERIOD);
        out.madpo = sma(&out.dpo, DPO_MA_PERIOD);

        out.vhf = self.vhf(close, VHF_PERIOD);

        out.trix = self.trix(close, TRIX_PERIOD);
        out.trix_20_sma = sma(&out.trix, TRIX_MA_PERIOD);

        let (short, long, ma) = DMA_PERIODS;
        out.dma = self.dma(close, short, long);
        out.dma_10_sma = sma(&out.dma, ma);

        out.tema = self.tema(close, TEMA_PERIOD);
    }
}
