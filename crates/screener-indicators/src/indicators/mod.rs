//! 기술적 지표 계산기.
//!
//! 지표를 다섯 계열로 나누어 계산합니다. 각 계산기는 슬라이스를 받아 같은
//! 길이의 벡터를 돌려주는 순수 함수이며, 기간은 고정 상수입니다.
//!
//! # 계열
//!
//! ## 추세 (Trend)
//! - **MACD**, **Bollinger Bands**, **DMI/ADX/ADXR**, **Parabolic SAR**
//! - **DPO**, **VHF**, **TRIX**, **DMA**, **TEMA**
//!
//! ## 변동성 (Volatility)
//! - **TR**, **ATR**
//!
//! ## 모멘텀 (Momentum)
//! - **KDJ**, **RSI**, **Williams %R**, **CCI**, **StochRSI**
//! - **ROC**, **PPO**, **Wave Trend**, **BIAS**, **MTM**
//!
//! ## 거래량 (Volume)
//! - **OBV**, **VR**, **VWMA**, **MFI**, **Force Index**, **EMV**
//!
//! ## 심리 (Sentiment)
//! - **PSY**, **BRAR**, **ENE**, **RVI**, **CR**
//!
//! 계산 결과의 정의되지 않은 구간은 `f64::NAN`이며, 정규화는 엔진에서
//! 한 번에 수행합니다.

pub mod momentum;
pub mod sentiment;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use momentum::{KdjParams, KdjResult, MomentumCalculator, PpoResult};
pub use sentiment::{CrResult, SentimentIndicators};
pub use trend::{BollingerParams, DmiResult, MacdParams, MacdResult, SarParams, TrendIndicators};
pub use volatility::VolatilityIndicators;
pub use volume::VolumeIndicators;

use crate::primitives::zip_with;
use crate::series::IndicatorColumns;
use crate::validator::ValidSeries;

/// 중심선과 상/하단 밴드.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandResult {
    /// 상단 밴드
    pub upper: Vec<f64>,
    /// 중심선
    pub middle: Vec<f64>,
    /// 하단 밴드
    pub lower: Vec<f64>,
}

impl BandResult {
    /// `middle ± k * deviation`으로 밴드를 만듭니다.
    pub fn around(middle: Vec<f64>, deviation: &[f64], k: f64) -> Self {
        Self {
            upper: zip_with(&middle, deviation, |m, d| m + k * d),
            lower: zip_with(&middle, deviation, |m, d| m - k * d),
            middle,
        }
    }
}

/// 대표 가격 `(high + low + close) / 3`.
pub fn typical_price(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    high.iter()
        .zip(low)
        .zip(close)
        .map(|((h, l), c)| (h + l + c) / 3.0)
        .collect()
}

/// 지표 계열 계산기.
///
/// 엔진은 등록된 계열을 순서대로 실행해 `IndicatorColumns`를 채웁니다.
pub trait IndicatorFamily: Send + Sync {
    /// 계열 이름 (로그용).
    fn name(&self) -> &'static str;

    /// 담당 컬럼을 계산해 채웁니다.
    fn fill(&self, series: &ValidSeries, out: &mut IndicatorColumns);
}

/// 기본 계열 목록 (출력 컬럼 순서와 무관).
pub fn default_families() -> Vec<Box<dyn IndicatorFamily>> {
    vec![
        Box::new(TrendIndicators::new()),
        Box::new(VolatilityIndicators::new()),
        Box::new(MomentumCalculator::new()),
        Box::new(VolumeIndicators::new()),
        Box::new(SentimentIndicators::new()),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::validator::ValidSeries;

    /// 종가가 `start`에서 `step`씩 변하는 시계열 (고가/저가 ±1, 거래량 일정).
    pub fn linear_series(len: usize, start: f64, step: f64) -> ValidSeries {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let close: Vec<f64> = (0..len).map(|i| start + step * i as f64).collect();
        ValidSeries {
            code: "000001".to_string(),
            dates: (0..len)
                .map(|i| first + chrono::Duration::days(i as i64))
                .collect(),
            open: close.iter().map(|c| c - step / 2.0).collect(),
            high: close.iter().map(|c| c + 1.0).collect(),
            low: close.iter().map(|c| c - 1.0).collect(),
            volume: vec![1000.0; len],
            amount: None,
            close,
        }
    }

    /// 지그재그 시계열 (상승/하락 반복).
    pub fn zigzag_series(len: usize) -> ValidSeries {
        let mut series = linear_series(len, 50.0, 0.0);
        for i in 0..len {
            let c = 50.0 + if i % 2 == 0 { 2.0 } else { -1.0 } + (i % 7) as f64 * 0.5;
            series.close[i] = c;
            series.open[i] = c - 0.3;
            series.high[i] = c + 1.2;
            series.low[i] = c - 0.8;
            series.volume[i] = 1000.0 + (i % 5) as f64 * 150.0;
        }
        series
    }

    pub fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }
}
