//! 기술적 지표 계산 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 입력 시계열 검증 (최소 데이터 수, 필수 컬럼, 날짜 순서)
//! - 롤링 윈도우 기본 연산 (SMA, EMA, Wilder 평활 등)
//! - 추세/변동성/모멘텀/거래량/심리 지표 계산기
//! - NaN/Inf 정규화
//! - 워터마크 기반 증분 업데이트 계획
//! - 과매수/과매도 스크리닝
//!
//! 모든 계산은 동기식 순수 함수이며 I/O를 하지 않습니다.
//!
//! # 사용 예시
//!
//! ```ignore
//! use screener_indicators::{IndicatorEngine, UpdatePlanner};
//!
//! let engine = IndicatorEngine::new();
//! let series = engine.compute(&ohlcv)?;
//! let new_rows = UpdatePlanner::filter(series, watermark);
//! ```

pub mod engine;
pub mod error;
pub mod incremental;
pub mod indicators;
pub mod normalizer;
pub mod primitives;
pub mod screening;
pub mod series;
pub mod validator;

pub use engine::IndicatorEngine;
pub use error::{IndicatorResult, SkipReason};
pub use incremental::{DateRange, UpdatePlan, UpdatePlanner, MAX_HISTORY_WINDOW_DAYS, MAX_ROWS};
pub use indicators::{
    BandResult, IndicatorFamily, MomentumCalculator, SentimentIndicators, TrendIndicators,
    VolatilityIndicators, VolumeIndicators,
};
pub use normalizer::{normalize_column, AnomalyReport, NumericNormalizer};
pub use screening::{ScreeningHit, ScreeningRules, Signal, Thresholds};
pub use series::{IndicatorColumns, IndicatorRow, IndicatorSeries, IndicatorValues};
pub use validator::{SeriesValidator, ValidSeries, MIN_HISTORY};
