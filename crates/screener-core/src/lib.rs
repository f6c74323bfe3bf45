//! # Screener Core
//!
//! 지표 스크리너 전반에서 사용되는 핵심 도메인 타입을 제공합니다.
//!
//! - 일봉 OHLCV 데이터 구조체
//! - 자산 유형 (주식, ETF, 지수, 업종) 정의
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use self::config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
