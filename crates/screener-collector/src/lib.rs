//! 기술적 지표 증분 동기화 Collector.
//!
//! 이 crate는 지표 엔진을 외부 저장소와 연결하는 배치 작업을 제공합니다:
//! - 협력자 trait (`ports`): 일봉 로더, 워터마크, 지표 저장소, 종목 목록, 체크포인트
//! - 저장소 어댑터 (`store`): PostgreSQL, 메모리
//! - 지표 증분 동기화 (워터마크 이후 행만 계산/저장, 중단점 재개)

pub mod config;
pub mod error;
pub mod modules;
pub mod ports;
pub mod stats;
pub mod store;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use modules::{IndicatorSync, IndicatorSyncOptions};
pub use ports::SyncPorts;
pub use stats::CollectionStats;
pub use store::{MemoryStore, PgStore};
