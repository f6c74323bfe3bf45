//! 외부 협력자 인터페이스.
//!
//! 동기화 작업은 아래 trait만 사용하며, PostgreSQL 구현(`PgStore`)과
//! 메모리 구현(`MemoryStore`)이 이를 구현합니다. 재시도, 트랜잭션은 각
//! 구현의 책임입니다.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use screener_core::{AssetClass, OhlcvSeries};
use screener_indicators::{IndicatorSeries, ScreeningHit, UpdatePlan};

use crate::modules::checkpoint::{CheckpointInfo, CheckpointStatus};
use crate::Result;

/// 일봉 이력 로더.
#[async_trait]
pub trait HistoryLoader: Send + Sync {
    /// 계획된 구간의 일봉을 날짜 오름차순, 중복 없이 반환합니다.
    async fn load(&self, asset_class: AssetClass, plan: &UpdatePlan) -> Result<OhlcvSeries>;
}

/// 종목별 마지막 처리일 조회.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// 지표가 저장된 마지막 날짜. 한 번도 저장되지 않았으면 `None`.
    async fn watermark(&self, asset_class: AssetClass, code: &str) -> Result<Option<NaiveDate>>;
}

/// 지표 결과 저장소.
#[async_trait]
pub trait IndicatorSink: Send + Sync {
    /// `(date, code)` 기준 멱등 저장. 저장한 행 수를 반환합니다.
    async fn upsert(&self, asset_class: AssetClass, series: &IndicatorSeries) -> Result<usize>;

    /// 스크리닝 신호 저장. 저장한 신호 수를 반환합니다.
    async fn upsert_signals(&self, asset_class: AssetClass, hits: &[ScreeningHit])
        -> Result<usize>;
}

/// 처리 대상 종목 목록.
#[async_trait]
pub trait UniverseProvider: Send + Sync {
    /// 자산 유형의 전체 종목 코드.
    async fn codes(&self, asset_class: AssetClass) -> Result<Vec<String>>;
}

/// 워크플로우 체크포인트 저장소.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// 진행 상태 저장 (`last_code`는 완료 시 빈 문자열).
    async fn save_checkpoint(
        &self,
        workflow: &str,
        last_code: &str,
        total_processed: i32,
        status: CheckpointStatus,
    ) -> Result<()>;

    /// 중단된 워크플로우의 마지막 처리 코드.
    async fn load_checkpoint(&self, workflow: &str) -> Result<Option<String>>;

    /// 실행 중인 워크플로우를 중단 상태로 표시.
    async fn mark_interrupted(&self, workflow: &str) -> Result<()>;

    /// 체크포인트 삭제.
    async fn clear_checkpoint(&self, workflow: &str) -> Result<()>;

    /// 전체 체크포인트 조회.
    async fn list_checkpoints(&self) -> Result<Vec<CheckpointInfo>>;
}

/// 동기화 작업이 사용하는 협력자 묶음.
#[derive(Clone)]
pub struct SyncPorts {
    pub loader: Arc<dyn HistoryLoader>,
    pub watermarks: Arc<dyn WatermarkStore>,
    pub sink: Arc<dyn IndicatorSink>,
    pub universe: Arc<dyn UniverseProvider>,
    pub checkpoints: Arc<dyn CheckpointStore>,
}

impl SyncPorts {
    /// 모든 역할을 구현한 저장소 하나로 묶음을 만듭니다.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: HistoryLoader
            + WatermarkStore
            + IndicatorSink
            + UniverseProvider
            + CheckpointStore
            + 'static,
    {
        Self {
            loader: store.clone(),
            watermarks: store.clone(),
            sink: store.clone(),
            universe: store.clone(),
            checkpoints: store,
        }
    }
}
