//! 워크플로우 체크포인트 관리 모듈.
//!
//! 장시간 실행되는 동기화 작업의 중단/재개를 지원합니다.
//!
//! # 주요 기능
//!
//! - **체크포인트 저장**: 청크(기본 100종목) 처리마다 진행 상태 저장
//! - **중단점 재개**: 중단된 지점의 다음 종목부터 이어서 처리
//!
//! 저장소 구현은 [`CheckpointStore`](crate::ports::CheckpointStore)를 따릅니다.
//!
//! # 사용 예
//!
//! ```rust,ignore
//! // 워크플로우 시작 시
//! let resume_code = if options.resume {
//!     store.load_checkpoint("indicator_sync_stock").await?
//! } else {
//!     None
//! };
//!
//! // 처리 중 (청크마다)
//! store.save_checkpoint("indicator_sync_stock", &code, processed, CheckpointStatus::Running).await?;
//!
//! // 완료 시
//! store.save_checkpoint("indicator_sync_stock", "", total, CheckpointStatus::Completed).await?;
//! ```

use chrono::{DateTime, Utc};
use screener_core::AssetClass;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::CollectorError;

/// 지표 동기화 워크플로우 이름 접두사
pub const INDICATOR_WORKFLOW: &str = "indicator_sync";

/// 자산 유형별 워크플로우 이름 (예: `indicator_sync_stock`).
pub fn workflow_name(asset_class: AssetClass) -> String {
    format!("{}_{}", INDICATOR_WORKFLOW, asset_class)
}

/// 체크포인트 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointStatus {
    /// 실행 중
    Running,
    /// 중단됨 (재개 가능)
    Interrupted,
    /// 완료됨
    Completed,
    /// 유휴 상태
    Idle,
}

impl CheckpointStatus {
    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Interrupted => "interrupted",
            Self::Completed => "completed",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for CheckpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckpointStatus {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "interrupted" => Ok(Self::Interrupted),
            "completed" => Ok(Self::Completed),
            "idle" => Ok(Self::Idle),
            other => Err(CollectorError::Config(format!(
                "알 수 없는 체크포인트 상태: {}",
                other
            ))),
        }
    }
}

/// 체크포인트 정보
#[derive(Debug, Clone, Serialize)]
pub struct CheckpointInfo {
    pub workflow_name: String,
    pub last_code: Option<String>,
    pub last_processed_at: Option<DateTime<Utc>>,
    pub total_processed: i32,
    pub status: CheckpointStatus,
}

impl CheckpointInfo {
    /// 재개 가능한 중단점이 있는지 확인합니다.
    pub fn is_resumable(&self) -> bool {
        self.status == CheckpointStatus::Interrupted
            && self.last_code.as_deref().is_some_and(|c| !c.is_empty())
    }
}
