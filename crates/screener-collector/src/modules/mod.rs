//! 동기화 작업 모듈.

pub mod checkpoint;
pub mod indicator_sync;

pub use checkpoint::{workflow_name, CheckpointInfo, CheckpointStatus, INDICATOR_WORKFLOW};
pub use indicator_sync::{IndicatorSync, IndicatorSyncOptions};
