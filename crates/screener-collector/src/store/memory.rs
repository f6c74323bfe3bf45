//! 메모리 저장소.
//!
//! 모든 협력자 trait을 메모리 맵으로 구현합니다. 테스트와 DB 없는 로컬
//! 실행에서 사용하며, 로드 요청 기록과 종목별 실패 주입을 지원합니다.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use screener_core::{AssetClass, OhlcvPoint, OhlcvSeries};
use screener_indicators::{IndicatorRow, IndicatorSeries, ScreeningHit, UpdatePlan};
use tokio::sync::RwLock;

use crate::error::CollectorError;
use crate::modules::checkpoint::{CheckpointInfo, CheckpointStatus};
use crate::ports::{
    CheckpointStore, HistoryLoader, IndicatorSink, UniverseProvider, WatermarkStore,
};
use crate::Result;

type Key = (AssetClass, String);

/// 메모리 기반 저장소.
#[derive(Debug, Default)]
pub struct MemoryStore {
    history: RwLock<HashMap<Key, BTreeMap<NaiveDate, OhlcvPoint>>>,
    indicators: RwLock<HashMap<Key, BTreeMap<NaiveDate, IndicatorRow>>>,
    signals: RwLock<HashMap<Key, BTreeMap<NaiveDate, ScreeningHit>>>,
    checkpoints: RwLock<BTreeMap<String, CheckpointInfo>>,
    failing: RwLock<HashSet<String>>,
    loads: RwLock<Vec<UpdatePlan>>,
}

impl MemoryStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 일봉 데이터를 추가합니다. 같은 `(code, date)`는 나중 값으로 덮어씁니다.
    pub async fn insert_history(&self, asset_class: AssetClass, points: Vec<OhlcvPoint>) {
        let mut history = self.history.write().await;
        for point in points {
            history
                .entry((asset_class, point.code.clone()))
                .or_default()
                .insert(point.date, point);
        }
    }

    /// 해당 종목의 로드를 실패하도록 설정합니다.
    pub async fn fail_loads_for(&self, code: impl Into<String>) {
        self.failing.write().await.insert(code.into());
    }

    /// 저장된 지표 행 (날짜 오름차순).
    pub async fn indicator_rows(&self, asset_class: AssetClass, code: &str) -> Vec<IndicatorRow> {
        self.indicators
            .read()
            .await
            .get(&(asset_class, code.to_string()))
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// 저장된 신호 (날짜 오름차순).
    pub async fn signals(&self, asset_class: AssetClass, code: &str) -> Vec<ScreeningHit> {
        self.signals
            .read()
            .await
            .get(&(asset_class, code.to_string()))
            .map(|hits| hits.values().cloned().collect())
            .unwrap_or_default()
    }

    /// 지금까지 받은 로드 계획.
    pub async fn loads(&self) -> Vec<UpdatePlan> {
        self.loads.read().await.clone()
    }

    /// 워크플로우 체크포인트 조회.
    pub async fn checkpoint(&self, workflow: &str) -> Option<CheckpointInfo> {
        self.checkpoints.read().await.get(workflow).cloned()
    }
}

#[async_trait]
impl HistoryLoader for MemoryStore {
    async fn load(&self, asset_class: AssetClass, plan: &UpdatePlan) -> Result<OhlcvSeries> {
        self.loads.write().await.push(plan.clone());

        if self.failing.read().await.contains(&plan.code) {
            return Err(CollectorError::Other(
                format!("{} 일봉 로드 실패", plan.code).into(),
            ));
        }

        let history = self.history.read().await;
        let points: Vec<OhlcvPoint> = history
            .get(&(asset_class, plan.code.clone()))
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default();

        Ok(OhlcvSeries::new(plan.code.clone(), plan.select(&points)))
    }
}

#[async_trait]
impl WatermarkStore for MemoryStore {
    async fn watermark(&self, asset_class: AssetClass, code: &str) -> Result<Option<NaiveDate>> {
        Ok(self
            .indicators
            .read()
            .await
            .get(&(asset_class, code.to_string()))
            .and_then(|rows| rows.keys().next_back().copied()))
    }
}

#[async_trait]
impl IndicatorSink for MemoryStore {
    async fn upsert(&self, asset_class: AssetClass, series: &IndicatorSeries) -> Result<usize> {
        let mut indicators = self.indicators.write().await;
        let rows = indicators
            .entry((asset_class, series.code.clone()))
            .or_default();
        for row in &series.rows {
            rows.insert(row.date, row.clone());
        }
        Ok(series.len())
    }

    async fn upsert_signals(
        &self,
        asset_class: AssetClass,
        hits: &[ScreeningHit],
    ) -> Result<usize> {
        let mut signals = self.signals.write().await;
        for hit in hits {
            signals
                .entry((asset_class, hit.code.clone()))
                .or_default()
                .insert(hit.date, hit.clone());
        }
        Ok(hits.len())
    }
}

#[async_trait]
impl UniverseProvider for MemoryStore {
    async fn codes(&self, asset_class: AssetClass) -> Result<Vec<String>> {
        let mut codes: Vec<String> = self
            .history
            .read()
            .await
            .keys()
            .filter(|(class, _)| *class == asset_class)
            .map(|(_, code)| code.clone())
            .collect();
        codes.sort();
        Ok(codes)
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn save_checkpoint(
        &self,
        workflow: &str,
        last_code: &str,
        total_processed: i32,
        status: CheckpointStatus,
    ) -> Result<()> {
        self.checkpoints.write().await.insert(
            workflow.to_string(),
            CheckpointInfo {
                workflow_name: workflow.to_string(),
                last_code: Some(last_code.to_string()),
                last_processed_at: Some(Utc::now()),
                total_processed,
                status,
            },
        );
        Ok(())
    }

    async fn load_checkpoint(&self, workflow: &str) -> Result<Option<String>> {
        Ok(self
            .checkpoints
            .read()
            .await
            .get(workflow)
            .filter(|info| info.is_resumable())
            .and_then(|info| info.last_code.clone()))
    }

    async fn mark_interrupted(&self, workflow: &str) -> Result<()> {
        if let Some(info) = self.checkpoints.write().await.get_mut(workflow) {
            if info.status == CheckpointStatus::Running {
                info.status = CheckpointStatus::Interrupted;
            }
        }
        Ok(())
    }

    async fn clear_checkpoint(&self, workflow: &str) -> Result<()> {
        self.checkpoints.write().await.remove(workflow);
        Ok(())
    }

    async fn list_checkpoints(&self) -> Result<Vec<CheckpointInfo>> {
        Ok(self.checkpoints.read().await.values().cloned().collect())
    }
}
