//! 기술적 지표 증분 동기화 모듈.
//!
//! 자산 유형별로 종목 목록을 조회하고, 종목마다 워터마크 이후의 지표 행만
//! 계산해 저장합니다.
//!
//! # 동작
//! 1. 워터마크 조회 후 로드 계획 수립 (최신이면 건너뜀)
//! 2. 계획 구간의 일봉 로드
//! 3. blocking 풀에서 지표 계산 (타임아웃 적용)
//! 4. 워터마크 이후 행만 저장, 스크리닝 신호 저장
//!
//! 종목은 코드 순으로 정렬해 `checkpoint_every`개 단위 청크로 처리하며,
//! 청크 안에서는 `concurrency`개씩 동시에 처리합니다. 청크가 끝날 때마다
//! 마지막 코드를 체크포인트로 저장합니다.

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use screener_core::{instrument_span, AssetClass, EngineConfig, SyncConfig};
use screener_indicators::{
    IndicatorEngine, ScreeningRules, SeriesValidator, UpdatePlan, UpdatePlanner,
};
use tracing::{debug, error, info, warn, Instrument};

use super::checkpoint::{workflow_name, CheckpointStatus};
use crate::config::CollectorConfig;
use crate::error::CollectorError;
use crate::ports::SyncPorts;
use crate::stats::CollectionStats;
use crate::Result;

/// 지표 동기화 옵션
#[derive(Debug, Clone, Default)]
pub struct IndicatorSyncOptions {
    /// 처리할 자산 유형 (None이면 설정값)
    pub asset_classes: Option<Vec<AssetClass>>,
    /// 특정 종목만 처리 (None이면 전체)
    pub codes: Option<Vec<String>>,
    /// 중단점부터 재개
    pub resume: bool,
    /// 동시 처리 종목 수 (None이면 설정값)
    pub concurrency: Option<usize>,
    /// 기준일 (None이면 오늘)
    pub today: Option<NaiveDate>,
}

/// 종목 하나의 처리 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstrumentOutcome {
    Written { rows: usize, signals: usize },
    UpToDate,
    Empty,
    Invalid(&'static str),
    Failed,
}

impl InstrumentOutcome {
    fn record(self, stats: &mut CollectionStats) {
        match self {
            Self::Written { rows, signals } => {
                stats.success += 1;
                stats.total_rows += rows;
                stats.total_signals += signals;
            }
            Self::UpToDate => stats.skipped += 1,
            Self::Empty => stats.empty += 1,
            Self::Invalid(kind) => stats.record_invalid(kind),
            Self::Failed => stats.errors += 1,
        }
    }
}

/// 지표 동기화 작업.
pub struct IndicatorSync {
    ports: SyncPorts,
    engine: Arc<IndicatorEngine>,
    planner: UpdatePlanner,
    rules: ScreeningRules,
    settings: SyncConfig,
}

impl IndicatorSync {
    /// 엔진/동기화 설정으로 생성합니다.
    pub fn new(ports: SyncPorts, engine: &EngineConfig, settings: SyncConfig) -> Self {
        let validator = SeriesValidator::new(engine.min_history);
        Self {
            ports,
            engine: Arc::new(IndicatorEngine::with_validator(validator)),
            planner: UpdatePlanner::new(engine.max_history_days, engine.max_rows),
            rules: ScreeningRules::default(),
            settings,
        }
    }

    /// Collector 설정으로 생성합니다.
    pub fn from_config(ports: SyncPorts, config: &CollectorConfig) -> Self {
        Self::new(ports, &config.engine, config.sync.clone())
    }

    /// 기본 처리 대상 자산 유형.
    pub fn asset_classes(&self) -> &[AssetClass] {
        &self.settings.asset_classes
    }

    /// 한 종목의 로드 계획을 조회합니다 (저장하지 않음).
    pub async fn plan_for(
        &self,
        asset_class: AssetClass,
        code: &str,
        today: NaiveDate,
    ) -> Result<UpdatePlan> {
        let watermark = self.ports.watermarks.watermark(asset_class, code).await?;
        Ok(self.planner.plan(code, watermark, today))
    }

    /// 대상 자산 유형 전체를 동기화합니다.
    pub async fn run(&self, options: &IndicatorSyncOptions) -> Result<CollectionStats> {
        let asset_classes = options
            .asset_classes
            .clone()
            .unwrap_or_else(|| self.settings.asset_classes.clone());

        let mut total = CollectionStats::new();
        for asset_class in asset_classes {
            let stats = self.sync_asset_class(asset_class, options).await?;
            stats.log_summary(&format!("지표 동기화 ({})", asset_class));
            total.merge(&stats);
        }
        Ok(total)
    }

    /// 한 자산 유형을 동기화합니다.
    pub async fn sync_asset_class(
        &self,
        asset_class: AssetClass,
        options: &IndicatorSyncOptions,
    ) -> Result<CollectionStats> {
        let start = Instant::now();
        let mut stats = CollectionStats::new();
        let workflow = workflow_name(asset_class);
        let checkpoints = &self.ports.checkpoints;

        // 체크포인트 로드 (resume 모드)
        let resume_code = if options.resume {
            match checkpoints.load_checkpoint(&workflow).await? {
                Some(code) => {
                    info!(asset_class = %asset_class, last_code = %code, "중단점부터 재개");
                    Some(code)
                }
                None => {
                    info!(asset_class = %asset_class, "이전 중단점 없음, 처음부터 시작");
                    None
                }
            }
        } else {
            None
        };

        let mut codes = match &options.codes {
            Some(codes) => codes.clone(),
            None => self.ports.universe.codes(asset_class).await?,
        };
        codes.sort();
        codes.dedup();
        if let Some(last) = &resume_code {
            codes.retain(|code| code > last);
        }

        if codes.is_empty() {
            info!(asset_class = %asset_class, "동기화할 종목이 없습니다");
            checkpoints
                .save_checkpoint(&workflow, "", 0, CheckpointStatus::Completed)
                .await?;
            stats.elapsed = start.elapsed();
            return Ok(stats);
        }

        stats.total = codes.len();
        let today = options.today.unwrap_or_else(|| Utc::now().date_naive());
        let concurrency = options
            .concurrency
            .unwrap_or(self.settings.concurrency)
            .max(1);
        info!(
            asset_class = %asset_class,
            total = stats.total,
            concurrency,
            %today,
            "지표 동기화 시작"
        );

        checkpoints
            .save_checkpoint(&workflow, "", 0, CheckpointStatus::Running)
            .await?;

        let mut processed = 0usize;
        for chunk in codes.chunks(self.settings.checkpoint_every.max(1)) {
            let outcomes: Vec<InstrumentOutcome> = stream::iter(
                chunk
                    .iter()
                    .map(|code| self.process_instrument(asset_class, code, today)),
            )
            .buffer_unordered(concurrency)
            .collect()
            .await;

            for outcome in outcomes {
                outcome.record(&mut stats);
            }
            processed += chunk.len();

            if let Some(last) = chunk.last() {
                checkpoints
                    .save_checkpoint(&workflow, last, processed as i32, CheckpointStatus::Running)
                    .await?;
            }
            info!(
                asset_class = %asset_class,
                progress = format!("{}/{}", processed, stats.total),
                "지표 동기화 진행 중"
            );
        }

        // 완료 상태 저장
        checkpoints
            .save_checkpoint(&workflow, "", processed as i32, CheckpointStatus::Completed)
            .await?;

        stats.elapsed = start.elapsed();
        Ok(stats)
    }

    /// 한 종목을 처리합니다. 실패는 결과로 기록되고 배치를 멈추지 않습니다.
    async fn process_instrument(
        &self,
        asset_class: AssetClass,
        code: &str,
        today: NaiveDate,
    ) -> InstrumentOutcome {
        let span = instrument_span!("instrument", asset_class, code);

        async move {
            match self.sync_instrument(asset_class, code, today).await {
                Ok(outcome) => outcome,
                Err(CollectorError::Skip(reason)) => {
                    warn!(reason = %reason, "잘못된 입력 데이터, 종목 건너뜀");
                    InstrumentOutcome::Invalid(reason.kind())
                }
                Err(e) if e.is_instrument_scoped() => {
                    warn!(error = %e, "종목 처리 실패");
                    InstrumentOutcome::Failed
                }
                Err(e) => {
                    error!(error = %e, "지표 동기화 실패 (저장소)");
                    InstrumentOutcome::Failed
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn sync_instrument(
        &self,
        asset_class: AssetClass,
        code: &str,
        today: NaiveDate,
    ) -> Result<InstrumentOutcome> {
        let plan = self.plan_for(asset_class, code, today).await?;
        if plan.is_up_to_date() {
            debug!(watermark = ?plan.watermark, "이미 최신 상태");
            return Ok(InstrumentOutcome::UpToDate);
        }

        let history = self.ports.loader.load(asset_class, &plan).await?;
        debug!(rows = history.len(), range_start = ?plan.range.start, "일봉 로드 완료");

        let engine = Arc::clone(&self.engine);
        let limit = self.settings.instrument_timeout();
        let computed = tokio::time::timeout(
            limit,
            tokio::task::spawn_blocking(move || engine.compute(&history)),
        )
        .await
        .map_err(|_| CollectorError::Timeout {
            code: code.to_string(),
            secs: limit.as_secs(),
        })??;
        let series = computed?;

        let fresh = UpdatePlanner::filter(series, plan.watermark);
        if fresh.is_empty() {
            debug!("새로 저장할 지표 행 없음");
            return Ok(InstrumentOutcome::Empty);
        }

        let rows = self.ports.sink.upsert(asset_class, &fresh).await?;
        let hits = self.rules.scan(&fresh);
        let signals = if hits.is_empty() {
            0
        } else {
            self.ports.sink.upsert_signals(asset_class, &hits).await?
        };

        debug!(
            rows,
            signals,
            last_date = ?fresh.last_date(),
            "지표 저장 완료"
        );
        Ok(InstrumentOutcome::Written { rows, signals })
    }
}
