//! 지표 동기화 Collector CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use screener_collector::modules::{workflow_name, IndicatorSync, IndicatorSyncOptions};
use screener_collector::ports::CheckpointStore;
use screener_collector::{CollectorConfig, PgStore, SyncPorts};
use screener_core::{init_logging, AppConfig, AssetClass, LogConfig, LogFormat};

#[derive(Parser)]
#[command(name = "screener-collector")]
#[command(about = "Incremental technical indicator sync", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로 (없으면 환경변수 사용)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// 기술적 지표 증분 동기화
    SyncIndicators {
        /// 자산 유형 (쉼표로 구분, 예: "stock,etf")
        #[arg(long)]
        asset_class: Option<String>,

        /// 특정 종목만 처리 (쉼표로 구분, 예: "600000,000001")
        #[arg(long)]
        codes: Option<String>,

        /// 중단점부터 재개
        #[arg(long)]
        resume: bool,

        /// 동시 처리 종목 수
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// 한 종목의 워터마크와 로드 구간 출력
    Plan {
        /// 자산 유형
        #[arg(long)]
        asset_class: AssetClass,

        /// 종목 코드
        #[arg(long)]
        code: String,
    },

    /// 지표/신호/체크포인트 테이블 생성
    InitSchema {
        /// 자산 유형 (쉼표로 구분, 없으면 설정값)
        #[arg(long)]
        asset_class: Option<String>,
    },

    /// 체크포인트 상태 조회
    Checkpoints,

    /// 체크포인트 삭제
    ClearCheckpoint {
        /// 워크플로우 이름 (예: indicator_sync_stock)
        #[arg(long)]
        workflow: String,
    },

    /// 데몬 모드: 주기적으로 지표 동기화 실행
    Daemon,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 설정 로드
    let app_config = match &cli.config {
        Some(path) => Some(
            AppConfig::load(path)
                .with_context(|| format!("설정 파일 로드 실패: {}", path.display()))?,
        ),
        None => None,
    };

    // 로깅 초기화
    let mut log_config = app_config
        .as_ref()
        .map(|app| LogConfig::from_settings(&app.logging))
        .unwrap_or_else(LogConfig::from_env);
    if let Some(level) = &cli.log_level {
        log_config.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        log_config.format = format;
    }
    init_logging(log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    tracing::info!("Screener Collector 시작");

    let config = match app_config {
        Some(app) => CollectorConfig::from_app_config(app)?,
        None => CollectorConfig::from_env()?,
    };
    tracing::debug!(
        max_connections = config.max_connections,
        asset_classes = ?config.sync.asset_classes,
        "설정 로드 완료"
    );

    // DB 연결
    let store = Arc::new(PgStore::connect(&config).await?);
    let sync = IndicatorSync::from_config(SyncPorts::from_store(store.clone()), &config);

    // 명령 실행
    match cli.command {
        Commands::SyncIndicators {
            asset_class,
            codes,
            resume,
            concurrency,
        } => {
            let options = IndicatorSyncOptions {
                asset_classes: asset_class
                    .as_deref()
                    .map(AssetClass::parse_list)
                    .transpose()?,
                codes: codes.as_deref().map(parse_codes),
                resume,
                concurrency,
                today: None,
            };
            if let Some(stats) = run_until_interrupted(&sync, store.as_ref(), &options).await? {
                stats.log_summary("지표 동기화");
            }
        }
        Commands::Plan { asset_class, code } => {
            let plan = sync
                .plan_for(asset_class, &code, Utc::now().date_naive())
                .await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::InitSchema { asset_class } => {
            let classes = match asset_class.as_deref() {
                Some(list) => AssetClass::parse_list(list)?,
                None => config.sync.asset_classes.clone(),
            };
            store.ensure_schema(&classes).await?;
            tracing::info!(count = classes.len(), "스키마 초기화 완료");
        }
        Commands::Checkpoints => {
            let checkpoints = store.list_checkpoints().await?;
            if checkpoints.is_empty() {
                println!("저장된 체크포인트가 없습니다");
            }
            for info in checkpoints {
                println!(
                    "{:<28} {:<12} last_code={:<10} processed={:<6} at={}",
                    info.workflow_name,
                    info.status,
                    info.last_code.as_deref().unwrap_or("-"),
                    info.total_processed,
                    info.last_processed_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }
        Commands::ClearCheckpoint { workflow } => {
            store.clear_checkpoint(&workflow).await?;
            tracing::info!(workflow = %workflow, "체크포인트 삭제 완료");
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon_interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let options = IndicatorSyncOptions::default();

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        tracing::info!("=== 지표 동기화 시작 ===");
                        match run_until_interrupted(&sync, store.as_ref(), &options).await {
                            Ok(Some(stats)) => stats.log_summary("지표 동기화"),
                            Ok(None) => break,
                            Err(e) => tracing::error!("지표 동기화 실패: {}", e),
                        }
                        tracing::info!(
                            "=== 동기화 완료, 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    store.close().await;
    tracing::info!("Screener Collector 종료");

    Ok(())
}

/// 동기화를 실행하고, 종료 신호가 오면 실행 중인 체크포인트를 중단 상태로 표시합니다.
///
/// 중단되면 `None`을 반환합니다.
async fn run_until_interrupted(
    sync: &IndicatorSync,
    checkpoints: &dyn CheckpointStore,
    options: &IndicatorSyncOptions,
) -> anyhow::Result<Option<screener_collector::CollectionStats>> {
    tokio::select! {
        result = sync.run(options) => Ok(Some(result?)),
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("종료 신호 수신, 체크포인트를 중단 상태로 표시");
            let classes = options
                .asset_classes
                .clone()
                .unwrap_or_else(|| sync.asset_classes().to_vec());
            for asset_class in classes {
                checkpoints.mark_interrupted(&workflow_name(asset_class)).await?;
            }
            Ok(None)
        }
    }
}

fn parse_codes(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}
