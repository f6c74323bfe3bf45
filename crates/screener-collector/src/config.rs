//! 환경변수 / 설정 파일 기반 Collector 설정.

use std::time::Duration;

use screener_core::{AppConfig, AssetClass, DaemonConfig, EngineConfig, SyncConfig};

use crate::error::CollectorError;
use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 최대 DB 연결 수
    pub max_connections: u32,
    /// DB 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
    /// 지표 엔진 설정
    pub engine: EngineConfig,
    /// 동기화 작업 설정
    pub sync: SyncConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            CollectorError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        let engine_defaults = EngineConfig::default();
        let sync_defaults = SyncConfig::default();

        let asset_classes = match std::env::var("INDICATOR_ASSET_CLASSES") {
            Ok(list) => AssetClass::parse_list(&list)?,
            Err(_) => sync_defaults.asset_classes,
        };

        Ok(Self {
            database_url,
            max_connections: env_var_parse("DATABASE_MAX_CONNECTIONS", 10),
            connection_timeout_secs: env_var_parse("DATABASE_CONNECT_TIMEOUT_SECS", 30),
            engine: EngineConfig {
                min_history: env_var_parse("INDICATOR_MIN_HISTORY", engine_defaults.min_history),
                max_history_days: env_var_parse(
                    "INDICATOR_MAX_HISTORY_DAYS",
                    engine_defaults.max_history_days,
                ),
                max_rows: env_var_parse("INDICATOR_MAX_ROWS", engine_defaults.max_rows),
            },
            sync: SyncConfig {
                concurrency: env_var_parse("INDICATOR_CONCURRENCY", sync_defaults.concurrency),
                instrument_timeout_secs: env_var_parse(
                    "INDICATOR_TIMEOUT_SECS",
                    sync_defaults.instrument_timeout_secs,
                ),
                checkpoint_every: env_var_parse(
                    "INDICATOR_CHECKPOINT_EVERY",
                    sync_defaults.checkpoint_every,
                ),
                asset_classes,
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 60),
            },
        })
    }

    /// 설정 파일에서 로드한 `AppConfig`로 생성합니다.
    ///
    /// 파일에 DB URL이 없으면 `DATABASE_URL` 환경변수를 사용합니다.
    pub fn from_app_config(app: AppConfig) -> Result<Self> {
        let database_url = if app.database.url.is_empty() {
            dotenvy::dotenv().ok();
            std::env::var("DATABASE_URL").map_err(|_| {
                CollectorError::Config(
                    "database.url 설정 또는 DATABASE_URL 환경변수가 필요합니다".to_string(),
                )
            })?
        } else {
            app.database.url
        };

        Ok(Self {
            database_url,
            max_connections: app.database.max_connections,
            connection_timeout_secs: app.database.connection_timeout_secs,
            engine: app.engine,
            sync: app.sync,
            daemon: app.daemon,
        })
    }

    /// 워크플로우 실행 주기
    pub fn daemon_interval(&self) -> Duration {
        Duration::from_secs(self.daemon.interval_minutes * 60)
    }

    /// DB 연결 타임아웃
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
