//! 설정 관리.
//!
//! 파일(TOML) + 환경 변수(`SCREENER__*`) 기반 애플리케이션 설정을 정의합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::CoreResult;
use crate::types::AssetClass;

/// 엔진 하한 데이터 수 (MACD 시그널이 처음 정의되는 지점).
pub const DEFAULT_MIN_HISTORY: usize = 34;

/// 증분 계산 시 워터마크 이전으로 다시 읽어오는 달력 일수.
pub const DEFAULT_MAX_HISTORY_DAYS: u32 = 300;

/// 워터마크가 없을 때 읽어오는 최대 행 수.
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 지표 엔진 설정
    #[serde(default)]
    pub engine: EngineConfig,
    /// 동기화 작업 설정
    #[serde(default)]
    pub sync: SyncConfig,
    /// 데몬 모드 설정
    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// 연결 URL
    #[serde(default)]
    pub url: String,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            connection_timeout_secs: 30,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 지표 엔진 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// 계산에 필요한 최소 데이터 수
    pub min_history: usize,
    /// 워터마크 이전으로 다시 읽어오는 달력 일수
    pub max_history_days: u32,
    /// 워터마크가 없을 때 읽어오는 최대 행 수
    pub max_rows: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_history: DEFAULT_MIN_HISTORY,
            max_history_days: DEFAULT_MAX_HISTORY_DAYS,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

/// 동기화 작업 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// 동시에 처리할 종목 수
    pub concurrency: usize,
    /// 종목당 계산 타임아웃 (초)
    pub instrument_timeout_secs: u64,
    /// 체크포인트 저장 주기 (종목 수)
    pub checkpoint_every: usize,
    /// 처리할 자산 유형
    pub asset_classes: Vec<AssetClass>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            instrument_timeout_secs: 30,
            checkpoint_every: 100,
            asset_classes: AssetClass::ALL.to_vec(),
        }
    }
}

impl SyncConfig {
    /// 종목당 계산 타임아웃.
    pub fn instrument_timeout(&self) -> Duration {
        Duration::from_secs(self.instrument_timeout_secs)
    }
}

/// 데몬 모드 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DaemonConfig {
    /// 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 60,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `SCREENER__SYNC__CONCURRENCY=16` 형식으로 파일 값을 덮어씁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let config = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .add_source(
                ::config::Environment::with_prefix("SCREENER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
    pub fn from_toml_str(toml: &str) -> CoreResult<Self> {
        let config = ::config::Config::builder()
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
