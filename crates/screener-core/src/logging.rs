//! tracing을 사용한 로깅 인프라.
//!
//! 배치 작업 특성상 종목 단위 필드(`asset_class`, `code`)를 함께 남기는
//! 구조화된 로깅을 제공합니다:
//! - **pretty**: 개발용 사람이 읽기 쉬운 형식
//! - **json**: 운영환경/로그 집계용 JSON 형식
//! - **compact**: 크론 작업 로그용 한 줄 형식

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::Registry,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 사람이 읽기 쉬운 형식 (개발용)
    #[default]
    Pretty,
    /// 로그 집계용 JSON 형식 (운영용)
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "screener_collector=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// span 종료 이벤트 포함 여부 (종목별 처리 시간 확인용)
    pub with_span_events: bool,
    /// 파일명과 줄 번호 포함 여부
    pub with_file: bool,
    /// 스레드 ID 포함 여부 (blocking 풀 계산 추적용)
    pub with_thread_ids: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_span_events: false,
            with_file: false,
            with_thread_ids: false,
        }
    }
}

impl LogConfig {
    /// 새 로그 설정을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// span 이벤트를 활성화합니다.
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.with_span_events = enabled;
        self
    }

    /// 스레드 ID 출력을 설정합니다.
    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    /// 파일 설정(`[logging]` 섹션)에서 로그 설정을 생성합니다.
    ///
    /// 형식 문자열을 해석할 수 없으면 pretty 형식을 사용합니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
            ..Default::default()
        }
    }

    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// 레벨에는 `RUST_LOG`를, 형식에는 `LOG_FORMAT`을 사용합니다.
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self {
            level,
            format,
            ..Default::default()
        }
    }
}

/// 주어진 설정으로 로깅 시스템을 초기화합니다.
///
/// `RUST_LOG`가 설정되어 있으면 설정의 레벨보다 우선합니다.
///
/// # 예제
///
/// ```no_run
/// use screener_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig::new("screener_collector=debug").with_format(LogFormat::Json);
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let span_events = if config.with_span_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_thread_ids(config.with_thread_ids)
        .with_span_events(span_events);

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    tracing::debug!(
        format = ?config.format,
        level = %config.level,
        "로깅 초기화 완료"
    );

    Ok(())
}

/// 종목 처리 컨텍스트 필드가 포함된 span을 생성하는 매크로.
#[macro_export]
macro_rules! instrument_span {
    ($name:expr, $asset_class:expr) => {
        tracing::info_span!($name, asset_class = %$asset_class)
    };
    ($name:expr, $asset_class:expr, $code:expr) => {
        tracing::info_span!($name, asset_class = %$asset_class, code = %$code)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("COMPACT".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_config_from_settings() {
        let settings = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
        };
        let config = LogConfig::from_settings(&settings);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);

        let broken = LoggingConfig {
            level: "info".to_string(),
            format: "yaml".to_string(),
        };
        assert_eq!(LogConfig::from_settings(&broken).format, LogFormat::Pretty);
    }

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new("trace")
            .with_format(LogFormat::Compact)
            .with_span_events(true)
            .with_thread_ids(true);

        assert_eq!(config.level, "trace");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.with_span_events);
        assert!(config.with_thread_ids);
    }
}
