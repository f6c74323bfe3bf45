//! 에러 타입 정의.

use std::fmt;

use screener_core::CoreError;
use screener_indicators::SkipReason;

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 데이터베이스 에러
    Database(sqlx::Error),
    /// 설정 에러
    Config(String),
    /// 지표 계산 건너뜀 (입력 데이터 문제)
    Skip(SkipReason),
    /// 종목 처리 시간 초과
    Timeout { code: String, secs: u64 },
    /// 작업 태스크 실패 (panic, 취소)
    Task(String),
    /// 일반 에러
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl CollectorError {
    /// 종목 단위 실패인지 확인합니다 (배치는 계속 진행).
    pub fn is_instrument_scoped(&self) -> bool {
        matches!(
            self,
            Self::Skip(_) | Self::Timeout { .. } | Self::Task(_)
        )
    }
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Skip(reason) => write!(f, "Skipped: {}", reason),
            Self::Timeout { code, secs } => {
                write!(f, "Timeout: {} ({}초 초과)", code, secs)
            }
            Self::Task(msg) => write!(f, "Task error: {}", msg),
            Self::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            Self::Skip(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for CollectorError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

impl From<std::env::VarError> for CollectorError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<CoreError> for CollectorError {
    fn from(err: CoreError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SkipReason> for CollectorError {
    fn from(reason: SkipReason) -> Self {
        Self::Skip(reason)
    }
}

impl From<tokio::task::JoinError> for CollectorError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CollectorError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Other(err)
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CollectorError::Timeout {
            code: "600000".to_string(),
            secs: 30,
        };
        assert_eq!(err.to_string(), "Timeout: 600000 (30초 초과)");
        assert!(err.is_instrument_scoped());

        let err = CollectorError::Config("DATABASE_URL 없음".to_string());
        assert!(!err.is_instrument_scoped());
    }

    #[tokio::test]
    async fn test_panicked_task_is_instrument_scoped() {
        let join_err = tokio::task::spawn_blocking(|| -> usize { panic!("지표 계산 중 panic") })
            .await
            .unwrap_err();
        assert!(join_err.is_panic());

        let err: CollectorError = join_err.into();
        assert!(matches!(err, CollectorError::Task(_)));
        assert!(err.is_instrument_scoped());
        assert!(err.to_string().starts_with("Task error: "));
    }

    #[test]
    fn test_from_skip_reason() {
        let err: CollectorError = SkipReason::InsufficientHistory {
            required: 34,
            provided: 3,
        }
        .into();
        assert!(matches!(err, CollectorError::Skip(_)));
        assert!(err.to_string().starts_with("Skipped: "));
    }
}
