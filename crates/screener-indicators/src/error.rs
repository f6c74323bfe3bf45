//! 지표 계산 건너뜀 사유.

use chrono::NaiveDate;
use screener_core::Column;
use thiserror::Error;

/// 한 종목의 지표 계산을 건너뛰는 사유.
///
/// 어떤 사유도 배치 전체를 중단시키지 않습니다. 수치 이상(NaN/Inf)은
/// 정규화 단계에서 항상 복구되므로 여기에 포함되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// 데이터 부족 (데이터가 더 쌓이면 재시도)
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientHistory { required: usize, provided: usize },

    /// 필수 컬럼 누락
    #[error("필수 컬럼 누락: {column} (행 {index})")]
    MissingColumn { column: Column, index: usize },

    /// 날짜가 엄격한 오름차순이 아님 (중복 포함)
    #[error("날짜가 오름차순이 아닙니다: 행 {index} ({previous} 다음 {current})")]
    NotAscending {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    /// 다른 종목의 데이터가 섞여 있음
    #[error("다른 종목 데이터가 포함되어 있습니다: 기대 {expected}, 실제 {found}")]
    MixedCode { expected: String, found: String },
}

impl SkipReason {
    /// 데이터가 쌓이면 자연히 해소되는 사유인지 확인합니다.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SkipReason::InsufficientHistory { .. })
    }

    /// 통계/로그용 짧은 분류 이름.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::InsufficientHistory { .. } => "insufficient_history",
            SkipReason::MissingColumn { .. } => "missing_column",
            SkipReason::NotAscending { .. } => "not_ascending",
            SkipReason::MixedCode { .. } => "mixed_code",
        }
    }
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, SkipReason>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable() {
        let short = SkipReason::InsufficientHistory {
            required: 34,
            provided: 10,
        };
        assert!(short.is_recoverable());
        assert_eq!(short.to_string(), "데이터가 부족합니다: 필요 34개, 제공 10개");

        let missing = SkipReason::MissingColumn {
            column: Column::Volume,
            index: 3,
        };
        assert!(!missing.is_recoverable());
        assert_eq!(missing.kind(), "missing_column");
    }
}
