//! 수치 정규화.
//!
//! 워밍업 이전 구간(NaN)과 0 나눗셈에서 생긴 무한대를 모두 0.0으로 바꿉니다.
//! 엔진은 계열 계산이 끝난 뒤 모든 컬럼에 한 번만 적용합니다.

use serde::Serialize;

use crate::series::IndicatorColumns;

/// NaN, ±Inf를 0.0으로 바꾸고 바뀐 개수를 반환합니다.
pub fn normalize_column(values: &mut [f64]) -> usize {
    let mut replaced = 0;
    for value in values.iter_mut() {
        if !value.is_finite() {
            *value = 0.0;
            replaced += 1;
        }
    }
    replaced
}

/// 정규화 결과 (컬럼별 교체 개수).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnomalyReport {
    /// 교체가 있었던 `(컬럼, 개수)` 목록
    pub replaced: Vec<(&'static str, usize)>,
}

impl AnomalyReport {
    /// 교체된 값의 총 개수.
    pub fn total(&self) -> usize {
        self.replaced.iter().map(|(_, count)| count).sum()
    }

    /// 교체가 없었는지 여부.
    pub fn is_clean(&self) -> bool {
        self.replaced.is_empty()
    }

    /// 특정 컬럼의 교체 개수.
    pub fn count(&self, column: &str) -> usize {
        self.replaced
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// 지표 컬럼 정규화기.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericNormalizer;

impl NumericNormalizer {
    /// 새 정규화기를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 모든 컬럼을 정규화합니다.
    pub fn normalize(&self, columns: &mut IndicatorColumns) -> AnomalyReport {
        let replaced = columns
            .columns_mut()
            .into_iter()
            .filter_map(|(name, values)| {
                let count = normalize_column(values);
                (count > 0).then_some((name, count))
            })
            .collect();
        AnomalyReport { replaced }
    }
}
