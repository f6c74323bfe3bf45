//! 수집 통계 구조체.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// 수집 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// 총 대상 종목 수
    pub total: usize,
    /// 성공 횟수
    pub success: usize,
    /// 에러 횟수 (로드/저장 실패, 타임아웃, 태스크 실패)
    pub errors: usize,
    /// 건너뛴 횟수 (이미 최신 데이터)
    pub skipped: usize,
    /// 빈 결과 (데이터 부족 또는 새 행 없음)
    pub empty: usize,
    /// 잘못된 입력으로 건너뛴 횟수 (사유별)
    pub invalid: BTreeMap<String, usize>,
    /// 저장된 총 지표 행 수
    pub total_rows: usize,
    /// 저장된 신호 수
    pub total_signals: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 잘못된 입력 건수 기록
    pub fn record_invalid(&mut self, kind: &str) {
        *self.invalid.entry(kind.to_string()).or_default() += 1;
    }

    /// 잘못된 입력 총 건수
    pub fn invalid_total(&self) -> usize {
        self.invalid.values().sum()
    }

    /// 처리 완료된 종목 수 (성공/실패/건너뜀 모두)
    pub fn processed(&self) -> usize {
        self.success + self.errors + self.skipped + self.empty + self.invalid_total()
    }

    /// 다른 통계를 합칩니다.
    pub fn merge(&mut self, other: &CollectionStats) {
        self.total += other.total;
        self.success += other.success;
        self.errors += other.errors;
        self.skipped += other.skipped;
        self.empty += other.empty;
        for (kind, count) in &other.invalid {
            *self.invalid.entry(kind.clone()).or_default() += count;
        }
        self.total_rows += other.total_rows;
        self.total_signals += other.total_signals;
        self.elapsed += other.elapsed;
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            skipped = self.skipped,
            empty = self.empty,
            invalid = self.invalid_total(),
            total_rows = self.total_rows,
            total_signals = self.total_signals,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 완료"
        );
    }
}
