//! 증분 업데이트 계획.
//!
//! 종목별 워터마크(마지막 처리일)를 기준으로 얼마나 과거 데이터를 읽을지,
//! 계산 결과 중 어떤 행을 새로 저장할지 결정합니다. 워터마크는 출력만
//! 거르며 입력을 자르지 않습니다. 지표 값은 항상 충분한 과거 구간 위에서
//! 계산됩니다.

use chrono::{Days, NaiveDate};
use screener_core::OhlcvPoint;
use serde::{Deserialize, Serialize};

use crate::series::IndicatorSeries;

/// 워터마크 이전으로 다시 읽어오는 달력 일수.
pub const MAX_HISTORY_WINDOW_DAYS: u32 = 300;

/// 워터마크가 없을 때 읽어오는 최대 행 수.
pub const MAX_ROWS: usize = 1000;

/// 날짜 구간 (양 끝 포함). `start`가 없으면 가장 오래된 데이터부터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// 시작일
    pub start: Option<NaiveDate>,
    /// 종료일
    pub end: NaiveDate,
}

impl DateRange {
    /// 날짜가 구간에 포함되는지 확인합니다.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && date <= self.end
    }
}

/// 한 종목의 데이터 로드 계획.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePlan {
    /// 종목 코드
    pub code: String,
    /// 마지막 처리일
    pub watermark: Option<NaiveDate>,
    /// 읽어올 날짜 구간
    pub range: DateRange,
    /// 최근 행 기준 최대 행 수 (없으면 제한 없음)
    pub row_limit: Option<usize>,
}

impl UpdatePlan {
    /// 이미 최신 상태인지 확인합니다 (`watermark >= 종료일`).
    pub fn is_up_to_date(&self) -> bool {
        self.watermark.is_some_and(|w| w >= self.range.end)
    }

    /// 워터마크 없는 전체 재계산인지 확인합니다.
    pub fn is_full_rebuild(&self) -> bool {
        self.watermark.is_none()
    }

    /// 계획에 맞는 데이터만 골라냅니다.
    ///
    /// 입력은 날짜 오름차순이어야 합니다. 행 수 제한은 최근 행 기준입니다.
    pub fn select(&self, points: &[OhlcvPoint]) -> Vec<OhlcvPoint> {
        let in_range: Vec<&OhlcvPoint> = points
            .iter()
            .filter(|p| self.range.contains(p.date))
            .collect();
        let skip = self
            .row_limit
            .map_or(0, |limit| in_range.len().saturating_sub(limit));
        in_range.into_iter().skip(skip).cloned().collect()
    }
}

/// 증분 업데이트 계획기.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePlanner {
    max_history_days: u32,
    max_rows: usize,
}

impl Default for UpdatePlanner {
    fn default() -> Self {
        Self::new(MAX_HISTORY_WINDOW_DAYS, MAX_ROWS)
    }
}

impl UpdatePlanner {
    /// 새 계획기를 생성합니다.
    pub fn new(max_history_days: u32, max_rows: usize) -> Self {
        Self {
            max_history_days,
            max_rows,
        }
    }

    /// 워터마크 이전 재조회 일수.
    pub fn max_history_days(&self) -> u32 {
        self.max_history_days
    }

    /// 전체 재계산 시 최대 행 수.
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// 로드 계획을 세웁니다.
    ///
    /// - 워터마크 있음: `[watermark - max_history_days, today]`, 행 수 제한 없음
    /// - 워터마크 없음: `[처음, today]`, 최근 `max_rows`행
    ///
    /// 시작일은 항상 워터마크 이하입니다. 날짜 범위를 벗어나면 처음부터 읽습니다.
    pub fn plan(
        &self,
        code: impl Into<String>,
        watermark: Option<NaiveDate>,
        today: NaiveDate,
    ) -> UpdatePlan {
        let (start, row_limit) = match watermark {
            Some(w) => (
                w.checked_sub_days(Days::new(u64::from(self.max_history_days))),
                None,
            ),
            None => (None, Some(self.max_rows)),
        };

        UpdatePlan {
            code: code.into(),
            watermark,
            range: DateRange { start, end: today },
            row_limit,
        }
    }

    /// 워터마크 이후(`date > watermark`) 행만 남깁니다.
    ///
    /// 계산이 끝난 결과에 대한 후처리이며 값은 바꾸지 않습니다.
    pub fn filter(series: IndicatorSeries, watermark: Option<NaiveDate>) -> IndicatorSeries {
        match watermark {
            None => series,
            Some(w) => IndicatorSeries {
                code: series.code,
                rows: series.rows.into_iter().filter(|r| r.date > w).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{IndicatorRow, IndicatorValues};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn indicator_series(dates: &[NaiveDate]) -> IndicatorSeries {
        IndicatorSeries {
            code: "000001".to_string(),
            rows: dates
                .iter()
                .map(|&date| IndicatorRow {
                    date,
                    code: "000001".to_string(),
                    close: 1.0,
                    values: IndicatorValues::default(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_plan_with_watermark() {
        let plan = UpdatePlanner::default().plan("000001", Some(day(2024, 11, 1)), day(2024, 11, 8));

        assert_eq!(plan.range.start, Some(day(2024, 1, 6)));
        assert_eq!(plan.range.end, day(2024, 11, 8));
        assert_eq!(plan.row_limit, None);
        assert!(!plan.is_up_to_date());
        assert!(!plan.is_full_rebuild());
    }

    #[test]
    fn test_window_start_never_after_watermark() {
        let watermark = day(2024, 3, 20);
        for days in [0, 1, 300, u32::MAX] {
            let plan = UpdatePlanner::new(days, 1000).plan("000001", Some(watermark), day(2024, 3, 31));
            assert!(
                plan.range.start.map_or(true, |start| start <= watermark),
                "window {days}: start {:?}",
                plan.range.start
            );
        }

        // 날짜 범위를 벗어나는 창은 처음부터 읽음
        let huge = UpdatePlanner::new(u32::MAX, 1000).plan("000001", Some(watermark), day(2024, 3, 31));
        assert_eq!(huge.range.start, None);
        assert_eq!(huge.row_limit, None);
    }

    #[test]
    fn test_plan_without_watermark() {
        let plan = UpdatePlanner::new(300, 500).plan("000001", None, day(2024, 11, 8));

        assert_eq!(plan.range.start, None);
        assert_eq!(plan.row_limit, Some(500));
        assert!(plan.is_full_rebuild());
        assert!(!plan.is_up_to_date());
    }

    #[test]
    fn test_up_to_date() {
        let planner = UpdatePlanner::default();
        assert!(planner
            .plan("000001", Some(day(2024, 11, 8)), day(2024, 11, 8))
            .is_up_to_date());
        assert!(planner
            .plan("000001", Some(day(2024, 11, 9)), day(2024, 11, 8))
            .is_up_to_date());
    }

    #[test]
    fn test_select_applies_range_and_limit() {
        let points: Vec<OhlcvPoint> = (1..=10)
            .map(|d| OhlcvPoint::new(day(2024, 3, d), "000001", 1.0, 1.0, 1.0, 1.0, 1.0))
            .collect();

        let limited = UpdatePlanner::new(300, 4).plan("000001", None, day(2024, 3, 9));
        let selected = limited.select(&points);
        assert_eq!(selected.len(), 4);
        assert_eq!(selected[0].date, day(2024, 3, 6));
        assert_eq!(selected[3].date, day(2024, 3, 9));

        let windowed = UpdatePlanner::new(3, 4).plan("000001", Some(day(2024, 3, 8)), day(2024, 3, 10));
        let selected = windowed.select(&points);
        assert_eq!(selected.first().map(|p| p.date), Some(day(2024, 3, 5)));
        assert_eq!(selected.len(), 6);
    }

    #[test]
    fn test_filter_is_strict() {
        let dates = [day(2024, 3, 1), day(2024, 3, 4), day(2024, 3, 5)];
        let filtered = UpdatePlanner::filter(indicator_series(&dates), Some(day(2024, 3, 4)));
        assert_eq!(filtered.dates(), vec![day(2024, 3, 5)]);

        let all = UpdatePlanner::filter(indicator_series(&dates), None);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_filter_before_all_rows_keeps_all() {
        let dates = [day(2024, 3, 1), day(2024, 3, 4)];
        let filtered = UpdatePlanner::filter(indicator_series(&dates), Some(day(2023, 1, 1)));
        assert_eq!(filtered.len(), 2);
    }
}
