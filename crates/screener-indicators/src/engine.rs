//! 지표 엔진.
//!
//! 검증 → 계열별 계산 → 정규화 → 행 조립 순서로 한 종목의 지표 시계열을
//! 만듭니다. 엔진은 상태가 없고 같은 입력에 대해 항상 같은 결과를 냅니다.

use std::fmt;

use screener_core::OhlcvSeries;
use tracing::{debug, trace};

use crate::error::{IndicatorResult, SkipReason};
use crate::indicators::{default_families, IndicatorFamily};
use crate::normalizer::NumericNormalizer;
use crate::series::{IndicatorColumns, IndicatorRow, IndicatorSeries};
use crate::validator::{SeriesValidator, ValidSeries};

/// 통합 지표 엔진.
pub struct IndicatorEngine {
    validator: SeriesValidator,
    normalizer: NumericNormalizer,
    families: Vec<Box<dyn IndicatorFamily>>,
}

impl fmt::Debug for IndicatorEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorEngine")
            .field("validator", &self.validator)
            .field(
                "families",
                &self.families.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorEngine {
    /// 기본 검증기로 엔진을 생성합니다.
    pub fn new() -> Self {
        Self::with_validator(SeriesValidator::default())
    }

    /// 검증기를 지정해 엔진을 생성합니다.
    pub fn with_validator(validator: SeriesValidator) -> Self {
        Self {
            validator,
            normalizer: NumericNormalizer::new(),
            families: default_families(),
        }
    }

    /// 최소 데이터 수.
    pub fn min_history(&self) -> usize {
        self.validator.min_history()
    }

    /// 한 종목의 지표 시계열을 계산합니다.
    ///
    /// 데이터가 부족하면 빈 시계열을 반환합니다 (에러 아님). 그 외 검증
    /// 실패는 `SkipReason`으로 반환하며 호출자는 해당 종목만 건너뜁니다.
    ///
    /// 행은 `min_history - 1` 인덱스부터 만들어집니다. 입력이 `N`개이면
    /// `N - min_history + 1`개 행이 나옵니다.
    pub fn compute(&self, series: &OhlcvSeries) -> IndicatorResult<IndicatorSeries> {
        let valid = match self.validator.validate(series) {
            Ok(valid) => valid,
            Err(reason @ SkipReason::InsufficientHistory { .. }) => {
                debug!(code = %series.code, %reason, "데이터 부족, 지표 계산 생략");
                return Ok(IndicatorSeries::empty(series.code.clone()));
            }
            Err(reason) => return Err(reason),
        };

        let columns = self.compute_columns(&valid);
        let start = self.validator.min_history() - 1;
        let rows = (start..valid.len())
            .map(|i| IndicatorRow {
                date: valid.dates[i],
                code: valid.code.clone(),
                close: valid.close[i],
                values: columns.row(i),
            })
            .collect::<Vec<_>>();

        trace!(code = %valid.code, rows = rows.len(), "지표 계산 완료");
        Ok(IndicatorSeries {
            code: valid.code,
            rows,
        })
    }

    /// 검증된 시계열의 정규화된 지표 컬럼을 계산합니다.
    ///
    /// 반환 컬럼은 입력과 길이와 위치가 같습니다.
    pub fn compute_columns(&self, series: &ValidSeries) -> IndicatorColumns {
        let mut columns = IndicatorColumns::default();
        for family in &self.families {
            family.fill(series, &mut columns);
        }

        let report = self.normalizer.normalize(&mut columns);
        if !report.is_clean() {
            debug!(
                code = %series.code,
                replaced = report.total(),
                columns = report.replaced.len(),
                "NaN/Inf 값을 0으로 대체"
            );
        }
        columns
    }
}
