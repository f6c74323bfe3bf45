//! 지표 결과 구조체.
//!
//! 지표 컬럼 목록은 `indicator_columns!` 한 곳에서 정의하고, 행 단위
//! 구조체(`IndicatorValues`)와 컬럼 단위 구조체(`IndicatorColumns`)를 함께
//! 생성합니다. 필드 접근은 컴파일 타임에 확인되고, 저장/정규화처럼 전체
//! 컬럼을 순회해야 하는 곳은 `COLUMNS` 목록을 사용합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! indicator_columns {
    ($($field:ident => $name:tt),* $(,)?) => {
        /// 한 거래일의 지표 값.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        pub struct IndicatorValues {
            $(
                #[serde(rename = $name)]
                pub $field: f64,
            )*
        }

        impl IndicatorValues {
            /// 출력 순서의 컬럼 이름.
            pub const COLUMNS: &'static [&'static str] = &[$($name),*];

            /// 컬럼 이름으로 값 조회.
            pub fn get(&self, column: &str) -> Option<f64> {
                match column {
                    $($name => Some(self.$field),)*
                    _ => None,
                }
            }

            /// `COLUMNS` 순서의 값 목록.
            pub fn to_vec(&self) -> Vec<f64> {
                vec![$(self.$field),*]
            }
        }

        /// 입력 시계열과 위치가 정렬된 지표 컬럼.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct IndicatorColumns {
            $(pub $field: Vec<f64>,)*
        }

        impl IndicatorColumns {
            /// `(컬럼 이름, 값)` 목록.
            pub fn columns(&self) -> Vec<(&'static str, &[f64])> {
                vec![$(($name, self.$field.as_slice())),*]
            }

            /// 수정 가능한 `(컬럼 이름, 값)` 목록.
            pub fn columns_mut(&mut self) -> Vec<(&'static str, &mut Vec<f64>)> {
                vec![$(($name, &mut self.$field)),*]
            }

            /// `index` 위치의 행. 채워지지 않은 컬럼은 0.0입니다.
            pub fn row(&self, index: usize) -> IndicatorValues {
                IndicatorValues {
                    $($field: self.$field.get(index).copied().unwrap_or(0.0),)*
                }
            }
        }
    };
}

indicator_columns! {
    // 추세
    macd => "macd",
    macds => "macds",
    macdh => "macdh",
    boll_ub => "boll_ub",
    boll => "boll",
    boll_lb => "boll_lb",
    pdi => "pdi",
    mdi => "mdi",
    dx => "dx",
    adx => "adx",
    adxr => "adxr",
    sar => "sar",
    dpo => "dpo",
    madpo => "madpo",
    vhf => "vhf",
    trix => "trix",
    trix_20_sma => "trix_20_sma",
    dma => "dma",
    dma_10_sma => "dma_10_sma",
    tema => "tema",
    // 변동성
    tr => "tr",
    atr => "atr",
    // 모멘텀
    kdjk => "kdjk",
    kdjd => "kdjd",
    kdjj => "kdjj",
    rsi => "rsi",
    rsi_6 => "rsi_6",
    rsi_12 => "rsi_12",
    rsi_24 => "rsi_24",
    wr_6 => "wr_6",
    wr_10 => "wr_10",
    wr_14 => "wr_14",
    cci => "cci",
    cci_84 => "cci_84",
    stochrsi_k => "stochrsi_k",
    stochrsi_d => "stochrsi_d",
    roc => "roc",
    rocma => "rocma",
    rocema => "rocema",
    ppo => "ppo",
    ppos => "ppos",
    ppoh => "ppoh",
    wt1 => "wt1",
    wt2 => "wt2",
    bias => "bias",
    bias_12 => "bias_12",
    bias_24 => "bias_24",
    mtm => "mtm",
    mtmma => "mtmma",
    // 거래량
    obv => "obv",
    maobv => "maobv",
    vr => "vr",
    vr_6_sma => "vr_6_sma",
    vwma => "vwma",
    mvwma => "mvwma",
    mfi => "mfi",
    mfisma => "mfisma",
    fi => "fi",
    force_2 => "force_2",
    force_13 => "force_13",
    emv => "emv",
    emva => "emva",
    // 심리
    psy => "psy",
    psyma => "psyma",
    br => "br",
    ar => "ar",
    ene_ue => "ene_ue",
    ene => "ene",
    ene_le => "ene_le",
    rvi => "rvi",
    rvis => "rvis",
    cr => "cr",
    cr_ma1 => "cr-ma1",
    cr_ma2 => "cr-ma2",
    cr_ma3 => "cr-ma3",
}

/// 한 거래일의 지표 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    /// 거래일
    pub date: NaiveDate,
    /// 종목 코드
    pub code: String,
    /// 종가
    pub close: f64,
    /// 지표 값
    #[serde(flatten)]
    pub values: IndicatorValues,
}

/// 한 종목의 날짜 오름차순 지표 시계열.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    /// 종목 코드
    pub code: String,
    /// 지표 행
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorSeries {
    /// 빈 시계열 ("아직 데이터 부족").
    pub fn empty(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            rows: Vec::new(),
        }
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 비어 있는지 여부.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 첫 거래일.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    /// 마지막 거래일.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// 마지막 행.
    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// 날짜 목록.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// 특정 컬럼의 값 목록. 알 수 없는 컬럼이면 `None`.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        if !IndicatorValues::COLUMNS.contains(&name) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .filter_map(|r| r.values.get(name))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_unique() {
        let mut names = IndicatorValues::COLUMNS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), IndicatorValues::COLUMNS.len());
    }

    #[test]
    fn test_get_by_name() {
        let values = IndicatorValues {
            cr_ma1: 12.5,
            rsi_6: 70.0,
            ..Default::default()
        };
        assert_eq!(values.get("cr-ma1"), Some(12.5));
        assert_eq!(values.get("rsi_6"), Some(70.0));
        assert_eq!(values.get("cr_ma1"), None);
        assert_eq!(values.to_vec().len(), IndicatorValues::COLUMNS.len());
    }

    #[test]
    fn test_row_serializes_flat_with_original_names() {
        let row = IndicatorRow {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            code: "600519".to_string(),
            close: 1700.0,
            values: IndicatorValues {
                cr_ma2: 3.0,
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["code"], "600519");
        assert_eq!(json["cr-ma2"], 3.0);
        assert!(json.get("values").is_none());
    }

    #[test]
    fn test_columns_row_defaults_missing_to_zero() {
        let columns = IndicatorColumns {
            macd: vec![1.0, 2.0],
            ..Default::default()
        };
        let row = columns.row(1);
        assert_eq!(row.macd, 2.0);
        assert_eq!(row.atr, 0.0);
    }
}
