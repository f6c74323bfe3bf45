//! 일봉 OHLCV 데이터 구조체.
//!
//! 로더가 일부 컬럼을 제공하지 못할 수 있으므로 시장 컬럼은 `Option`으로 두고,
//! 컬럼 누락 판정은 지표 엔진의 검증 단계에서 수행합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// OHLCV 입력 컬럼.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// 날짜
    Date,
    /// 시가
    Open,
    /// 고가
    High,
    /// 저가
    Low,
    /// 종가
    Close,
    /// 거래량
    Volume,
    /// 거래대금
    Amount,
}

impl Column {
    /// 컬럼 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Open => "open",
            Column::High => "high",
            Column::Low => "low",
            Column::Close => "close",
            Column::Volume => "volume",
            Column::Amount => "amount",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 하루치 OHLCV 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvPoint {
    /// 거래일
    pub date: NaiveDate,
    /// 종목 코드
    pub code: String,
    /// 시가
    pub open: Option<f64>,
    /// 고가
    pub high: Option<f64>,
    /// 저가
    pub low: Option<f64>,
    /// 종가
    pub close: Option<f64>,
    /// 거래량
    pub volume: Option<f64>,
    /// 거래대금 (제공되지 않는 데이터 소스가 있음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl OhlcvPoint {
    /// 모든 시장 컬럼이 채워진 데이터를 생성합니다.
    pub fn new(
        date: NaiveDate,
        code: impl Into<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            date,
            code: code.into(),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
            amount: None,
        }
    }

    /// 거래대금을 설정합니다.
    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// 컬럼 값 조회 (`Date`는 항상 존재하므로 `None`).
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Date => None,
            Column::Open => self.open,
            Column::High => self.high,
            Column::Low => self.low,
            Column::Close => self.close,
            Column::Volume => self.volume,
            Column::Amount => self.amount,
        }
    }
}

/// 한 종목의 날짜 오름차순 OHLCV 시계열.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OhlcvSeries {
    /// 종목 코드
    pub code: String,
    /// 날짜 오름차순 데이터
    pub points: Vec<OhlcvPoint>,
}

impl OhlcvSeries {
    /// 새 시계열을 생성합니다.
    pub fn new(code: impl Into<String>, points: Vec<OhlcvPoint>) -> Self {
        Self {
            code: code.into(),
            points,
        }
    }

    /// 데이터 수.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 비어 있는지 여부.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 첫 거래일.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// 마지막 거래일.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}
