//! 자산 유형 정의.
//!
//! 자산 유형마다 일봉 이력 테이블과 지표 테이블이 분리되어 있습니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 지표 계산 대상 자산 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// 개별 주식
    Stock,
    /// 상장지수펀드
    Etf,
    /// 시장 지수
    Index,
    /// 업종 지수
    Industry,
}

impl AssetClass {
    /// 모든 자산 유형 (처리 순서).
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Stock,
        AssetClass::Etf,
        AssetClass::Index,
        AssetClass::Industry,
    ];

    /// 소문자 식별자.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Stock => "stock",
            AssetClass::Etf => "etf",
            AssetClass::Index => "index",
            AssetClass::Industry => "industry",
        }
    }

    /// 일봉 이력 테이블 이름.
    pub fn history_table(&self) -> String {
        format!("{}_hist_daily", self.as_str())
    }

    /// 지표 결과 테이블 이름.
    pub fn indicator_table(&self) -> String {
        format!("{}_indicator_daily", self.as_str())
    }

    /// 매수/매도 신호 테이블 이름.
    pub fn signal_table(&self) -> String {
        format!("{}_indicator_signal", self.as_str())
    }

    /// 쉼표로 구분된 목록 파싱 (예: "stock,etf").
    pub fn parse_list(s: &str) -> Result<Vec<AssetClass>, CoreError> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" => Ok(AssetClass::Stock),
            "etf" => Ok(AssetClass::Etf),
            "index" => Ok(AssetClass::Index),
            "industry" => Ok(AssetClass::Industry),
            other => Err(CoreError::InvalidInput(format!(
                "알 수 없는 자산 유형: {}",
                other
            ))),
        }
    }
}
