//! 과매수/과매도 스크리닝.
//!
//! 여러 오실레이터가 동시에 극단 구간에 있는 날을 매수/매도 신호로 봅니다.
//! 모든 조건을 만족해야 신호가 발생합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::series::{IndicatorRow, IndicatorSeries};

/// 스크리닝 신호.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// 매수 (과매도)
    Buy,
    /// 매도 (과매수)
    Sell,
}

impl Signal {
    /// 신호 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 한 방향의 임계값 묶음.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub kdjk: f64,
    pub kdjd: f64,
    pub kdjj: f64,
    pub rsi_6: f64,
    pub cci: f64,
    pub cr: f64,
    pub wr_6: f64,
    pub vr: f64,
}

/// 스크리닝 규칙.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRules {
    /// 매수 조건 (모든 값이 임계값 이하)
    pub buy: Thresholds,
    /// 매도 조건 (모든 값이 임계값 이상)
    pub sell: Thresholds,
}

impl Default for ScreeningRules {
    fn default() -> Self {
        Self {
            buy: Thresholds {
                kdjk: 20.0,
                kdjd: 30.0,
                kdjj: -10.0,
                rsi_6: 20.0,
                cci: -100.0,
                cr: 40.0,
                wr_6: -80.0,
                vr: 40.0,
            },
            sell: Thresholds {
                kdjk: 80.0,
                kdjd: 70.0,
                kdjj: 100.0,
                rsi_6: 80.0,
                cci: 100.0,
                cr: 300.0,
                wr_6: -20.0,
                vr: 160.0,
            },
        }
    }
}

/// 신호가 발생한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningHit {
    /// 거래일
    pub date: NaiveDate,
    /// 종목 코드
    pub code: String,
    /// 신호
    pub signal: Signal,
    /// 종가
    pub close: f64,
}

impl ScreeningRules {
    /// 한 행을 평가합니다.
    pub fn evaluate(&self, row: &IndicatorRow) -> Option<Signal> {
        let v = &row.values;
        let b = &self.buy;
        let s = &self.sell;

        let buy = v.kdjk <= b.kdjk
            && v.kdjd <= b.kdjd
            && v.kdjj <= b.kdjj
            && v.rsi_6 <= b.rsi_6
            && v.cci <= b.cci
            && v.cr <= b.cr
            && v.wr_6 <= b.wr_6
            && v.vr <= b.vr;
        if buy {
            return Some(Signal::Buy);
        }

        let sell = v.kdjk >= s.kdjk
            && v.kdjd >= s.kdjd
            && v.kdjj >= s.kdjj
            && v.rsi_6 >= s.rsi_6
            && v.cci >= s.cci
            && v.cr >= s.cr
            && v.wr_6 >= s.wr_6
            && v.vr >= s.vr;
        sell.then_some(Signal::Sell)
    }

    /// 시계열 전체에서 신호가 발생한 행을 찾습니다.
    pub fn scan(&self, series: &IndicatorSeries) -> Vec<ScreeningHit> {
        series
            .rows
            .iter()
            .filter_map(|row| {
                self.evaluate(row).map(|signal| ScreeningHit {
                    date: row.date,
                    code: row.code.clone(),
                    signal,
                    close: row.close,
                })
            })
            .collect()
    }
}
