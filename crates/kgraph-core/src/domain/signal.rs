//! 스토캐스틱 교차에서 파생되는 매매 신호.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Price;

/// 신호 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// 과매도 구간에서 %K가 %D를 상향 돌파
    Buy,
    /// 과매수 구간에서 %K가 %D를 하향 돌파
    Sell,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
        }
    }
}

/// 특정 시각에 발생한 신호.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    /// 신호가 발생한 캔들의 시각
    pub timestamp: DateTime<Utc>,
    /// 해당 캔들의 종가
    pub price: Price,
}

impl Signal {
    pub fn buy(timestamp: DateTime<Utc>, price: Price) -> Self {
        Self {
            kind: SignalKind::Buy,
            timestamp,
            price,
        }
    }

    pub fn sell(timestamp: DateTime<Utc>, price: Price) -> Self {
        Self {
            kind: SignalKind::Sell,
            timestamp,
            price,
        }
    }
}
