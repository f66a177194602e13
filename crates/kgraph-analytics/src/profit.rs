//! 신호 기반 수익 시뮬레이션.
//!
//! 매수 신호마다 고정 수량(lot)을 매수하고, 매도 신호에서 보유 수량이
//! lot 이상이면 lot만큼 매도합니다. 누적 수익은 다음과 같습니다.
//!
//! ```text
//! cumulative_profit = close × position_size - total_spent
//! ```
//!
//! 시뮬레이션 결과는 첫 매수 신호 행부터 시작합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use kgraph_core::{IndicatorSeries, ProfitRow, ProfitSeries, Quantity, SignalKind};

use crate::indicators::{IndicatorError, IndicatorResult};

/// 기본 거래 단위 (코인 수).
pub const DEFAULT_LOT_SIZE: Quantity = dec!(100);

/// 고정 lot 수익 시뮬레이터.
#[derive(Debug, Clone, Copy)]
pub struct ProfitSimulator {
    lot_size: Quantity,
}

impl Default for ProfitSimulator {
    fn default() -> Self {
        Self {
            lot_size: DEFAULT_LOT_SIZE,
        }
    }
}

impl ProfitSimulator {
    pub fn new(lot_size: Quantity) -> IndicatorResult<Self> {
        if lot_size <= Decimal::ZERO {
            return Err(IndicatorError::InvalidParameter(format!(
                "거래 단위는 0보다 커야 합니다: {}",
                lot_size
            )));
        }
        Ok(Self { lot_size })
    }

    pub fn lot_size(&self) -> Quantity {
        self.lot_size
    }

    /// 지표 시계열의 신호로 수익 곡선을 계산합니다.
    ///
    /// 매수 신호가 없으면 `Ok(None)`을 반환합니다.
    pub fn simulate(&self, series: &IndicatorSeries) -> IndicatorResult<Option<ProfitSeries>> {
        let Some(start) = series.first_buy_index() else {
            debug!(pair = %series.pair(), "매수 신호 없음, 수익 시뮬레이션 생략");
            return Ok(None);
        };

        let lot = self.lot_size;
        let mut position_size = Decimal::ZERO;
        let mut total_spent = Decimal::ZERO;
        let mut rows = Vec::with_capacity(series.len() - start);

        for row in &series.rows()[start..] {
            let close = row.candle.close;
            let overflow = || {
                IndicatorError::CalculationError(format!(
                    "수익 계산 범위 초과 ({})",
                    row.candle.timestamp
                ))
            };
            let notional = close.checked_mul(lot).ok_or_else(overflow)?;
            let mut executed = None;
            let mut cash_flow = Decimal::ZERO;

            if row.buy_signal {
                position_size = position_size.checked_add(lot).ok_or_else(overflow)?;
                total_spent = total_spent.checked_add(notional).ok_or_else(overflow)?;
                cash_flow = -notional;
                executed = Some(SignalKind::Buy);
            } else if row.sell_signal && position_size >= lot {
                position_size -= lot;
                total_spent = total_spent.checked_sub(notional).ok_or_else(overflow)?;
                cash_flow = notional;
                executed = Some(SignalKind::Sell);
            }

            let cumulative_profit = close
                .checked_mul(position_size)
                .and_then(|held| held.checked_sub(total_spent))
                .ok_or_else(overflow)?;

            rows.push(ProfitRow {
                timestamp: row.candle.timestamp,
                close,
                executed,
                position_size,
                cash_flow,
                cumulative_profit,
            });
        }

        let profit = ProfitSeries::new(series.pair().clone(), lot, rows)
            .map_err(|e| IndicatorError::CalculationError(e.to_string()))?;

        debug!(
            pair = %series.pair(),
            rows = profit.len(),
            final_profit = ?profit.final_profit(),
            "수익 시뮬레이션 완료"
        );

        Ok(Some(profit))
    }
}
