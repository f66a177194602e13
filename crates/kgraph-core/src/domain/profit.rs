//! 단위 거래 수익 곡선 오버레이.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market_data::{ensure_strictly_increasing, TimePoint};
use super::signal::SignalKind;
use crate::error::CoreResult;
use crate::types::{Pair, Price, Quantity};

/// 수익 곡선의 한 행.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitRow {
    pub timestamp: DateTime<Utc>,
    pub close: Price,
    /// 이 행에서 실제로 체결된 거래 (잔고 부족 매도는 None)
    pub executed: Option<SignalKind>,
    /// 행 처리 후 보유 수량
    pub position_size: Quantity,
    /// 이 행의 현금 흐름 (매수는 음수, 매도는 양수)
    pub cash_flow: Decimal,
    /// `close × 보유 수량 − 누적 지출`
    pub cumulative_profit: Decimal,
}

/// `ProfitSeries`에서 꺼낼 수 있는 컬럼.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitColumn {
    PositionSize,
    CashFlow,
    CumulativeProfit,
}

impl ProfitColumn {
    pub const ALL: [ProfitColumn; 3] = [
        ProfitColumn::PositionSize,
        ProfitColumn::CashFlow,
        ProfitColumn::CumulativeProfit,
    ];

    pub fn value(&self, row: &ProfitRow) -> Decimal {
        match self {
            ProfitColumn::PositionSize => row.position_size,
            ProfitColumn::CashFlow => row.cash_flow,
            ProfitColumn::CumulativeProfit => row.cumulative_profit,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProfitColumn::PositionSize => "position_size",
            ProfitColumn::CashFlow => "cash_flow",
            ProfitColumn::CumulativeProfit => "cumulative_profit",
        }
    }
}

/// 첫 매수 신호부터 시작하는 수익 곡선.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitSeries {
    pair: Pair,
    lot_size: Quantity,
    rows: Vec<ProfitRow>,
}

impl ProfitSeries {
    pub fn new(pair: Pair, lot_size: Quantity, rows: Vec<ProfitRow>) -> CoreResult<Self> {
        ensure_strictly_increasing(rows.iter().map(|r| r.timestamp))?;
        Ok(Self {
            pair,
            lot_size,
            rows,
        })
    }

    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    pub fn lot_size(&self) -> Quantity {
        self.lot_size
    }

    pub fn rows(&self) -> &[ProfitRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 곡선 시작 시각 (첫 매수).
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.rows.first().map(|r| r.timestamp)
    }

    /// 마지막 행의 누적 수익.
    pub fn final_profit(&self) -> Option<Decimal> {
        self.rows.last().map(|r| r.cumulative_profit)
    }

    /// 실제 체결된 거래 시점의 누적 수익 (차트 마커용).
    pub fn trade_points(&self, kind: SignalKind) -> Vec<TimePoint> {
        self.rows
            .iter()
            .filter(|r| r.executed == Some(kind))
            .map(|r| TimePoint::new(r.timestamp, r.cumulative_profit))
            .collect()
    }

    pub fn column(&self, column: ProfitColumn) -> Vec<TimePoint> {
        self.rows
            .iter()
            .map(|r| TimePoint::new(r.timestamp, column.value(r)))
            .collect()
    }

    /// 마지막 `n`개 행만 남긴 새 곡선.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.rows.len().saturating_sub(n);
        Self {
            pair: self.pair.clone(),
            lot_size: self.lot_size,
            rows: self.rows[start..].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn row(
        minute: i64,
        close: Decimal,
        executed: Option<SignalKind>,
        position_size: Decimal,
        cash_flow: Decimal,
        cumulative_profit: Decimal,
    ) -> ProfitRow {
        ProfitRow {
            timestamp: Utc.timestamp_opt(minute * 60, 0).unwrap(),
            close,
            executed,
            position_size,
            cash_flow,
            cumulative_profit,
        }
    }

    /// 10에 매수, 12 보유, 15에 매도, 14에서 매도 무시
    fn curve() -> ProfitSeries {
        let rows = vec![
            row(0, dec!(10), Some(SignalKind::Buy), dec!(100), dec!(-1000), dec!(0)),
            row(1, dec!(12), None, dec!(100), dec!(0), dec!(200)),
            row(2, dec!(15), Some(SignalKind::Sell), dec!(0), dec!(1500), dec!(500)),
            row(3, dec!(14), None, dec!(0), dec!(0), dec!(500)),
        ];
        ProfitSeries::new(Pair::default(), dec!(100), rows).unwrap()
    }

    #[test]
    fn test_columns() {
        let curve = curve();

        let values = |column: ProfitColumn| -> Vec<Decimal> {
            curve.column(column).into_iter().map(|p| p.value).collect()
        };
        assert_eq!(
            values(ProfitColumn::PositionSize),
            vec![dec!(100), dec!(100), dec!(0), dec!(0)]
        );
        assert_eq!(
            values(ProfitColumn::CashFlow),
            vec![dec!(-1000), dec!(0), dec!(1500), dec!(0)]
        );
        assert_eq!(
            values(ProfitColumn::CumulativeProfit),
            vec![dec!(0), dec!(200), dec!(500), dec!(500)]
        );

        // 모든 컬럼은 곡선의 모든 행을 포함
        for column in ProfitColumn::ALL {
            assert_eq!(curve.column(column).len(), curve.len());
        }
    }

    #[test]
    fn test_trade_points_only_executed_rows() {
        let curve = curve();

        let buys = curve.trade_points(SignalKind::Buy);
        assert_eq!(buys, vec![TimePoint::new(curve.rows()[0].timestamp, dec!(0))]);

        let sells = curve.trade_points(SignalKind::Sell);
        assert_eq!(sells.len(), 1);
        assert_eq!(sells[0].timestamp, curve.rows()[2].timestamp);
        assert_eq!(sells[0].value, dec!(500));
    }

    #[test]
    fn test_tail_and_summary() {
        let curve = curve();
        assert_eq!(curve.start(), Some(curve.rows()[0].timestamp));
        assert_eq!(curve.final_profit(), Some(dec!(500)));

        let last_two = curve.tail(2);
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two.lot_size(), dec!(100));
        assert_eq!(last_two.rows()[0].close, dec!(15));
        assert_eq!(curve.tail(usize::MAX).len(), 4);
    }

    #[test]
    fn test_rejects_out_of_order_rows() {
        let rows = vec![
            row(1, dec!(10), None, dec!(0), dec!(0), dec!(0)),
            row(0, dec!(10), None, dec!(0), dec!(0), dec!(0)),
        ];
        assert!(ProfitSeries::new(Pair::default(), dec!(100), rows).is_err());
    }
}
