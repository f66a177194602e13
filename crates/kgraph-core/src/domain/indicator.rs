//! 스토캐스틱 지표 오버레이.
//!
//! `IndicatorSeries`는 원본 `Series`와 같은 타임스탬프 인덱스에 정렬된
//! 파생 컬럼(%K, %D, 구간 고가/저가, 신호)을 담습니다. 워밍업 구간은
//! 이미 잘려 나간 상태로 생성됩니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market_data::{ensure_strictly_increasing, Candle, SeriesColumn, SeriesRow, TimePoint};
use super::signal::{Signal, SignalKind};
use crate::error::{CoreError, CoreResult};
use crate::types::{Pair, Price};

/// 지표가 붙은 한 행.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub candle: Candle,
    pub sma: Option<Decimal>,
    pub ema: Option<Decimal>,
    /// 윈도우 내 최저가
    pub period_low: Option<Price>,
    /// 윈도우 내 최고가
    pub period_high: Option<Price>,
    /// %K. 윈도우가 평탄(최고가 == 최저가)하면 None
    pub k: Option<Decimal>,
    /// %D (%K의 단순 이동평균)
    pub d: Option<Decimal>,
    pub buy_signal: bool,
    pub sell_signal: bool,
}

impl IndicatorRow {
    /// 이동평균 오버레이만 있는 행에서 시작합니다.
    pub fn from_series_row(row: &SeriesRow) -> Self {
        Self {
            candle: row.candle,
            sma: row.sma,
            ema: row.ema,
            period_low: None,
            period_high: None,
            k: None,
            d: None,
            buy_signal: false,
            sell_signal: false,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.candle.timestamp
    }

    /// 이 행의 신호 (있다면).
    pub fn signal(&self) -> Option<Signal> {
        if self.buy_signal {
            Some(Signal::buy(self.candle.timestamp, self.candle.close))
        } else if self.sell_signal {
            Some(Signal::sell(self.candle.timestamp, self.candle.close))
        } else {
            None
        }
    }
}

/// `IndicatorSeries`에서 꺼낼 수 있는 컬럼.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorColumn {
    Price(SeriesColumn),
    PeriodLow,
    PeriodHigh,
    K,
    D,
}

impl IndicatorColumn {
    /// 스토캐스틱 파생 컬럼.
    pub const OSCILLATOR: [IndicatorColumn; 4] = [
        IndicatorColumn::PeriodLow,
        IndicatorColumn::PeriodHigh,
        IndicatorColumn::K,
        IndicatorColumn::D,
    ];

    pub fn value(&self, row: &IndicatorRow) -> Option<Decimal> {
        match self {
            IndicatorColumn::Price(column) => column.value(&SeriesRow {
                candle: row.candle,
                sma: row.sma,
                ema: row.ema,
            }),
            IndicatorColumn::PeriodLow => row.period_low,
            IndicatorColumn::PeriodHigh => row.period_high,
            IndicatorColumn::K => row.k,
            IndicatorColumn::D => row.d,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorColumn::Price(column) => column.name(),
            IndicatorColumn::PeriodLow => "period_low",
            IndicatorColumn::PeriodHigh => "period_high",
            IndicatorColumn::K => "%K",
            IndicatorColumn::D => "%D",
        }
    }
}

/// 지표 계산에 사용된 파라미터 기록.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    /// 실제 적용된 윈도우 (짧은 시계열이면 짧은 윈도우)
    pub window: usize,
    pub smoothing: usize,
    pub oversold: Decimal,
    pub overbought: Decimal,
}

/// 스토캐스틱 지표가 붙은 시계열.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pair: Pair,
    interval_minutes: u32,
    settings: IndicatorSettings,
    rows: Vec<IndicatorRow>,
}

impl IndicatorSeries {
    pub fn new(
        pair: Pair,
        interval_minutes: u32,
        settings: IndicatorSettings,
        rows: Vec<IndicatorRow>,
    ) -> CoreResult<Self> {
        ensure_strictly_increasing(rows.iter().map(|r| r.candle.timestamp))?;
        if let Some(row) = rows.iter().find(|r| r.buy_signal && r.sell_signal) {
            return Err(CoreError::InvalidInput(format!(
                "{}: 매수/매도 신호가 동시에 설정됨",
                row.candle.timestamp
            )));
        }
        Ok(Self {
            pair,
            interval_minutes,
            settings,
            rows,
        })
    }

    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 모든 신호를 시간 순서대로 반환합니다.
    pub fn signals(&self) -> Vec<Signal> {
        self.rows.iter().filter_map(IndicatorRow::signal).collect()
    }

    /// 첫 매수 신호가 있는 행 인덱스.
    pub fn first_buy_index(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.buy_signal)
    }

    /// 특정 방향 신호가 있는 행들의 종가를 차트 마커로 내보냅니다.
    pub fn signal_points(&self, kind: SignalKind) -> Vec<TimePoint> {
        self.signals()
            .into_iter()
            .filter(|s| s.kind == kind)
            .map(|s| TimePoint::new(s.timestamp, s.price))
            .collect()
    }

    pub fn column(&self, column: IndicatorColumn) -> Vec<TimePoint> {
        self.rows
            .iter()
            .filter_map(|row| column.value(row).map(|v| TimePoint::new(row.timestamp(), v)))
            .collect()
    }

    /// 마지막 `n`개 행만 남긴 새 시계열.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.rows.len().saturating_sub(n);
        Self {
            pair: self.pair.clone(),
            interval_minutes: self.interval_minutes,
            settings: self.settings,
            rows: self.rows[start..].to_vec(),
        }
    }
}
