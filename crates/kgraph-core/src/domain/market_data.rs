//! 캔들 및 시계열 타입.
//!
//! 이 모듈은 컴포넌트 사이에서 전달되는 기본 단위를 정의합니다:
//! - `Candle` - OHLCV 캔들 한 개
//! - `SeriesRow` - 캔들 + 이동평균 오버레이
//! - `Series` - 타임스탬프가 엄격히 증가하는 캔들 시계열
//! - `TimePoint` - 차트 렌더러에 넘기는 (시각, 값) 쌍

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Pair, Price, Quantity};

/// OHLCV 캔들 데이터.
///
/// 생성 후 변경되지 않습니다. 생성 시 `low ≤ open, close ≤ high` 관계와
/// 음수가 아닌 거래량을 검증합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시간
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량 (기준 자산 단위)
    pub volume: Quantity,
}

impl Candle {
    /// 새 캔들을 생성합니다.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidCandle {
            timestamp,
            reason: reason.to_string(),
        };

        if low > high {
            return Err(invalid("저가가 고가보다 큽니다"));
        }
        if open < low || open > high {
            return Err(invalid("시가가 고가/저가 범위를 벗어났습니다"));
        }
        if close < low || close > high {
            return Err(invalid("종가가 고가/저가 범위를 벗어났습니다"));
        }
        if volume < Decimal::ZERO {
            return Err(invalid("거래량이 음수입니다"));
        }

        Ok(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// 시계열의 한 행: 캔들과 이동평균 오버레이.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRow {
    /// 원본 캔들
    #[serde(flatten)]
    pub candle: Candle,
    /// 종가 단순 이동평균 (윈도우가 채워지기 전에는 None)
    pub sma: Option<Decimal>,
    /// 종가 지수 이동평균
    pub ema: Option<Decimal>,
}

impl From<Candle> for SeriesRow {
    fn from(candle: Candle) -> Self {
        Self {
            candle,
            sma: None,
            ema: None,
        }
    }
}

/// 차트로 내보내는 (시각, 값) 쌍.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePoint {
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

impl TimePoint {
    pub fn new(timestamp: DateTime<Utc>, value: Decimal) -> Self {
        Self { timestamp, value }
    }
}

/// `Series`에서 꺼낼 수 있는 컬럼.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
    Sma,
    Ema,
}

impl SeriesColumn {
    /// 캔들과 이동평균 전체 컬럼 (출력 순서).
    pub const ALL: [SeriesColumn; 7] = [
        SeriesColumn::Open,
        SeriesColumn::High,
        SeriesColumn::Low,
        SeriesColumn::Close,
        SeriesColumn::Volume,
        SeriesColumn::Sma,
        SeriesColumn::Ema,
    ];

    /// 행에서 컬럼 값을 읽습니다. 정의되지 않은 값은 None.
    pub fn value(&self, row: &SeriesRow) -> Option<Decimal> {
        match self {
            SeriesColumn::Open => Some(row.candle.open),
            SeriesColumn::High => Some(row.candle.high),
            SeriesColumn::Low => Some(row.candle.low),
            SeriesColumn::Close => Some(row.candle.close),
            SeriesColumn::Volume => Some(row.candle.volume),
            SeriesColumn::Sma => row.sma,
            SeriesColumn::Ema => row.ema,
        }
    }

    /// 컬럼 이름.
    pub fn name(&self) -> &'static str {
        match self {
            SeriesColumn::Open => "open",
            SeriesColumn::High => "high",
            SeriesColumn::Low => "low",
            SeriesColumn::Close => "close",
            SeriesColumn::Volume => "volume",
            SeriesColumn::Sma => "sma",
            SeriesColumn::Ema => "ema",
        }
    }
}

/// 타임스탬프가 엄격히 증가하는 캔들 시계열.
///
/// 모든 변환은 새 값을 반환하며 기존 `Series`를 수정하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pair: Pair,
    interval_minutes: u32,
    /// 이동평균 계산에 사용된 윈도우 (아직 붙이지 않았으면 None)
    ma_window: Option<usize>,
    rows: Vec<SeriesRow>,
}

impl Series {
    /// 캔들 목록으로 시계열을 생성합니다.
    pub fn new(pair: Pair, interval_minutes: u32, candles: Vec<Candle>) -> CoreResult<Self> {
        Self::from_rows(
            pair,
            interval_minutes,
            None,
            candles.into_iter().map(SeriesRow::from).collect(),
        )
    }

    /// 오버레이가 포함된 행 목록으로 시계열을 생성합니다.
    pub fn from_rows(
        pair: Pair,
        interval_minutes: u32,
        ma_window: Option<usize>,
        rows: Vec<SeriesRow>,
    ) -> CoreResult<Self> {
        if interval_minutes == 0 {
            return Err(CoreError::InvalidInput(
                "간격은 0보다 커야 합니다".to_string(),
            ));
        }
        ensure_strictly_increasing(rows.iter().map(|r| r.candle.timestamp))?;
        Ok(Self {
            pair,
            interval_minutes,
            ma_window,
            rows,
        })
    }

    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    /// 캔들 간격 (분).
    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn ma_window(&self) -> Option<usize> {
        self.ma_window
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn candles(&self) -> impl Iterator<Item = &Candle> + '_ {
        self.rows.iter().map(|r| &r.candle)
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.rows.first().map(|r| r.candle.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.rows.last().map(|r| r.candle.timestamp)
    }

    /// 종가 벡터.
    pub fn closes(&self) -> Vec<Price> {
        self.candles().map(|c| c.close).collect()
    }

    /// 고가 벡터.
    pub fn highs(&self) -> Vec<Price> {
        self.candles().map(|c| c.high).collect()
    }

    /// 저가 벡터.
    pub fn lows(&self) -> Vec<Price> {
        self.candles().map(|c| c.low).collect()
    }

    /// 이동평균 컬럼을 붙인 새 시계열을 반환합니다.
    pub fn with_moving_averages(
        &self,
        window: usize,
        sma: Vec<Option<Decimal>>,
        ema: Vec<Option<Decimal>>,
    ) -> CoreResult<Self> {
        for column in [&sma, &ema] {
            if column.len() != self.rows.len() {
                return Err(CoreError::LengthMismatch {
                    expected: self.rows.len(),
                    actual: column.len(),
                });
            }
        }

        let rows = self
            .rows
            .iter()
            .zip(sma.into_iter().zip(ema))
            .map(|(row, (sma, ema))| SeriesRow {
                candle: row.candle,
                sma,
                ema,
            })
            .collect();

        Ok(Self {
            pair: self.pair.clone(),
            interval_minutes: self.interval_minutes,
            ma_window: Some(window),
            rows,
        })
    }

    /// `since ≤ t < until` 범위의 행만 남긴 새 시계열을 반환합니다.
    pub fn slice(&self, since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|r| since.map_or(true, |s| r.candle.timestamp >= s))
            .filter(|r| until.map_or(true, |u| r.candle.timestamp < u))
            .copied()
            .collect();

        Self {
            pair: self.pair.clone(),
            interval_minutes: self.interval_minutes,
            ma_window: self.ma_window,
            rows,
        }
    }

    /// 마지막 `n`개 행만 남긴 새 시계열을 반환합니다.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.rows.len().saturating_sub(n);
        Self {
            pair: self.pair.clone(),
            interval_minutes: self.interval_minutes,
            ma_window: self.ma_window,
            rows: self.rows[start..].to_vec(),
        }
    }

    /// 컬럼을 차트용 (시각, 값) 목록으로 내보냅니다. 정의되지 않은 행은 건너뜁니다.
    pub fn column(&self, column: SeriesColumn) -> Vec<TimePoint> {
        self.rows
            .iter()
            .filter_map(|row| {
                column
                    .value(row)
                    .map(|v| TimePoint::new(row.candle.timestamp, v))
            })
            .collect()
    }
}

/// 타임스탬프가 엄격히 증가하는지 검사합니다.
pub(crate) fn ensure_strictly_increasing(
    timestamps: impl IntoIterator<Item = DateTime<Utc>>,
) -> CoreResult<()> {
    let mut previous: Option<DateTime<Utc>> = None;
    for (index, current) in timestamps.into_iter().enumerate() {
        if let Some(prev) = previous {
            if current <= prev {
                return Err(CoreError::OutOfOrder {
                    index,
                    previous: prev,
                    current,
                });
            }
        }
        previous = Some(current);
    }
    Ok(())
}
