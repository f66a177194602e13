//! 분석용 시계열 로더.
//!
//! # 동작 흐름
//!
//! ```text
//! 요청 (pair, interval, since, until)
//!         │
//! ┌───────▼────────────┐
//! │ 1. 간격 계획        │ ← 나누어떨어지는 가장 큰 네이티브 간격
//! └───────┬────────────┘
//! ┌───────▼────────────┐
//! │ 2. 데이터 소스 조회 │ ← 실패/빈 결과 → DataUnavailable
//! └───────┬────────────┘
//! ┌───────▼────────────┐
//! │ 3. 정규화           │ ← 숫자 변환, vwap/count 제거, 정렬/중복 제거
//! └───────┬────────────┘
//! ┌───────▼────────────┐
//! │ 4. since/until 슬라이스 │
//! └───────┬────────────┘
//! ┌───────▼────────────┐
//! │ 5. 이동평균 부착    │ ← 짧은 시계열 윈도우 정책
//! └───────┬────────────┘
//! ┌───────▼────────────┐
//! │ 6. 재집계 (필요 시) │
//! └────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info, warn, Instrument};

use kgraph_analytics::IndicatorEngine;
use kgraph_core::{
    parse_decimal, series_span, AppConfig, Candle, IntervalPlan, NativeIntervals, Pair, Series,
};
use kgraph_exchange::{OhlcSource, RawOhlcRow};

use crate::error::{LoadError, LoadResult};
use crate::gate::{LoadTicket, RequestGate};
use crate::pairs::PairCatalog;
use crate::resample::resample;

/// 데이터 소스에서 캔들을 가져와 분석 가능한 `Series`로 만드는 로더.
///
/// 호출 간에 시계열을 보관하지 않으며, 요청마다 새로 계산합니다.
pub struct SeriesLoader {
    source: Arc<dyn OhlcSource>,
    intervals: NativeIntervals,
    engine: IndicatorEngine,
    catalog: PairCatalog,
    gate: RequestGate,
}

impl SeriesLoader {
    /// 기본 네이티브 간격과 기본 지표 설정으로 로더를 생성합니다.
    pub fn new(source: Arc<dyn OhlcSource>) -> Self {
        Self {
            catalog: PairCatalog::new(Arc::clone(&source)),
            source,
            intervals: NativeIntervals::default(),
            engine: IndicatorEngine::new(),
            gate: RequestGate::new(),
        }
    }

    /// 설정에서 로더를 생성합니다.
    pub fn from_config(source: Arc<dyn OhlcSource>, config: &AppConfig) -> LoadResult<Self> {
        let engine = IndicatorEngine::from_config(&config.indicators)?;
        Ok(Self::new(source)
            .with_native_intervals(config.intervals.native.clone())
            .with_engine(engine))
    }

    pub fn with_native_intervals(mut self, intervals: NativeIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn with_engine(mut self, engine: IndicatorEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }

    /// 거래 가능 페어 목록.
    pub fn catalog(&self) -> &PairCatalog {
        &self.catalog
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// 요청 간격의 시계열을 로드합니다.
    ///
    /// 구간은 `since ≤ t < until`입니다. 필터링 결과가 비어 있으면 빈 `Series`를 반환합니다.
    pub async fn load(
        &self,
        pair: &Pair,
        interval: u32,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> LoadResult<Series> {
        let span = series_span!("load_series", pair, interval);
        self.load_inner(pair, interval, since, until)
            .instrument(span)
            .await
    }

    /// 티켓이 최신일 때만 결과를 반환합니다.
    ///
    /// 로드 도중 새 티켓이 발급되었다면 `Ok(None)`입니다.
    pub async fn load_latest(
        &self,
        ticket: LoadTicket,
        pair: &Pair,
        interval: u32,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> LoadResult<Option<Series>> {
        let series = self.load(pair, interval, since, until).await?;
        Ok(self.gate.accept(ticket, series))
    }

    async fn load_inner(
        &self,
        pair: &Pair,
        interval: u32,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> LoadResult<Series> {
        let plan = self.plan(interval, since, until)?;
        let native = plan.fetch_interval();

        let raw = match self.source.fetch_ohlc(pair, native, since).await {
            Ok(batch) => batch.rows,
            Err(e) => {
                error!(
                    source = self.source.name(),
                    native,
                    retryable = e.is_retryable(),
                    error = %e,
                    "OHLC 조회 실패"
                );
                return Err(LoadError::unavailable(pair, e));
            }
        };
        if raw.is_empty() {
            warn!(source = self.source.name(), native, "OHLC 결과가 비어 있음");
            return Err(LoadError::unavailable(pair, "empty result"));
        }

        let candles = normalize(&raw)?;
        let fetched = candles.len();
        let series = Series::new(pair.clone(), native, candles)?.slice(since, until);
        let series = self.engine.moving_averages(&series)?;

        let series = match plan {
            IntervalPlan::Direct { .. } => series,
            IntervalPlan::Resample { factor, .. } => {
                debug!(native, factor, "재집계");
                resample(&series, interval)?
            }
        };

        info!(
            native,
            fetched,
            rows = series.len(),
            ma_window = ?series.ma_window(),
            first = ?series.first_timestamp(),
            last = ?series.last_timestamp(),
            "시계열 로드 완료"
        );

        Ok(series)
    }

    fn plan(
        &self,
        interval: u32,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> LoadResult<IntervalPlan> {
        if interval == 0 {
            return Err(LoadError::InvalidRequest(
                "interval must be positive".to_string(),
            ));
        }
        if let (Some(since), Some(until)) = (since, until) {
            if since > until {
                return Err(LoadError::InvalidRequest(format!(
                    "since ({}) is after until ({})",
                    since, until
                )));
            }
        }
        self.intervals.plan(interval).ok_or_else(|| {
            warn!(interval, native = ?self.intervals.as_slice(), "나누어떨어지는 네이티브 간격 없음");
            LoadError::UnsupportedInterval { interval }
        })
    }
}

/// 원시 튜플을 시간순으로 정렬된 캔들로 변환합니다.
///
/// 같은 타임스탬프가 여러 번 나오면 나중 행을 사용합니다.
fn normalize(raw: &[RawOhlcRow]) -> LoadResult<Vec<Candle>> {
    let mut candles = raw
        .iter()
        .enumerate()
        .map(|(row, r)| parse_row(row, r))
        .collect::<LoadResult<Vec<_>>>()?;

    candles.sort_by_key(|c| c.timestamp);
    let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        match deduped.last_mut() {
            Some(last) if last.timestamp == candle.timestamp => *last = candle,
            _ => deduped.push(candle),
        }
    }

    if deduped.len() < raw.len() {
        debug!(dropped = raw.len() - deduped.len(), "중복 타임스탬프 제거");
    }
    Ok(deduped)
}

fn parse_row(row: usize, raw: &RawOhlcRow) -> LoadResult<Candle> {
    let timestamp = parse_timestamp(row, raw.field("timestamp"))?;
    let open = parse_number(row, raw, "open")?;
    let high = parse_number(row, raw, "high")?;
    let low = parse_number(row, raw, "low")?;
    let close = parse_number(row, raw, "close")?;
    let volume = parse_number(row, raw, "volume")?;

    Candle::new(timestamp, open, high, low, close, volume)
        .map_err(|e| LoadError::format("ohlc", row, e))
}

fn parse_timestamp(row: usize, value: Option<&Value>) -> LoadResult<DateTime<Utc>> {
    let seconds = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    seconds
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .ok_or_else(|| LoadError::format("timestamp", row, display_value(value)))
}

fn parse_number(row: usize, raw: &RawOhlcRow, field: &str) -> LoadResult<rust_decimal::Decimal> {
    let value = raw.field(field);
    let parsed = match value {
        Some(Value::String(s)) => parse_decimal(s).ok(),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()).ok(),
        _ => None,
    };
    parsed.ok_or_else(|| LoadError::format(field, row, display_value(value)))
}

fn display_value(value: Option<&Value>) -> String {
    value.map_or_else(|| "<missing>".to_string(), Value::to_string)
}
