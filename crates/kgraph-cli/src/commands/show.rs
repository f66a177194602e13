//! 시계열 출력 명령어.
//!
//! 외부 차트 도구가 그릴 수 있도록 숫자 시계열만 출력합니다.
//!
//! | graph        | 내용                                   |
//! |--------------|----------------------------------------|
//! | `candles`    | OHLCV와 SMA/EMA                        |
//! | `stochastic` | 기간 최저/최고가, %K, %D, 신호          |
//! | `merged`     | 캔들, 이동평균, 스토캐스틱, 신호 전체    |
//! | `profit`     | 첫 매수부터의 보유 수량과 누적 수익      |

use std::fmt;

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use kgraph_analytics::IndicatorEngine;
use kgraph_core::{
    IndicatorColumn, IndicatorRow, IndicatorSeries, Pair, ProfitColumn, Series, SeriesColumn,
    SignalKind, TimePoint,
};
use kgraph_data::{LoadError, SeriesLoader};

use super::output::{num, render, render_points, OutputFormat, Table};

/// 출력할 그래프 종류.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GraphKind {
    /// 캔들과 이동평균
    Candles,
    /// 스토캐스틱 오실레이터
    #[default]
    Stochastic,
    /// 캔들 + 스토캐스틱
    Merged,
    /// 수익 곡선
    Profit,
}

impl GraphKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "candles" | "ma" | "mobilemean" => Ok(Self::Candles),
            "stochastic" => Ok(Self::Stochastic),
            "merged" | "merge" => Ok(Self::Merged),
            "profit" => Ok(Self::Profit),
            _ => Err(anyhow!(
                "Invalid graph: {}. Use: candles, stochastic, merged, profit",
                s
            )),
        }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Candles => "candles",
            Self::Stochastic => "stochastic",
            Self::Merged => "merged",
            Self::Profit => "profit",
        };
        write!(f, "{}", name)
    }
}

/// show 명령어 설정.
#[derive(Debug, Clone)]
pub struct ShowConfig {
    pub pair: Pair,
    /// 요청 간격 (분)
    pub interval: u32,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub graph: GraphKind,
    pub format: OutputFormat,
    /// 출력할 마지막 행 수 (0 = 전체)
    pub tail: usize,
}

/// 시계열을 로드하고 선택한 그래프의 출력 문자열을 만듭니다.
///
/// 데이터를 받지 못했고 페어가 거래 가능 목록에도 없으면 그 사실을 에러에 덧붙입니다.
pub async fn show_series(loader: &SeriesLoader, config: &ShowConfig) -> Result<String> {
    let ticket = loader.gate().issue();
    let loaded = loader
        .load_latest(ticket, &config.pair, config.interval, config.since, config.until)
        .await;

    let series = match loaded {
        Ok(Some(series)) => series,
        Ok(None) => return Err(anyhow!("Request for {} was superseded", config.pair)),
        Err(e @ LoadError::DataUnavailable { .. }) => {
            // 목록 조회 실패는 원래 에러를 가리지 않음
            if let Ok(false) = loader.catalog().contains(&config.pair).await {
                return Err(anyhow::Error::new(e).context(format!(
                    "{} is not a tradable pair (see `kgraph pairs`)",
                    config.pair
                )));
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        pair = %config.pair,
        interval = config.interval,
        graph = %config.graph,
        rows = series.len(),
        lot_size = %loader.engine().lot_size(),
        "시계열 출력"
    );

    render_graph(loader.engine(), &series, config)
}

/// 로드된 시계열에서 그래프 출력을 만듭니다.
///
/// 지표는 전체 시계열로 계산한 뒤 마지막 `tail`개 행만 출력합니다.
pub fn render_graph(engine: &IndicatorEngine, series: &Series, config: &ShowConfig) -> Result<String> {
    let limit = row_limit(config.tail);
    match config.graph {
        GraphKind::Candles => render_candles(&series.tail(limit), config.format),
        GraphKind::Stochastic | GraphKind::Merged => {
            let overlay = engine.stochastic_series(series)?.tail(limit);
            let merged = config.graph == GraphKind::Merged;
            render_oscillator(&overlay, merged, config.format)
        }
        GraphKind::Profit => render_profit(engine, &engine.stochastic_series(series)?, config),
    }
}

/// `tail` 설정을 행 수 제한으로 바꿉니다 (0 = 전체).
fn row_limit(tail: usize) -> usize {
    if tail == 0 {
        usize::MAX
    } else {
        tail
    }
}

fn render_candles(series: &Series, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Points {
        return render_points(
            SeriesColumn::ALL
                .iter()
                .map(|&c| (c.name(), series.column(c)))
                .collect(),
        );
    }

    let mut table = Table::new(vec![
        "timestamp", "open", "high", "low", "close", "volume", "sma", "ema",
    ]);
    for row in series.rows() {
        let c = &row.candle;
        table.push(vec![
            c.timestamp.to_rfc3339(),
            num(Some(c.open)),
            num(Some(c.high)),
            num(Some(c.low)),
            num(Some(c.close)),
            num(Some(c.volume)),
            num(row.sma),
            num(row.ema),
        ]);
    }
    render(&table, series.rows(), format)
}

/// 스토캐스틱 출력. `merged`이면 캔들과 이동평균 컬럼을 함께 출력합니다.
fn render_oscillator(overlay: &IndicatorSeries, merged: bool, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Points {
        let price_columns: &[SeriesColumn] = if merged {
            &SeriesColumn::ALL
        } else {
            &[SeriesColumn::Close]
        };
        let mut columns: Vec<(&str, Vec<TimePoint>)> = price_columns
            .iter()
            .map(|&c| IndicatorColumn::Price(c))
            .chain(IndicatorColumn::OSCILLATOR)
            .map(|c| (c.name(), overlay.column(c)))
            .collect();
        columns.push(("buy", overlay.signal_points(SignalKind::Buy)));
        columns.push(("sell", overlay.signal_points(SignalKind::Sell)));
        return render_points(columns);
    }

    let mut headers = vec!["timestamp"];
    if merged {
        headers.extend(["open", "high", "low", "close", "volume", "sma", "ema"]);
    } else {
        headers.extend(["close", "period_low", "period_high"]);
    }
    headers.extend(["k", "d", "signal"]);

    let mut table = Table::new(headers);
    for row in overlay.rows() {
        let c = &row.candle;
        let mut cells = vec![c.timestamp.to_rfc3339()];
        if merged {
            cells.extend([
                num(Some(c.open)),
                num(Some(c.high)),
                num(Some(c.low)),
                num(Some(c.close)),
                num(Some(c.volume)),
                num(row.sma),
                num(row.ema),
            ]);
        } else {
            cells.extend([num(Some(c.close)), num(row.period_low), num(row.period_high)]);
        }
        cells.extend([num(row.k), num(row.d), signal_cell(row)]);
        table.push(cells);
    }
    render(&table, overlay.rows(), format)
}

fn render_profit(
    engine: &IndicatorEngine,
    overlay: &IndicatorSeries,
    config: &ShowConfig,
) -> Result<String> {
    let Some(profit) = engine.simulate_profit(overlay)? else {
        info!(pair = %overlay.pair(), "매수 신호 없음");
        // 구조화된 형식은 파싱 가능한 빈 결과를 유지
        return Ok(match config.format {
            OutputFormat::Table => {
                format!("No buy signal for {}: profit curve is empty", overlay.pair())
            }
            OutputFormat::Csv => profit_table().to_csv(),
            OutputFormat::Json => "[]".to_string(),
            OutputFormat::Points => "{}".to_string(),
        });
    };

    let profit = profit.tail(row_limit(config.tail));
    if config.format == OutputFormat::Points {
        let mut columns: Vec<(&str, Vec<TimePoint>)> = ProfitColumn::ALL
            .iter()
            .map(|&c| (c.name(), profit.column(c)))
            .collect();
        columns.push(("buy", profit.trade_points(SignalKind::Buy)));
        columns.push(("sell", profit.trade_points(SignalKind::Sell)));
        return render_points(columns);
    }

    let mut table = profit_table();
    for row in profit.rows() {
        table.push(vec![
            row.timestamp.to_rfc3339(),
            num(Some(row.close)),
            row.executed.map(|k| k.to_string()).unwrap_or_default(),
            num(Some(row.position_size)),
            num(Some(row.cash_flow)),
            num(Some(row.cumulative_profit)),
        ]);
    }
    render(&table, profit.rows(), config.format)
}

fn profit_table() -> Table {
    Table::new(vec![
        "timestamp",
        "close",
        "executed",
        "position_size",
        "cash_flow",
        "cumulative_profit",
    ])
}

fn signal_cell(row: &IndicatorRow) -> String {
    row.signal().map(|s| s.kind.to_string()).unwrap_or_default()
}

/// 시각 인자 파싱: RFC 3339, `YYYY-MM-DD` (UTC 자정), 또는 Unix 초.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    if let Some(dt) = s.parse::<i64>().ok().and_then(|secs| DateTime::from_timestamp(secs, 0)) {
        return Ok(dt);
    }
    Err(anyhow!(
        "Invalid time: {}. Use RFC 3339, YYYY-MM-DD or Unix seconds",
        s
    ))
}
