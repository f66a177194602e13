//! 출력 형식과 표 렌더링.

use std::fs::File;
use std::io::Write;

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use kgraph_core::TimePoint;

/// 표시용 소수점 자릿수.
const DISPLAY_DP: u32 = 8;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    /// 행 단위 JSON 배열
    Json,
    /// 컬럼 이름 → (시각, 값) 목록 JSON 객체 (차트 도구 입력용)
    Points,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "points" => Ok(Self::Points),
            _ => Err(anyhow!(
                "Invalid format: {}. Use: table, csv, json, points",
                s
            )),
        }
    }
}

/// 헤더와 문자열 셀로 이루어진 표.
///
/// 빈 셀은 정의되지 않은 값이며 table 형식에서는 `-`로 표시됩니다.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// 테이블 형식 출력.
    pub fn to_table(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.len().max(1))
                    .max()
                    .unwrap_or(0)
                    .max(h.len())
            })
            .collect();

        let mut output = String::new();

        // 헤더
        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:<w$}", h.to_uppercase(), w = w))
            .collect();
        output.push_str(header.join("  ").trim_end());
        output.push('\n');
        output.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
        output.push('\n');

        // 데이터
        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| {
                    let cell = if c.is_empty() { "-" } else { c.as_str() };
                    format!("{:<w$}", cell, w = w)
                })
                .collect();
            output.push_str(cells.join("  ").trim_end());
            output.push('\n');
        }

        output.push('\n');
        output.push_str(&format!("Total: {} rows", self.rows.len()));
        output
    }

    /// CSV 형식 출력.
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(&self.headers.join(","));
        output.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| escape_csv(c)).collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }
        output
    }
}

/// 형식에 맞게 렌더링합니다. JSON은 원본 레코드를 직렬화합니다.
///
/// `points`는 시계열에만 의미가 있으므로 [`render_points`]를 사용해야 합니다.
pub fn render<T: Serialize>(table: &Table, records: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(table.to_table()),
        OutputFormat::Csv => Ok(table.to_csv()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(records).context("Failed to serialize to JSON")
        }
        OutputFormat::Points => Err(anyhow!("points format is only available for time series")),
    }
}

/// 컬럼별 (시각, 값) 목록을 하나의 JSON 객체로 렌더링합니다.
///
/// 정의되지 않은 값은 목록에서 빠지므로 컬럼마다 길이가 다를 수 있습니다.
pub fn render_points(columns: Vec<(&str, Vec<TimePoint>)>) -> Result<String> {
    let mut object = Map::new();
    for (name, points) in columns {
        let points = serde_json::to_value(points).context("Failed to serialize points")?;
        object.insert(name.to_string(), points);
    }
    serde_json::to_string_pretty(&Value::Object(object)).context("Failed to serialize to JSON")
}

/// 파일 또는 stdout에 출력.
pub fn write_output(content: &str, output_path: Option<&str>) -> Result<()> {
    if let Some(path) = output_path {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path))?;
        file.write_all(content.as_bytes())
            .context("Failed to write to file")?;
        info!("Output written to: {}", path);
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// 숫자 셀. 정의되지 않은 값은 빈 문자열.
pub fn num(value: Option<Decimal>) -> String {
    value
        .map(|v| v.round_dp(DISPLAY_DP).normalize().to_string())
        .unwrap_or_default()
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
