//! 거래 가능 페어 목록 명령어.

use anyhow::Result;

use kgraph_data::SeriesLoader;

use super::output::{render, OutputFormat, Table};

/// 페어 목록 조회 설정.
#[derive(Debug, Clone)]
pub struct PairsConfig {
    /// 캐시를 무시하고 다시 조회
    pub refresh: bool,
    /// 부분 일치 검색어 (대소문자 무시)
    pub search: Option<String>,
    pub format: OutputFormat,
}

/// 페어 목록을 조회해 출력 문자열로 만듭니다.
pub async fn list_pairs(loader: &SeriesLoader, config: &PairsConfig) -> Result<String> {
    let pairs = if config.refresh {
        loader.catalog().refresh().await?
    } else {
        loader.catalog().pairs().await?
    };

    let needle = config.search.as_deref().map(str::to_uppercase);
    let matched: Vec<&String> = pairs
        .iter()
        .filter(|p| needle.as_deref().map_or(true, |n| p.to_uppercase().contains(n)))
        .collect();

    let mut table = Table::new(vec!["pair"]);
    for pair in &matched {
        table.push(vec![pair.to_string()]);
    }

    render(&table, &matched, config.format)
}
