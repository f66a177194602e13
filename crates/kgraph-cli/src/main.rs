//! Kraken 캔들 지표 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 기본값: XETHZUSD, 21600분, 스토캐스틱
//! kgraph show
//!
//! # 2시간 봉 (60분 봉을 받아 재집계), 캔들과 이동평균
//! kgraph show -p XXBTZUSD -i 120 --graph candles
//!
//! # 수익 곡선을 CSV로 저장
//! kgraph show --graph profit --format csv -o profit.csv
//!
//! # 거래 가능 페어 목록
//! kgraph pairs --search ETH
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;

use kgraph_cli::commands::output::{write_output, OutputFormat};
use kgraph_cli::commands::pairs::{list_pairs, PairsConfig};
use kgraph_cli::commands::show::{parse_time, show_series, GraphKind, ShowConfig};
use kgraph_core::logging::{init_logging, LogConfig};
use kgraph_core::{AppConfig, Pair};
use kgraph_data::SeriesLoader;
use kgraph_exchange::{KrakenClient, KrakenClientConfig};

#[derive(Parser)]
#[command(name = "kgraph")]
#[command(about = "Kraken OHLC 지표 시계열 - 이동평균, 스토캐스틱, 매매 신호, 수익 곡선", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (없으면 기본값과 환경 변수만 사용)
    #[arg(short, long, global = true, default_value = "config/kgraph.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 거래 가능 페어 목록
    Pairs {
        /// 캐시를 무시하고 다시 조회
        #[arg(long)]
        refresh: bool,

        /// 검색 키워드 (부분 일치)
        #[arg(short, long)]
        search: Option<String>,

        /// 출력 형식 (table, csv, json, points)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 지표 시계열 출력
    Show {
        /// 페어 (기본: display.pair)
        #[arg(short, long)]
        pair: Option<String>,

        /// 간격 (분, 기본: display.interval)
        #[arg(short, long)]
        interval: Option<u32>,

        /// 시작 시각 (포함, RFC 3339 / YYYY-MM-DD / Unix 초)
        #[arg(long)]
        since: Option<String>,

        /// 종료 시각 (제외)
        #[arg(long)]
        until: Option<String>,

        /// 그래프 (candles, stochastic, merged, profit)
        #[arg(short, long, default_value = "stochastic")]
        graph: String,

        /// 출력 형식 (table, csv, json, points)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 마지막 N개 행만 출력 (기본: display.tail, 0 = 전체)
        #[arg(short, long)]
        tail: Option<usize>,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration {}: {}", cli.config, e);
            return ExitCode::FAILURE;
        }
    };

    let log_config = LogConfig::from(&config.logging).with_env_overrides();
    if let Err(e) = init_logging(log_config) {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    let client = KrakenClient::new(KrakenClientConfig::from(&config.kraken))
        .context("Failed to create Kraken client")?;
    let loader = SeriesLoader::from_config(Arc::new(client), config)?;

    match command {
        Commands::Pairs {
            refresh,
            search,
            format,
            output,
        } => {
            let pairs_config = PairsConfig {
                refresh,
                search,
                format: OutputFormat::parse(&format)?,
            };
            let content = list_pairs(&loader, &pairs_config).await?;
            write_output(&content, output.as_deref())
        }

        Commands::Show {
            pair,
            interval,
            since,
            until,
            graph,
            format,
            tail,
            output,
        } => {
            let pair = match pair {
                Some(p) => Pair::new(&p)?,
                None => config.display.pair.clone(),
            };
            let show_config = ShowConfig {
                pair,
                interval: interval.unwrap_or(config.display.interval),
                since: since.as_deref().map(parse_time).transpose()?,
                until: until.as_deref().map(parse_time).transpose()?,
                graph: GraphKind::parse(&graph)?,
                format: OutputFormat::parse(&format)?,
                tail: tail.unwrap_or(config.display.tail),
            };
            let content = show_series(&loader, &show_config).await?;
            write_output(&content, output.as_deref())
        }
    }
}
