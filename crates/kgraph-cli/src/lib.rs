//! Kraken 캔들 지표 CLI.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 거래 가능 페어 목록 조회
//! - 캔들/이동평균, 스토캐스틱, 통합, 수익 시계열 출력 (table, csv, json)

pub mod commands;

pub use commands::*;
