//! 데이터 소스 커넥터.

pub mod kraken;

pub use kraken::{KrakenClient, KrakenClientConfig};
