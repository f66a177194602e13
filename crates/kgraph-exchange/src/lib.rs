//! 시장 데이터 소스 연결.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `OhlcSource` trait: 캔들 데이터 소스에 대한 읽기 전용 인터페이스
//! - Kraken 공개 REST 커넥터
//! - 거래소 에러 분류

pub mod connector;
pub mod error;
pub mod traits;

pub use connector::{KrakenClient, KrakenClientConfig};
pub use error::*;
pub use traits::*;
