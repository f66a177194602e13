//! # Kgraph Core
//!
//! Kraken 캔들 데이터 분석 도구의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - OHLCV 캔들 및 시계열 (`Series`)
//! - 지표 오버레이 (`IndicatorSeries`) 및 수익 곡선 (`ProfitSeries`)
//! - 네이티브 간격 집합과 약수 선택
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
