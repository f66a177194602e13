//! 지표 계산 및 수익 시뮬레이션 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 이동평균 (SMA, EMA)
//! - 스토캐스틱 오실레이터 (%K, %D)
//! - %K/%D 교차 매수/매도 신호
//! - 신호 기반 고정 lot 수익 시뮬레이션
//!
//! 모든 계산은 입력 시계열을 변경하지 않고 새 값을 반환합니다.

pub mod indicators;
pub mod profit;
pub mod signals;

// Indicators 모듈 re-exports
pub use indicators::{
    stochastic_warmup, EmaParams, IndicatorEngine, IndicatorError, IndicatorResult,
    MomentumCalculator, SmaParams, StochasticParams, StochasticResult, TrendIndicators,
    WindowPolicy,
};

pub use profit::{ProfitSimulator, DEFAULT_LOT_SIZE};
pub use signals::{CrossoverDetector, CrossoverFlags, CrossoverParams};
