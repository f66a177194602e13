//! 기술적 지표 모듈.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균 (Simple Moving Average)
//! - **EMA**: 지수 이동평균 (Exponential Moving Average)
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **Stochastic**: 스토캐스틱 오실레이터 (%K, %D)
//!
//! 시계열 단위 계산(`IndicatorEngine::moving_averages`, `IndicatorEngine::stochastic_series`)은
//! 입력을 변경하지 않고 새 값을 반환합니다.
//!
//! # 사용 예시
//!
//! ```ignore
//! use kgraph_analytics::indicators::IndicatorEngine;
//!
//! let engine = IndicatorEngine::new();
//! let with_ma = engine.moving_averages(&series)?;
//! let overlay = engine.stochastic_series(&with_ma)?;
//! let profit = engine.simulate_profit(&overlay)?;
//! ```

pub mod momentum;
pub mod trend;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use kgraph_core::{
    IndicatorConfig, IndicatorRow, IndicatorSeries, IndicatorSettings, ProfitSeries, Series,
};

use crate::profit::ProfitSimulator;
use crate::signals::{CrossoverDetector, CrossoverParams};

pub use momentum::{MomentumCalculator, StochasticParams, StochasticResult};
pub use trend::{EmaParams, SmaParams, TrendIndicators};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 스토캐스틱 결과에서 잘라내는 선행 행 수.
///
/// 처음 `window - 1`개 행은 기간 최저/최고가가 정의되지 않습니다.
pub const fn stochastic_warmup(window: usize) -> usize {
    window.saturating_sub(1)
}

/// 짧은 시계열 윈도우 정책.
///
/// 행 수가 `short_series_threshold` 미만이면 `short_window`를 사용합니다.
/// 이동평균과 스토캐스틱이 같은 정책을 공유합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub window: usize,
    pub short_window: usize,
    pub short_series_threshold: usize,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            window: 14,
            short_window: 3,
            short_series_threshold: 60,
        }
    }
}

impl From<&IndicatorConfig> for WindowPolicy {
    fn from(config: &IndicatorConfig) -> Self {
        Self {
            window: config.window,
            short_window: config.short_window,
            short_series_threshold: config.short_series_threshold,
        }
    }
}

impl WindowPolicy {
    /// 행 수에 맞는 윈도우를 선택합니다.
    pub fn select(&self, rows: usize) -> usize {
        if rows >= self.short_series_threshold {
            self.window
        } else {
            self.short_window
        }
    }

    pub fn validate(&self) -> IndicatorResult<()> {
        if self.window == 0 || self.short_window == 0 {
            return Err(IndicatorError::InvalidParameter(format!(
                "윈도우는 0보다 커야 합니다: window {}, short_window {}",
                self.window, self.short_window
            )));
        }
        Ok(())
    }
}

/// 통합 지표 엔진.
///
/// 윈도우 정책, %D 평활 기간, 교차 임계값, 거래 단위를 보관하고
/// 모든 지표 계산을 위한 통합 인터페이스를 제공합니다.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    policy: WindowPolicy,
    smoothing: usize,
    crossover: CrossoverDetector,
    profit: ProfitSimulator,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            trend: TrendIndicators::new(),
            momentum: MomentumCalculator::new(),
            policy: WindowPolicy::default(),
            smoothing: 3,
            crossover: CrossoverDetector::default(),
            profit: ProfitSimulator::default(),
        }
    }
}

impl IndicatorEngine {
    /// 기본값(14/3/60, 평활 3, 20/80, lot 100)으로 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정에서 엔진을 생성합니다.
    pub fn from_config(config: &IndicatorConfig) -> IndicatorResult<Self> {
        Self::new()
            .with_window_policy(WindowPolicy::from(config))?
            .with_smoothing(config.smoothing)?
            .with_crossover(CrossoverParams {
                oversold: config.oversold,
                overbought: config.overbought,
            })?
            .with_lot_size(config.lot_size)
    }

    pub fn with_window_policy(mut self, policy: WindowPolicy) -> IndicatorResult<Self> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    pub fn with_smoothing(mut self, smoothing: usize) -> IndicatorResult<Self> {
        if smoothing == 0 {
            return Err(IndicatorError::InvalidParameter(
                "평활 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        self.smoothing = smoothing;
        Ok(self)
    }

    pub fn with_crossover(mut self, params: CrossoverParams) -> IndicatorResult<Self> {
        self.crossover = CrossoverDetector::new(params)?;
        Ok(self)
    }

    pub fn with_lot_size(mut self, lot_size: Decimal) -> IndicatorResult<Self> {
        self.profit = ProfitSimulator::new(lot_size)?;
        Ok(self)
    }

    /// 수익 시뮬레이션 거래 단위.
    pub fn lot_size(&self) -> Decimal {
        self.profit.lot_size()
    }

    // ==================== 추세 지표 ====================

    /// 종가 SMA/EMA를 붙인 새 시계열을 반환합니다.
    ///
    /// 윈도우는 시계열 행 수에 따라 정책으로 선택됩니다.
    pub fn moving_averages(&self, series: &Series) -> IndicatorResult<Series> {
        let window = self.policy.select(series.len());
        let closes = series.closes();

        let sma = self.trend.sma(&closes, SmaParams { period: window })?;
        let ema = self.trend.ema(&closes, EmaParams { period: window })?;

        debug!(pair = %series.pair(), rows = series.len(), window, "이동평균 계산");

        series
            .with_moving_averages(window, sma, ema)
            .map_err(|e| IndicatorError::CalculationError(e.to_string()))
    }

    // ==================== 모멘텀 지표 ====================

    /// 스토캐스틱 오버레이와 교차 신호가 붙은 시계열을 계산합니다.
    ///
    /// 신호는 잘라내기 전 전체 시계열에서 계산한 뒤,
    /// 처음 [`stochastic_warmup`]개 행을 제외합니다.
    pub fn stochastic_series(&self, series: &Series) -> IndicatorResult<IndicatorSeries> {
        let window = self.policy.select(series.len());
        let params = StochasticParams {
            k_period: window,
            d_period: self.smoothing,
        };

        let stoch = self.momentum.stochastic(
            &series.highs(),
            &series.lows(),
            &series.closes(),
            params,
        )?;
        let k: Vec<_> = stoch.iter().map(|s| s.k).collect();
        let d: Vec<_> = stoch.iter().map(|s| s.d).collect();
        let flags = self.crossover.detect(&k, &d);

        let warmup = stochastic_warmup(window);
        let rows: Vec<IndicatorRow> = series
            .rows()
            .iter()
            .zip(stoch.iter().zip(flags))
            .skip(warmup)
            .map(|(row, (s, flag))| IndicatorRow {
                period_low: s.period_low,
                period_high: s.period_high,
                k: s.k,
                d: s.d,
                buy_signal: flag.buy,
                sell_signal: flag.sell,
                ..IndicatorRow::from_series_row(row)
            })
            .collect();

        let crossover = self.crossover.params();
        let settings = IndicatorSettings {
            window,
            smoothing: self.smoothing,
            oversold: crossover.oversold,
            overbought: crossover.overbought,
        };

        debug!(
            pair = %series.pair(),
            window,
            warmup,
            rows = rows.len(),
            "스토캐스틱 계산"
        );

        IndicatorSeries::new(series.pair().clone(), series.interval_minutes(), settings, rows)
            .map_err(|e| IndicatorError::CalculationError(e.to_string()))
    }

    // ==================== 수익 시뮬레이션 ====================

    /// 신호 기반 수익 곡선. 매수 신호가 없으면 None.
    pub fn simulate_profit(&self, series: &IndicatorSeries) -> IndicatorResult<Option<ProfitSeries>> {
        self.profit.simulate(series)
    }
}
