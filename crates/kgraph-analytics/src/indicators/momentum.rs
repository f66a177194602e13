//! 모멘텀 지표 (Momentum Indicators).
//!
//! 스토캐스틱 오실레이터(%K, %D)와 계산에 사용된 기간 최저/최고가를 제공합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// 스토캐스틱 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticParams {
    /// %K 기간 (기본: 14).
    pub k_period: usize,
    /// %D 기간 (smoothing, 기본: 3).
    pub d_period: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

/// 스토캐스틱 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StochasticResult {
    /// k_period 동안의 최저 저가.
    pub period_low: Option<Decimal>,
    /// k_period 동안의 최고 고가.
    pub period_high: Option<Decimal>,
    /// %K (Fast Stochastic). 범위가 0이면 None.
    pub k: Option<Decimal>,
    /// %D (Slow Stochastic, %K의 이동평균).
    pub d: Option<Decimal>,
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 스토캐스틱 오실레이터 계산.
    ///
    /// %K = (종가 - 최저가) / (최고가 - 최저가) × 100
    /// %D = %K의 d_period 단순 이동평균
    ///
    /// 최고가와 최저가가 같으면 %K는 정의되지 않습니다 (None).
    /// %D는 평균 구간의 %K가 모두 정의된 경우에만 계산됩니다.
    ///
    /// # 인자
    /// * `high` - 고가 데이터
    /// * `low` - 저가 데이터
    /// * `close` - 종가 데이터
    /// * `params` - %K, %D 기간
    pub fn stochastic(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: StochasticParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        if params.k_period == 0 || params.d_period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "스토캐스틱 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let len = close.len();
        if high.len() != len || low.len() != len {
            return Err(IndicatorError::InvalidParameter(format!(
                "입력 길이가 다릅니다: high {}, low {}, close {}",
                high.len(),
                low.len(),
                len
            )));
        }

        let period_high: Vec<Option<Decimal>> =
            rolling(high, params.k_period, |w| w.iter().max().copied())
                .into_iter()
                .map(Option::flatten)
                .collect();
        let period_low: Vec<Option<Decimal>> =
            rolling(low, params.k_period, |w| w.iter().min().copied())
                .into_iter()
                .map(Option::flatten)
                .collect();

        // %K 계산
        let k_values: Vec<Option<Decimal>> = (0..len)
            .map(|i| match (period_low[i], period_high[i]) {
                (Some(lowest), Some(highest)) if highest > lowest => {
                    Some((close[i] - lowest) / (highest - lowest) * dec!(100))
                }
                _ => None,
            })
            .collect();

        // %D 계산 (%K의 이동평균)
        let d_values = rolling(&k_values, params.d_period, |w| {
            let defined: Option<Vec<Decimal>> = w.iter().copied().collect();
            defined.map(|values| {
                values.iter().sum::<Decimal>() / Decimal::from(values.len())
            })
        });

        let result = (0..len)
            .map(|i| StochasticResult {
                period_low: period_low[i],
                period_high: period_high[i],
                k: k_values[i],
                d: d_values[i].flatten(),
            })
            .collect();

        Ok(result)
    }
}

/// 길이 `period`의 후행 윈도우마다 `f`를 적용합니다. 처음 period-1개는 None.
fn rolling<T, R>(values: &[T], period: usize, f: impl Fn(&[T]) -> R) -> Vec<Option<R>> {
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                Some(f(&values[i + 1 - period..=i]))
            }
        })
        .collect()
}
