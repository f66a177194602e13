//! 추세 지표 (Trend Indicators).
//!
//! 종가 기반의 이동평균을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use kgraph_core::checked_sum;

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간 (span).
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 추세 지표 계산기.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// 데이터가 기간보다 짧으면 모든 값이 None입니다.
    ///
    /// # 반환
    /// 각 시점의 SMA 값 (처음 period-1개는 None)
    pub fn sma(
        &self,
        prices: &[Decimal],
        params: SmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let period_decimal = Decimal::from(period);
        (0..prices.len())
            .map(|i| {
                if i + 1 < period {
                    return Ok(None);
                }
                let sum = checked_sum(&prices[i + 1 - period..=i])
                    .map_err(|e| IndicatorError::CalculationError(format!("SMA 행 {}: {}", i, e)))?;
                Ok(Some(sum / period_decimal))
            })
            .collect()
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = α × 현재가 + (1 - α) × 이전 EMA, α = 2 / (period + 1)
    ///
    /// 첫 번째 종가로 시작하므로 모든 시점에서 값이 정의됩니다.
    pub fn ema(
        &self,
        prices: &[Decimal],
        params: EmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let alpha = dec!(2) / Decimal::from(period + 1);
        let mut result = Vec::with_capacity(prices.len());
        let mut prev: Option<Decimal> = None;

        for (i, &price) in prices.iter().enumerate() {
            let value = match prev {
                None => price,
                Some(prev_ema) => alpha
                    .checked_mul(price)
                    .zip((Decimal::ONE - alpha).checked_mul(prev_ema))
                    .and_then(|(current, carried)| current.checked_add(carried))
                    .ok_or_else(|| {
                        IndicatorError::CalculationError(format!("EMA 행 {}: 범위 초과", i))
                    })?,
            };
            prev = Some(value);
            result.push(Some(value));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prices() -> Vec<Decimal> {
        vec![
            dec!(100.0),
            dec!(102.0),
            dec!(101.0),
            dec!(103.0),
            dec!(105.0),
            dec!(104.0),
        ]
    }

    #[test]
    fn test_sma_basic() {
        let trend = TrendIndicators::new();
        let sma = trend.sma(&sample_prices(), SmaParams { period: 3 }).unwrap();

        assert!(sma[0].is_none());
        assert!(sma[1].is_none());
        // (100 + 102 + 101) / 3 = 101
        assert_eq!(sma[2], Some(dec!(101)));
        // (101 + 103 + 105) / 3 = 103
        assert_eq!(sma[4], Some(dec!(103)));
    }

    #[test]
    fn test_sma_shorter_than_period() {
        let trend = TrendIndicators::new();
        let sma = trend.sma(&[dec!(1), dec!(2)], SmaParams { period: 3 }).unwrap();
        assert_eq!(sma, vec![None, None]);
    }

    #[test]
    fn test_ema_seeded_with_first_price() {
        let trend = TrendIndicators::new();
        let ema = trend.ema(&sample_prices(), EmaParams { period: 3 }).unwrap();

        assert_eq!(ema.len(), 6);
        assert_eq!(ema[0], Some(dec!(100.0)));
        // α = 0.5: 0.5 × 102 + 0.5 × 100 = 101
        assert_eq!(ema[1], Some(dec!(101)));
        // 0.5 × 101 + 0.5 × 101 = 101
        assert_eq!(ema[2], Some(dec!(101)));
        assert!(ema.iter().all(Option::is_some));
    }

    #[test]
    fn test_zero_period_rejected() {
        let trend = TrendIndicators::new();
        assert!(matches!(
            trend.sma(&sample_prices(), SmaParams { period: 0 }),
            Err(IndicatorError::InvalidParameter(_))
        ));
        assert!(trend.ema(&sample_prices(), EmaParams { period: 0 }).is_err());
    }

    #[test]
    fn test_sma_overflow_is_an_error() {
        let trend = TrendIndicators::new();
        let huge = dec!(50000000000000000000000000000);
        let prices = vec![huge, huge, huge];

        assert!(matches!(
            trend.sma(&prices, SmaParams { period: 2 }),
            Err(IndicatorError::CalculationError(_))
        ));
        // EMA는 가중 평균이므로 같은 입력에서도 범위 안에 있음
        let ema = trend.ema(&prices, EmaParams { period: 2 }).unwrap();
        assert!(ema.iter().all(Option::is_some));
    }

    #[test]
    fn test_empty_input() {
        let trend = TrendIndicators::new();
        assert!(trend.sma(&[], SmaParams::default()).unwrap().is_empty());
        assert!(trend.ema(&[], EmaParams::default()).unwrap().is_empty());
    }
}
