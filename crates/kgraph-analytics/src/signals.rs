//! %K/%D 교차 신호 감지.
//!
//! - 매수: %K가 %D를 상향 돌파하고 %D가 과매도 임계값 미만
//! - 매도: %K가 %D를 하향 돌파하고 %D가 과매수 임계값 초과

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::indicators::{IndicatorError, IndicatorResult};

/// 교차 신호 임계값.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverParams {
    /// 과매도 임계값 (기본: 20)
    pub oversold: Decimal,
    /// 과매수 임계값 (기본: 80)
    pub overbought: Decimal,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        Self {
            oversold: dec!(20),
            overbought: dec!(80),
        }
    }
}

impl CrossoverParams {
    pub fn validate(&self) -> IndicatorResult<()> {
        let in_range = |v: Decimal| v >= Decimal::ZERO && v <= dec!(100);
        if !in_range(self.oversold) || !in_range(self.overbought) {
            return Err(IndicatorError::InvalidParameter(format!(
                "임계값은 0~100 범위여야 합니다: oversold {}, overbought {}",
                self.oversold, self.overbought
            )));
        }
        if self.oversold > self.overbought {
            return Err(IndicatorError::InvalidParameter(format!(
                "과매도 임계값({})이 과매수 임계값({})보다 큽니다",
                self.oversold, self.overbought
            )));
        }
        Ok(())
    }
}

/// 한 시점의 교차 신호.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrossoverFlags {
    pub buy: bool,
    pub sell: bool,
}

/// %K/%D 교차 감지기.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossoverDetector {
    params: CrossoverParams,
}

impl CrossoverDetector {
    pub fn new(params: CrossoverParams) -> IndicatorResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> CrossoverParams {
        self.params
    }

    /// 각 시점의 매수/매도 신호를 계산합니다.
    ///
    /// 현재와 직전 시점의 %K, %D가 모두 정의되어야 신호가 발생할 수 있습니다.
    /// 첫 행은 직전 시점이 없으므로 항상 신호가 없습니다.
    pub fn detect(&self, k: &[Option<Decimal>], d: &[Option<Decimal>]) -> Vec<CrossoverFlags> {
        let len = k.len().min(d.len());
        let mut flags = vec![CrossoverFlags::default(); len];

        for t in 1..len {
            let (Some(k_now), Some(d_now), Some(k_prev), Some(d_prev)) =
                (k[t], d[t], k[t - 1], d[t - 1])
            else {
                continue;
            };

            flags[t] = CrossoverFlags {
                buy: k_now > d_now && k_prev <= d_prev && d_now < self.params.oversold,
                sell: k_now < d_now && k_prev >= d_prev && d_now > self.params.overbought,
            };
        }

        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[i64]) -> Vec<Option<Decimal>> {
        values.iter().map(|&v| Some(Decimal::from(v))).collect()
    }

    #[test]
    fn test_buy_on_upward_cross_when_oversold() {
        let detector = CrossoverDetector::default();
        let k = some(&[5, 15]);
        let d = some(&[10, 12]);

        let flags = detector.detect(&k, &d);
        assert!(!flags[0].buy);
        assert!(flags[1].buy);
        assert!(!flags[1].sell);
    }

    #[test]
    fn test_no_buy_when_d_not_oversold() {
        let detector = CrossoverDetector::default();
        let flags = detector.detect(&some(&[40, 60]), &some(&[50, 50]));
        assert!(!flags[1].buy);
    }

    #[test]
    fn test_sell_on_downward_cross_when_overbought() {
        let detector = CrossoverDetector::default();
        let flags = detector.detect(&some(&[95, 82]), &some(&[90, 88]));
        assert!(flags[1].sell);
        assert!(!flags[1].buy);
    }

    #[test]
    fn test_undefined_values_suppress_signals() {
        let detector = CrossoverDetector::default();
        let k = vec![None, Some(dec!(15))];
        let d = vec![Some(dec!(10)), Some(dec!(12))];
        let flags = detector.detect(&k, &d);
        assert_eq!(flags[1], CrossoverFlags::default());
    }

    #[test]
    fn test_custom_thresholds() {
        let detector = CrossoverDetector::new(CrossoverParams {
            oversold: dec!(30),
            overbought: dec!(70),
        })
        .unwrap();
        let flags = detector.detect(&some(&[20, 28]), &some(&[25, 26]));
        assert!(flags[1].buy);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(CrossoverParams {
            oversold: dec!(90),
            overbought: dec!(10),
        }
        .validate()
        .is_err());
        assert!(CrossoverParams {
            oversold: dec!(-1),
            overbought: dec!(80),
        }
        .validate()
        .is_err());
    }
}
