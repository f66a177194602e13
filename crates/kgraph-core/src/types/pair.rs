//! 통화 페어 식별자.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// 데이터 소스가 이해하는 통화 페어 식별자 (예: `XETHZUSD`).
///
/// 거래소 표기를 그대로 보존하며 비어 있을 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pair(String);

impl Pair {
    /// 기본 페어 (ETH/USD).
    pub const DEFAULT: &'static str = "XETHZUSD";

    /// 새 페어를 생성합니다. 앞뒤 공백은 제거됩니다.
    pub fn new(raw: impl AsRef<str>) -> CoreResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput(
                "페어 식별자는 비어 있을 수 없습니다".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// 거래소 표기 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Pair {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Pair {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Pair {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Pair> for String {
    fn from(pair: Pair) -> Self {
        pair.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_creation() {
        let pair = Pair::new(" XETHZUSD ").unwrap();
        assert_eq!(pair.as_str(), "XETHZUSD");
        assert_eq!(pair.to_string(), "XETHZUSD");
    }

    #[test]
    fn test_empty_pair_rejected() {
        assert!(Pair::new("").is_err());
        assert!("   ".parse::<Pair>().is_err());
    }

    #[test]
    fn test_pair_serde() {
        let pair: Pair = serde_json::from_str("\"XXBTZUSD\"").unwrap();
        assert_eq!(pair.as_str(), "XXBTZUSD");
        assert!(serde_json::from_str::<Pair>("\"\"").is_err());
    }
}
