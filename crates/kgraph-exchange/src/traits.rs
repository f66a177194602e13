//! 데이터 소스 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kgraph_core::Pair;
use serde_json::Value;

use crate::ExchangeError;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 원시 OHLC 튜플의 필드 이름 (위치 순서).
///
/// `vwap`과 `count`는 이 시스템에서 사용하지 않는 컬럼입니다.
pub const OHLC_FIELDS: [&str; 8] = [
    "timestamp", "open", "high", "low", "close", "vwap", "volume", "count",
];

/// 데이터 소스가 반환한 가공 전 OHLC 튜플 한 개.
///
/// 숫자 변환은 로더가 필드 이름과 함께 수행하므로 JSON 값을 그대로 보관합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOhlcRow(pub Vec<Value>);

impl RawOhlcRow {
    /// 이름으로 필드를 조회합니다.
    pub fn field(&self, name: &str) -> Option<&Value> {
        let index = OHLC_FIELDS.iter().position(|f| *f == name)?;
        self.0.get(index)
    }
}

/// 한 번의 OHLC 조회 결과.
#[derive(Debug, Clone)]
pub struct OhlcBatch {
    /// 데이터 소스가 결과에 사용한 페어 키 (요청 표기와 다를 수 있음)
    pub pair_key: String,
    /// 조회한 네이티브 간격 (분)
    pub interval: u32,
    pub rows: Vec<RawOhlcRow>,
    /// 다음 증분 조회에 사용할 커서 (초)
    pub last: Option<i64>,
}

/// 캔들 데이터 소스에 대한 읽기 전용 인터페이스.
#[async_trait]
pub trait OhlcSource: Send + Sync {
    /// 데이터 소스 이름.
    fn name(&self) -> &str;

    /// 네이티브 `interval`(분)의 OHLC 캔들을 조회합니다.
    ///
    /// `since`가 주어지면 그 시각 이후의 캔들만 요청합니다.
    async fn fetch_ohlc(
        &self,
        pair: &Pair,
        interval: u32,
        since: Option<DateTime<Utc>>,
    ) -> ExchangeResult<OhlcBatch>;

    /// 거래 가능한 페어 목록을 조회합니다.
    async fn asset_pairs(&self) -> ExchangeResult<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_row_field_lookup() {
        let row = RawOhlcRow(vec![
            json!(1688671200),
            json!("1863.15"),
            json!("1864.00"),
            json!("1862.50"),
            json!("1863.99"),
            json!("1863.48"),
            json!("12.3"),
            json!(45),
        ]);
        assert_eq!(row.field("close"), Some(&json!("1863.99")));
        assert_eq!(row.field("volume"), Some(&json!("12.3")));
        assert_eq!(row.field("nope"), None);

        let short = RawOhlcRow(vec![json!(1)]);
        assert_eq!(short.field("open"), None);
    }
}
