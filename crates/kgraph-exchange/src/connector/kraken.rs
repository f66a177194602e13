//! Kraken 공개 REST API 커넥터.
//!
//! 인증이 필요 없는 `OHLC`, `AssetPairs` 엔드포인트만 사용합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kgraph_core::{KrakenConfig, Pair};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::traits::{ExchangeResult, OhlcBatch, OhlcSource, RawOhlcRow};
use crate::ExchangeError;

// ============================================================================
// 설정
// ============================================================================

/// Kraken 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct KrakenClientConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for KrakenClientConfig {
    fn default() -> Self {
        Self::from(&KrakenConfig::default())
    }
}

impl From<&KrakenConfig> for KrakenClientConfig {
    fn from(config: &KrakenConfig) -> Self {
        Self {
            base_url: config.rest_base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl KrakenClientConfig {
    /// 기본 URL을 바꿉니다 (테스트 서버 등).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

// ============================================================================
// API 응답 타입
// ============================================================================

/// 모든 Kraken 응답의 공통 봉투: `{"error": [...], "result": {...}}`.
#[derive(Debug, Deserialize)]
struct KrakenEnvelope<T> {
    #[serde(default)]
    error: Vec<String>,
    result: Option<T>,
}

// ============================================================================
// Kraken 클라이언트
// ============================================================================

/// Kraken 공개 API 클라이언트.
pub struct KrakenClient {
    config: KrakenClientConfig,
    client: Client,
}

impl KrakenClient {
    /// 새 Kraken 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: KrakenClientConfig) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    /// 공개 API GET 요청.
    async fn public_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let url = format!("{}/0/public/{}", self.config.base_url, endpoint);
        debug!(%url, ?params, "GET");

        let response = self.client.get(&url).query(params).send().await?;
        self.handle_response(endpoint, response).await
    }

    /// API 응답 처리.
    ///
    /// HTTP 에러, 에러 페이로드, 빈 `result`는 모두 에러로 변환됩니다.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> ExchangeResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            // Kraken은 HTTP 에러에도 봉투를 보내는 경우가 있음
            if let Ok(envelope) = serde_json::from_str::<KrakenEnvelope<Value>>(&body) {
                if !envelope.error.is_empty() {
                    return Err(ExchangeError::from_kraken(envelope.error));
                }
            }
            return Err(ExchangeError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: KrakenEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            error!(endpoint, error = %e, "Failed to parse response");
            ExchangeError::ParseError(e.to_string())
        })?;

        if !envelope.error.is_empty() {
            return Err(ExchangeError::from_kraken(envelope.error));
        }

        envelope
            .result
            .ok_or_else(|| ExchangeError::EmptyResult(endpoint.to_string()))
    }

    /// `OHLC` 결과 객체에서 캔들 배열과 `last` 커서를 꺼냅니다.
    ///
    /// 결과 키는 요청 표기와 다를 수 있으므로 (`ETHUSD` → `XETHZUSD`)
    /// 요청 페어와 같은 키를 우선하고, 없으면 `last`가 아닌 첫 배열을 사용합니다.
    fn extract_ohlc(
        pair: &Pair,
        interval: u32,
        mut result: Map<String, Value>,
    ) -> ExchangeResult<OhlcBatch> {
        let last = result.remove("last").and_then(|v| v.as_i64());

        let key = if result.contains_key(pair.as_str()) {
            pair.as_str().to_string()
        } else {
            result
                .iter()
                .find(|(_, v)| v.is_array())
                .map(|(k, _)| k.clone())
                .ok_or_else(|| ExchangeError::EmptyResult(pair.to_string()))?
        };

        let rows = match result.remove(&key) {
            Some(Value::Array(rows)) => rows,
            _ => return Err(ExchangeError::ParseError(format!("{}: 캔들 배열이 아님", key))),
        };

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| match row {
                Value::Array(fields) => Ok(RawOhlcRow(fields)),
                other => Err(ExchangeError::ParseError(format!(
                    "{} 행 {}: 배열이 아님 ({})",
                    key, i, other
                ))),
            })
            .collect::<ExchangeResult<Vec<_>>>()?;

        Ok(OhlcBatch {
            pair_key: key,
            interval,
            rows,
            last,
        })
    }
}

#[async_trait]
impl OhlcSource for KrakenClient {
    fn name(&self) -> &str {
        "kraken"
    }

    async fn fetch_ohlc(
        &self,
        pair: &Pair,
        interval: u32,
        since: Option<DateTime<Utc>>,
    ) -> ExchangeResult<OhlcBatch> {
        let mut params = vec![
            ("pair", pair.to_string()),
            ("interval", interval.to_string()),
        ];
        if let Some(since) = since {
            params.push(("since", since.timestamp().to_string()));
        }

        let result: Map<String, Value> = self.public_get("OHLC", &params).await?;
        let batch = Self::extract_ohlc(pair, interval, result)?;

        debug!(
            pair = %pair,
            key = %batch.pair_key,
            interval,
            rows = batch.rows.len(),
            "Fetched OHLC"
        );
        Ok(batch)
    }

    async fn asset_pairs(&self) -> ExchangeResult<Vec<String>> {
        let result: Map<String, Value> = self.public_get("AssetPairs", &[]).await?;
        let mut pairs: Vec<String> = result.into_iter().map(|(k, _)| k).collect();
        pairs.sort();

        info!(count = pairs.len(), "Fetched tradable pairs");
        Ok(pairs)
    }
}
