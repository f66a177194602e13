//! 거래소 에러 타입.

use thiserror::Error;

/// 데이터 소스 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 요청 한도 초과
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// 거래소가 반환한 에러 페이로드 (예: `EQuery:Unknown asset pair`)
    #[error("API error: {}", .0.join(", "))]
    ApiError(Vec<String>),

    /// HTTP 상태 에러
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// 페어를 찾을 수 없음
    #[error("Unknown pair: {0}")]
    UnknownPair(String),

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 빈 결과
    #[error("Empty result for {0}")]
    EmptyResult(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ExchangeError {
    /// 재시도 가능한 에러인지 확인.
    ///
    /// 코어는 재시도하지 않습니다. 호출자가 자체 정책을 세울 때 사용합니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExchangeError::NetworkError(_)
            | ExchangeError::RateLimited(_)
            | ExchangeError::Timeout(_) => true,
            ExchangeError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Kraken 에러 문자열 목록을 분류합니다.
    ///
    /// Kraken 에러는 `<심각도><분류>:<메시지>` 형식입니다 (예: `EGeneral:Too many requests`).
    pub fn from_kraken(errors: Vec<String>) -> Self {
        if errors.iter().any(|e| e.contains("Too many requests") || e.contains("Rate limit")) {
            return ExchangeError::RateLimited(errors.join(", "));
        }
        if let Some(e) = errors.iter().find(|e| e.contains("Unknown asset pair")) {
            return ExchangeError::UnknownPair(e.clone());
        }
        if errors.iter().any(|e| e.starts_with("EService:Unavailable") || e.starts_with("EService:Busy")) {
            return ExchangeError::NetworkError(errors.join(", "));
        }
        ExchangeError::ApiError(errors)
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            ExchangeError::NetworkError(err.to_string())
        } else if err.is_decode() {
            ExchangeError::ParseError(err.to_string())
        } else {
            ExchangeError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}
