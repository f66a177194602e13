//! 핵심 도메인 에러 타입.
//!
//! 캔들/시계열 구성 시 불변식 위반을 표현합니다.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 캔들 가격 관계 위반 (low ≤ open, close ≤ high 등)
    #[error("잘못된 캔들 ({timestamp}): {reason}")]
    InvalidCandle {
        timestamp: DateTime<Utc>,
        reason: String,
    },

    /// 타임스탬프가 엄격히 증가하지 않음
    #[error("시계열 순서 위반 (행 {index}): {previous} 다음에 {current}")]
    OutOfOrder {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    /// 파생 컬럼 길이가 원본과 다름
    #[error("컬럼 길이 불일치: 기대 {expected}개, 제공 {actual}개")]
    LengthMismatch { expected: usize, actual: usize },

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// Decimal 연산 범위 초과
    #[error("산술 오버플로: {0}")]
    Overflow(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
