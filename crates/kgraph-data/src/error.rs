//! 시계열 로딩 오류 타입.

use kgraph_analytics::IndicatorError;
use kgraph_core::CoreError;
use thiserror::Error;

/// 시계열 로딩 오류.
#[derive(Debug, Error)]
pub enum LoadError {
    /// 데이터 소스 조회 실패 (네트워크, 오류 응답, 빈 결과)
    #[error("Data unavailable for {pair}: {reason}")]
    DataUnavailable { pair: String, reason: String },

    /// 나누어떨어지는 네이티브 간격이 없음
    #[error("Unsupported interval: {interval} minutes")]
    UnsupportedInterval { interval: u32 },

    /// 숫자 필드 변환 실패
    #[error("Malformed {field} at row {row}: {value}")]
    DataFormat {
        field: String,
        row: usize,
        value: String,
    },

    /// 잘못된 요청 (빈 페어, 0분 간격 등)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 거래 가능 페어 목록 조회 실패
    #[error("Pair catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// 이동평균 계산 오류
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    /// 시계열 구성 오류
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl LoadError {
    pub(crate) fn unavailable(pair: impl ToString, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            pair: pair.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn format(field: &str, row: usize, value: impl ToString) -> Self {
        Self::DataFormat {
            field: field.to_string(),
            row,
            value: value.to_string(),
        }
    }
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
