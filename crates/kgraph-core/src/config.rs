//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 모든 섹션은 기본값을 가지므로 설정 파일 없이도 동작합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{NativeIntervals, Pair};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Kraken API 설정
    pub kraken: KrakenConfig,
    /// 네이티브 간격 설정
    pub intervals: IntervalConfig,
    /// 지표 계산 설정
    pub indicators: IndicatorConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 화면 표시 설정
    pub display: DisplayConfig,
}

/// Kraken 공개 REST API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KrakenConfig {
    /// REST API 기본 URL
    pub rest_base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for KrakenConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.kraken.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// 네이티브 간격 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct IntervalConfig {
    /// 데이터 소스가 직접 제공하는 간격 (분)
    pub native: NativeIntervals,
}

/// 지표 계산 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// 기본 윈도우 (이동평균, 스토캐스틱)
    pub window: usize,
    /// 짧은 시계열에서 사용하는 윈도우
    pub short_window: usize,
    /// %D 평활 기간
    pub smoothing: usize,
    /// 이 행 수 미만이면 짧은 윈도우 사용
    pub short_series_threshold: usize,
    /// 과매도 임계값 (%D)
    pub oversold: Decimal,
    /// 과매수 임계값 (%D)
    pub overbought: Decimal,
    /// 수익 시뮬레이션 거래 단위
    pub lot_size: Decimal,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            window: 14,
            short_window: 3,
            smoothing: 3,
            short_series_threshold: 60,
            oversold: Decimal::new(20, 0),
            overbought: Decimal::new(80, 0),
            lot_size: Decimal::new(100, 0),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 화면 표시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// 기본 페어
    pub pair: Pair,
    /// 기본 간격 (분)
    pub interval: u32,
    /// 표시할 마지막 행 수
    pub tail: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            pair: Pair::default(),
            interval: 21600,
            tail: 60,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `KGRAPH__SECTION__KEY` 형식으로 파일 값을 덮어씁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        Self::build(Some(path.as_ref()))
    }

    /// 설정 파일이 있으면 읽고, 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::build(Some(path))
        } else {
            Self::build(None)
        }
    }

    fn build(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("KGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        config.try_deserialize()
    }
}
