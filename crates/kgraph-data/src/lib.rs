//! 시계열 로딩 및 정규화.
//!
//! 이 crate는 다음을 제공합니다:
//! - 데이터 소스 조회, 숫자 변환, 정렬/중복 제거를 수행하는 `SeriesLoader`
//! - since/until 슬라이스와 이동평균 부착
//! - 네이티브 간격이 없는 요청을 위한 재집계
//! - 거래 가능 페어 목록 캐시
//! - 최신 요청만 결과를 반영하는 요청 게이트

pub mod error;
pub mod gate;
pub mod loader;
pub mod pairs;
pub mod resample;

pub use error::{LoadError, LoadResult};
pub use gate::{LoadTicket, RequestGate};
pub use loader::SeriesLoader;
pub use pairs::PairCatalog;
pub use resample::resample;
