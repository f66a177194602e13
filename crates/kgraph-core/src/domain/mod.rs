//! 시계열 및 지표 오버레이 도메인 모델.

mod indicator;
mod market_data;
mod profit;
mod signal;

pub use indicator::*;
pub use market_data::*;
pub use profit::*;
pub use signal::*;
