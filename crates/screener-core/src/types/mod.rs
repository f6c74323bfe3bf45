//! 지표 스크리너 전반에서 사용되는 공통 타입.

mod asset;
mod ohlcv;

pub use asset::*;
pub use ohlcv::*;
