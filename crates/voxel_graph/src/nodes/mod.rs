//! Graph nodes built on the buffer engine.

pub mod pin;
pub mod select;

pub use pin::{FutureValue, Pin, PinValueMap, PinValueSource, Query, QueryId};
pub use select::{PromotionTypes, SelectNode, INDEX_PIN, RESULT_PIN};
