pub mod position;
pub mod trade;

pub use position::{Position, Side};
pub use trade::{ExitReason, TradeRecord};
