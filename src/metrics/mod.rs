pub mod summary;
pub mod timeseries;

pub use summary::SummaryMetrics;
pub use timeseries::{calculate_returns, drawdown_series, max_drawdown_pct};
