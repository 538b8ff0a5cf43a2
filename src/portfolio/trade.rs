use crate::portfolio::position::Side;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

//why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    HoldingPeriodExpired,
    PriceStop,
    SpreadMaStop,
    BasisTakeProfit,
    EndOfData,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::HoldingPeriodExpired => "holding period expired",
            ExitReason::PriceStop => "price stop",
            ExitReason::SpreadMaStop => "spread ma stop",
            ExitReason::BasisTakeProfit => "basis take profit",
            ExitReason::EndOfData => "end of data",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//immutable snapshot of a completed round trip, written at close
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub contracts: u32,
    //realized, net of commission
    pub pnl: f64,
    //realized pnl as a percent of the committed margin
    pub pnl_pct: f64,
    pub holding_days: i64,
    pub exit_reason: ExitReason,
    pub commission: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_reasons_render_stable_labels() {
        assert_eq!(ExitReason::PriceStop.to_string(), "price stop");
        assert_eq!(
            ExitReason::HoldingPeriodExpired.to_string(),
            "holding period expired"
        );
    }
}
