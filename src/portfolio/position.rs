use crate::instrument::ContractSpec;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//direction of an open position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }
}

//the single open position the engine may hold
//committed_margin is fixed at entry and never revised while open
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub side: Side,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub entry_lead_spread: f64,
    pub stop_price: f64,
    pub contracts: u32,
    pub committed_margin: f64,

    //basis values observed since entry, append-only; dies with the position
    pub basis_history: Vec<f64>,
}

impl Position {
    //opens a position, seeding the basis history with the entry bar's
    //observation when present
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        side: Side,
        entry_date: NaiveDate,
        entry_price: f64,
        entry_lead_spread: f64,
        stop_price: f64,
        contracts: u32,
        committed_margin: f64,
        entry_basis: Option<f64>,
    ) -> Self {
        Position {
            side,
            entry_date,
            entry_price,
            entry_lead_spread,
            stop_price,
            contracts,
            committed_margin,
            basis_history: entry_basis.into_iter().collect(),
        }
    }

    //appends a basis observation for a bar the position stayed open
    pub fn record_basis(&mut self, basis: Option<f64>) {
        if let Some(value) = basis {
            self.basis_history.push(value);
        }
    }

    //calendar days held as of a given date
    pub fn holding_days(&self, date: NaiveDate) -> i64 {
        (date - self.entry_date).num_days()
    }

    //unrealized pnl at a price, commission excluded
    pub fn unrealized_pnl(&self, price: f64, contract: &ContractSpec) -> f64 {
        let price_diff = match self.side {
            Side::Long => price - self.entry_price,
            Side::Short => self.entry_price - price,
        };
        contract.pnl_from_price_move(price_diff, self.contracts)
    }

    //unrealized pnl as a percent of the committed margin
    pub fn unrealized_pnl_pct(&self, price: f64, contract: &ContractSpec) -> f64 {
        if self.committed_margin > 0.0 {
            self.unrealized_pnl(price, contract) / self.committed_margin * 100.0
        } else {
            0.0
        }
    }

    //true if the price has crossed the stop level against the position
    pub fn stop_breached(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price < self.stop_price,
            Side::Short => price > self.stop_price,
        }
    }

    //true when the last run_days basis observations form a strict run
    //against the position: falling basis erodes a long's cash support,
    //a rising basis squeezes a short
    pub fn basis_run_against(&self, run_days: usize) -> bool {
        if self.basis_history.len() < run_days {
            return false;
        }
        let tail = &self.basis_history[self.basis_history.len() - run_days..];
        match self.side {
            Side::Long => tail.windows(2).all(|pair| pair[1] < pair[0]),
            Side::Short => tail.windows(2).all(|pair| pair[1] > pair[0]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn long_position() -> Position {
        Position::open(
            Side::Long,
            date("2024-03-01"),
            5000.0,
            100.0,
            4900.0,
            3,
            75_000.0,
            Some(10.0),
        )
    }

    #[test]
    fn unrealized_pnl_tracks_side() {
        let contract = ContractSpec::pta();
        let mut position = long_position();
        assert!((position.unrealized_pnl(5100.0, &contract) - 1500.0).abs() < 1e-9);

        position.side = Side::Short;
        assert!((position.unrealized_pnl(5100.0, &contract) + 1500.0).abs() < 1e-9);
    }

    #[test]
    fn pnl_pct_is_relative_to_committed_margin() {
        let contract = ContractSpec::pta();
        let position = long_position();
        let pct = position.unrealized_pnl_pct(5100.0, &contract);
        assert!((pct - 1500.0 / 75_000.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn stop_breach_is_strict_and_directional() {
        let mut position = long_position();
        assert!(!position.stop_breached(4900.0));
        assert!(position.stop_breached(4899.9));

        position.side = Side::Short;
        position.stop_price = 5100.0;
        assert!(!position.stop_breached(5100.0));
        assert!(position.stop_breached(5100.1));
    }

    #[test]
    fn holding_days_is_a_calendar_difference() {
        let position = long_position();
        assert_eq!(position.holding_days(date("2024-03-01")), 0);
        assert_eq!(position.holding_days(date("2024-03-16")), 15);
    }

    #[test]
    fn basis_history_seeds_from_entry_and_appends() {
        let mut position = long_position();
        assert_eq!(position.basis_history, vec![10.0]);

        position.record_basis(Some(9.0));
        position.record_basis(None);
        position.record_basis(Some(8.0));
        assert_eq!(position.basis_history, vec![10.0, 9.0, 8.0]);
    }

    #[test]
    fn basis_run_detects_strict_declines_for_longs() {
        let mut position = long_position();
        position.basis_history = vec![12.0, 10.0, 9.0, 8.0];
        assert!(position.basis_run_against(3));

        //a flat pair breaks strictness
        position.basis_history = vec![10.0, 9.0, 9.0];
        assert!(!position.basis_run_against(3));
    }

    #[test]
    fn basis_run_detects_strict_rises_for_shorts() {
        let mut position = long_position();
        position.side = Side::Short;
        position.basis_history = vec![8.0, 9.0, 11.0];
        assert!(position.basis_run_against(3));

        position.basis_history = vec![8.0, 9.0, 8.5];
        assert!(!position.basis_run_against(3));
    }

    #[test]
    fn basis_run_needs_enough_history() {
        let position = long_position();
        assert!(!position.basis_run_against(3));
    }
}
