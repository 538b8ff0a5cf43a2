use serde::{Deserialize, Serialize};

//terms of the traded futures contract
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractSpec {
    //contract symbol (eg ta, eg the pta main contract)
    pub symbol: String,

    //units per contract (eg 5 tonnes per lot)
    pub contract_size: f64,

    //exchange minimum margin rate; caps leverage at 1 / rate
    pub min_margin_rate: f64,

    //fixed commission per contract per leg
    pub commission_per_contract: f64,

    //commission as a fraction of traded notional, per leg
    pub commission_rate: f64,

    //true selects the fixed per-contract mode, false the notional-rate mode
    pub use_fixed_commission: bool,
}

impl ContractSpec {
    pub fn new(
        symbol: String,
        contract_size: f64,
        min_margin_rate: f64,
        commission_per_contract: f64,
        commission_rate: f64,
        use_fixed_commission: bool,
    ) -> Self {
        ContractSpec {
            symbol,
            contract_size,
            min_margin_rate,
            commission_per_contract,
            commission_rate,
            use_fixed_commission,
        }
    }

    //helper to create a pta-style contract (5 units/lot, 7% minimum margin,
    //fixed 3.3 per lot per leg)
    pub fn pta() -> Self {
        ContractSpec::new("TA".to_string(), 5.0, 0.07, 3.3, 0.0001, true)
    }

    //maximum leverage implied by the minimum margin rate
    pub fn max_leverage(&self) -> f64 {
        1.0 / self.min_margin_rate
    }

    //notional value of a number of contracts at a price
    pub fn notional(&self, price: f64, contracts: u32) -> f64 {
        price * self.contract_size * contracts as f64
    }

    //pnl of a favorable price move over a number of contracts
    //price_diff is exit - entry for longs, entry - exit for shorts
    pub fn pnl_from_price_move(&self, price_diff: f64, contracts: u32) -> f64 {
        price_diff * self.contract_size * contracts as f64
    }

    //commission for a complete round trip, both legs
    pub fn round_trip_commission(&self, entry_price: f64, exit_price: f64, contracts: u32) -> f64 {
        if self.use_fixed_commission {
            //one charge per leg
            self.commission_per_contract * contracts as f64 * 2.0
        } else {
            let entry_leg = self.notional(entry_price, contracts) * self.commission_rate;
            let exit_leg = self.notional(exit_price, contracts) * self.commission_rate;
            entry_leg + exit_leg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_leverage_follows_margin_rate() {
        let contract = ContractSpec::pta();
        assert!((contract.max_leverage() - 1.0 / 0.07).abs() < 1e-12);
    }

    #[test]
    fn fixed_commission_charges_both_legs() {
        let contract = ContractSpec::pta();
        assert!((contract.round_trip_commission(5000.0, 5100.0, 3) - 3.3 * 3.0 * 2.0).abs() < 1e-12);
    }

    #[test]
    fn rate_commission_uses_entry_and_exit_notional() {
        let mut contract = ContractSpec::pta();
        contract.use_fixed_commission = false;
        //notional legs: 5000*5*2 = 50000 and 5100*5*2 = 51000
        let expected = (50_000.0 + 51_000.0) * 0.0001;
        assert!((contract.round_trip_commission(5000.0, 5100.0, 2) - expected).abs() < 1e-12);
    }

    #[test]
    fn pnl_scales_with_contract_size() {
        let contract = ContractSpec::pta();
        assert!((contract.pnl_from_price_move(40.0, 2) - 400.0).abs() < 1e-12);
    }
}
