use crate::config::StrategyConfig;

//integer contract count and the margin actually committed for a new position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSize {
    pub contracts: u32,
    pub committed_margin: f64,
}

//sizes a new position against current capital
//returns None when less than one contract is affordable; that is a valid
//"insufficient capital" outcome the caller skips, not an error
pub fn size_position(
    capital: f64,
    entry_price: f64,
    processing_margin: Option<f64>,
    config: &StrategyConfig,
) -> Option<PositionSize> {
    if !(entry_price > 0.0) || !capital.is_finite() {
        return None;
    }

    //fraction of capital ever usable as margin, then the per-trade slice
    let available_margin = capital * config.max_position_ratio;
    let margin_to_invest = available_margin * effective_fraction(processing_margin, config);

    //leverage scales the controllable notional, not the committed margin
    let notional = margin_to_invest * config.leverage;

    let contract_value = config.contract.notional(entry_price, 1);
    let contracts = (notional / contract_value).floor();
    if !(contracts >= 1.0) {
        return None;
    }
    let contracts = contracts as u32;

    //recompute from the integer count; flooring changes the capital at risk
    let committed_margin = config.contract.notional(entry_price, contracts) / config.leverage;

    Some(PositionSize {
        contracts,
        committed_margin,
    })
}

//per-trade fraction, graded by the processing margin when enabled:
//a cheap valuation sizes up, an expensive one sizes down
fn effective_fraction(processing_margin: Option<f64>, config: &StrategyConfig) -> f64 {
    let mut fraction = config.position_size;
    if config.enable_dynamic_position {
        if let Some(margin) = processing_margin {
            if margin < config.margin_low_threshold {
                fraction *= config.position_multiplier_low;
            } else if margin > config.margin_high_threshold {
                fraction *= config.position_multiplier_high;
            }
        }
    }
    fraction
}
