use crate::config::StrategyConfig;
use crate::data::Bar;
use crate::indicators::rolling_true_range_mean;

//per-bar entry signal pair
//a signal computed from bar i is actionable at bar i+1 at the earliest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signal {
    pub long: bool,
    pub short: bool,
}

impl Signal {
    pub fn none() -> Self {
        Signal {
            long: false,
            short: false,
        }
    }
}

//generates entry signals from the lead-spread series
//the day-over-day percent change is compared against a threshold scaled by
//the spread's own volatility, so sensitivity follows the spread regime
//instead of a fixed percentage cutoff
pub fn generate_signals(bars: &[Bar], config: &StrategyConfig) -> Vec<Signal> {
    let spreads: Vec<f64> = bars.iter().map(|b| b.lead_spread).collect();
    let spread_atr = rolling_true_range_mean(&spreads, config.spread_atr_period);

    //the valuation filter only applies when the margin series was observed at all
    let margin_observed = bars.iter().any(|b| b.processing_margin.is_some());
    let apply_filter = config.enable_margin_filter && margin_observed;

    let mut signals = vec![Signal::none(); bars.len()];

    //the first bar has no prior value to compare against
    for i in 1..bars.len() {
        let prev_spread = spreads[i - 1];

        //a zero or unobservable prior spread leaves the ratio undefined
        if prev_spread == 0.0 || !prev_spread.is_finite() {
            continue;
        }

        let day_change_pct = (spreads[i] / prev_spread - 1.0) * 100.0;
        let atr_pct = (spread_atr[i] / prev_spread) * 100.0;
        let threshold_pct = config.spread_atr_multiplier * atr_pct;

        if !day_change_pct.is_finite() || !threshold_pct.is_finite() {
            continue;
        }

        let long_raw = day_change_pct > threshold_pct;
        let short_raw = day_change_pct < -threshold_pct;

        let (long, short) = if apply_filter {
            //an unobserved margin on a filtered day blocks the entry
            match bars[i].processing_margin {
                Some(margin) => (
                    long_raw && margin < config.margin_long_max,
                    short_raw && margin > config.margin_short_min,
                ),
                None => (false, false),
            }
        } else {
            (long_raw, short_raw)
        };

        signals[i] = Signal { long, short };
    }

    signals
}
