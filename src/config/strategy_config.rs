use crate::instrument::ContractSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("initial_capital must be positive, got {0}")]
    NonPositiveCapital(f64),
    #[error("{name} must be between 0 and 1, got {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },
    #[error("leverage must be at least 1, got {0}")]
    LeverageTooLow(f64),
    #[error("leverage {leverage} exceeds the maximum {max:.1} implied by a minimum margin rate of {min_margin_rate}")]
    LeverageTooHigh {
        leverage: f64,
        max: f64,
        min_margin_rate: f64,
    },
    #[error("min_margin_rate must be in (0, 1], got {0}")]
    InvalidMarginRate(f64),
    #[error("{name} must be at least 1, got {value}")]
    WindowTooSmall { name: &'static str, value: usize },
    #[error("holding_period must be at least 1 day, got {0}")]
    HoldingPeriodTooShort(i64),
    #[error("contract_size must be positive, got {0}")]
    NonPositiveContractSize(f64),
}

//complete configuration for one backtest run
//an immutable value passed into each engine invocation, never shared state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyConfig {
    //signal generation
    //window for the lead-spread true-range mean (trading days)
    pub spread_atr_period: usize,
    //volatility multiplier applied to the relative threshold
    pub spread_atr_multiplier: f64,

    //valuation filter
    pub enable_margin_filter: bool,
    //long entries require processing_margin below this level
    pub margin_long_max: f64,
    //short entries require processing_margin above this level
    pub margin_short_min: f64,

    //trade execution
    pub initial_capital: f64,
    //fraction of the available-margin pool committed per trade
    pub position_size: f64,
    //fraction of capital ever usable as margin
    pub max_position_ratio: f64,
    //maximum holding horizon in calendar days
    pub holding_period: i64,
    pub leverage: f64,

    //contract terms
    pub contract: ContractSpec,

    //risk control
    //stop distance in multiples of the price true-range mean
    pub atr_multiplier: f64,
    //window for the price true-range mean (trading days)
    pub atr_period: usize,
    //window for the lead-spread moving average stop
    pub spread_ma_period: usize,
    pub enable_spread_ma_stop: bool,

    //basis take-profit
    pub enable_basis_take_profit: bool,
    //minimum unrealized profit, percent of committed margin
    pub basis_take_profit_threshold: f64,
    //length of the strict directional basis run
    pub basis_decline_days: usize,
    //minimum holding days before the take-profit can arm
    pub basis_min_holding_days: i64,

    //graded position sizing keyed on processing margin
    pub enable_dynamic_position: bool,
    pub margin_low_threshold: f64,
    pub margin_high_threshold: f64,
    pub position_multiplier_low: f64,
    pub position_multiplier_high: f64,

    //performance evaluation
    pub trading_days_per_year: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            spread_atr_period: 20,
            spread_atr_multiplier: 1.5,
            enable_margin_filter: true,
            margin_long_max: 450.0,
            margin_short_min: 750.0,
            initial_capital: 1_000_000.0,
            position_size: 0.1,
            max_position_ratio: 0.8,
            holding_period: 15,
            leverage: 1.0,
            contract: ContractSpec::pta(),
            atr_multiplier: 1.5,
            atr_period: 14,
            spread_ma_period: 5,
            enable_spread_ma_stop: true,
            enable_basis_take_profit: true,
            basis_take_profit_threshold: 2.0,
            basis_decline_days: 3,
            basis_min_holding_days: 7,
            enable_dynamic_position: true,
            margin_low_threshold: 350.0,
            margin_high_threshold: 600.0,
            position_multiplier_low: 1.5,
            position_multiplier_high: 0.5,
            trading_days_per_year: 252.0,
        }
    }
}

impl StrategyConfig {
    //validates every bound once, before a run starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital > 0.0) {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        if !(0.0..=1.0).contains(&self.position_size) {
            return Err(ConfigError::RatioOutOfRange {
                name: "position_size",
                value: self.position_size,
            });
        }
        if !(0.0..=1.0).contains(&self.max_position_ratio) {
            return Err(ConfigError::RatioOutOfRange {
                name: "max_position_ratio",
                value: self.max_position_ratio,
            });
        }
        if !(self.contract.min_margin_rate > 0.0 && self.contract.min_margin_rate <= 1.0) {
            return Err(ConfigError::InvalidMarginRate(self.contract.min_margin_rate));
        }
        if !(self.contract.contract_size > 0.0) {
            return Err(ConfigError::NonPositiveContractSize(
                self.contract.contract_size,
            ));
        }
        if self.leverage < 1.0 {
            return Err(ConfigError::LeverageTooLow(self.leverage));
        }
        let max_leverage = self.contract.max_leverage();
        if self.leverage > max_leverage {
            return Err(ConfigError::LeverageTooHigh {
                leverage: self.leverage,
                max: max_leverage,
                min_margin_rate: self.contract.min_margin_rate,
            });
        }
        if self.spread_atr_period < 1 {
            return Err(ConfigError::WindowTooSmall {
                name: "spread_atr_period",
                value: self.spread_atr_period,
            });
        }
        if self.atr_period < 1 {
            return Err(ConfigError::WindowTooSmall {
                name: "atr_period",
                value: self.atr_period,
            });
        }
        if self.spread_ma_period < 1 {
            return Err(ConfigError::WindowTooSmall {
                name: "spread_ma_period",
                value: self.spread_ma_period,
            });
        }
        if self.holding_period < 1 {
            return Err(ConfigError::HoldingPeriodTooShort(self.holding_period));
        }
        Ok(())
    }

    //load configuration from a JSON file
    pub fn from_json_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: StrategyConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(StrategyConfig::default().validate().is_ok());
    }

    #[test]
    fn leverage_above_margin_ceiling_is_rejected() {
        let mut config = StrategyConfig::default();
        //7% minimum margin caps leverage near 14.3
        config.leverage = 20.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LeverageTooHigh { .. })
        ));
    }

    #[test]
    fn leverage_below_one_is_rejected() {
        let mut config = StrategyConfig::default();
        config.leverage = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LeverageTooLow(_))
        ));
    }

    #[test]
    fn position_fraction_bounds_are_enforced() {
        let mut config = StrategyConfig::default();
        config.position_size = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RatioOutOfRange {
                name: "position_size",
                ..
            })
        ));
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut config = StrategyConfig::default();
        config.spread_atr_period = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WindowTooSmall {
                name: "spread_atr_period",
                ..
            })
        ));
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = StrategyConfig::default();
        config.holding_period = 10;
        config.leverage = 3.0;
        config.to_json_file(&path).unwrap();

        let loaded = StrategyConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
