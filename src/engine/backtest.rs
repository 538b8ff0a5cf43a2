use crate::config::{ConfigError, StrategyConfig};
use crate::data::Bar;
use crate::engine::sizing::size_position;
use crate::indicators::{rolling_true_range_mean, simple_moving_average};
use crate::metrics::SummaryMetrics;
use crate::portfolio::{ExitReason, Position, Side, TradeRecord};
use crate::signal::generate_signals;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("empty bar series")]
    EmptySeries,
    #[error("bar dates must be strictly increasing: {prev} then {next}")]
    NonMonotonicDates { prev: NaiveDate, next: NaiveDate },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

//result bundle of one backtest run
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub summary: SummaryMetrics,
    //account value per bar plus the initial seed, length = bars + 1
    pub equity_curve: Vec<f64>,
    pub trades: Vec<TradeRecord>,
}

//walks the daily series once, holding at most one open position
//exit conditions are evaluated before entries, and an entry only ever acts
//on the previous bar's signal
pub struct BacktestEngine {
    config: StrategyConfig,
    bars: Vec<Bar>,
}

impl BacktestEngine {
    pub fn new(config: StrategyConfig, bars: Vec<Bar>) -> Self {
        BacktestEngine { config, bars }
    }

    //validates inputs once, then runs the simulation
    pub fn run(&self) -> Result<BacktestResult, EngineError> {
        self.config.validate()?;
        if self.bars.is_empty() {
            return Err(EngineError::EmptySeries);
        }
        for pair in self.bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(EngineError::NonMonotonicDates {
                    prev: pair[0].date,
                    next: pair[1].date,
                });
            }
        }

        let prices: Vec<f64> = self.bars.iter().map(|b| b.futures_price).collect();
        let spreads: Vec<f64> = self.bars.iter().map(|b| b.lead_spread).collect();

        let volatility_atr = rolling_true_range_mean(&prices, self.config.atr_period);
        let spread_ma = simple_moving_average(&spreads, self.config.spread_ma_period);
        let signals = generate_signals(&self.bars, &self.config);

        let mut capital = self.config.initial_capital;
        let mut equity_curve = Vec::with_capacity(self.bars.len() + 1);
        equity_curve.push(capital);
        let mut trades = Vec::new();
        let mut open_position: Option<Position> = None;

        for (i, bar) in self.bars.iter().enumerate() {
            let flat_at_bar_start = open_position.is_none();

            //exit conditions come first, in a fixed priority order
            if let Some(position) = open_position.as_mut() {
                position.record_basis(bar.basis);
            }
            if let Some(reason) = open_position
                .as_ref()
                .and_then(|position| self.exit_reason(position, bar, spread_ma[i]))
            {
                let position = open_position.take().unwrap();
                let trade = self.close_position(&position, bar.date, bar.futures_price, reason);
                capital += trade.pnl;
                trades.push(trade);
            }

            //an entry is only attempted when the bar began flat: the prior
            //bar's signal drives it, never this bar's exit
            if flat_at_bar_start && open_position.is_none() && i > 0 {
                let side = if signals[i - 1].long {
                    Some(Side::Long)
                } else if signals[i - 1].short {
                    Some(Side::Short)
                } else {
                    None
                };

                if let Some(side) = side {
                    open_position =
                        self.try_open(side, bar, capital, volatility_atr[i]);
                }
            }

            //mark the account: realized capital plus any open unrealized pnl,
            //commission deferred to realization
            let unrealized = open_position
                .as_ref()
                .map(|p| p.unrealized_pnl(bar.futures_price, &self.config.contract))
                .unwrap_or(0.0);
            equity_curve.push(capital + unrealized);
        }

        //a position still open when the data ends is force-closed at the
        //last available price
        if let Some(position) = open_position.take() {
            let last_bar = self.bars.last().unwrap();
            let trade = self.close_position(
                &position,
                last_bar.date,
                last_bar.futures_price,
                ExitReason::EndOfData,
            );
            capital += trade.pnl;
            trades.push(trade);
        }

        let summary = SummaryMetrics::from_backtest(
            &equity_curve,
            &trades,
            self.config.trading_days_per_year,
        );

        Ok(BacktestResult {
            summary,
            equity_curve,
            trades,
        })
    }

    //first true condition wins: holding horizon, then the price stop, then
    //the spread trend stop, then the basis take-profit
    fn exit_reason(&self, position: &Position, bar: &Bar, spread_ma: f64) -> Option<ExitReason> {
        let holding_days = position.holding_days(bar.date);

        if holding_days >= self.config.holding_period {
            return Some(ExitReason::HoldingPeriodExpired);
        }

        if position.stop_breached(bar.futures_price) {
            return Some(ExitReason::PriceStop);
        }

        if self.config.enable_spread_ma_stop && spread_ma.is_finite() {
            let trend_broken = match position.side {
                Side::Long => bar.lead_spread < spread_ma,
                Side::Short => bar.lead_spread > spread_ma,
            };
            if trend_broken {
                return Some(ExitReason::SpreadMaStop);
            }
        }

        if self.config.enable_basis_take_profit
            && holding_days >= self.config.basis_min_holding_days
            && position.unrealized_pnl_pct(bar.futures_price, &self.config.contract)
                > self.config.basis_take_profit_threshold
            && bar.basis.is_some()
            && position.basis_run_against(self.config.basis_decline_days)
        {
            return Some(ExitReason::BasisTakeProfit);
        }

        None
    }

    //attempts an entry at the current bar's price; zero-contract sizing
    //leaves the engine flat without error
    fn try_open(&self, side: Side, bar: &Bar, capital: f64, atr: f64) -> Option<Position> {
        let size = size_position(capital, bar.futures_price, bar.processing_margin, &self.config)?;

        let stop_price = match side {
            Side::Long => bar.futures_price - self.config.atr_multiplier * atr,
            Side::Short => bar.futures_price + self.config.atr_multiplier * atr,
        };

        Some(Position::open(
            side,
            bar.date,
            bar.futures_price,
            bar.lead_spread,
            stop_price,
            size.contracts,
            size.committed_margin,
            bar.basis,
        ))
    }

    //realizes a position into a trade record, commission included
    fn close_position(
        &self,
        position: &Position,
        exit_date: NaiveDate,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> TradeRecord {
        let commission = self.config.contract.round_trip_commission(
            position.entry_price,
            exit_price,
            position.contracts,
        );
        let pnl = position.unrealized_pnl(exit_price, &self.config.contract) - commission;
        let pnl_pct = if position.committed_margin > 0.0 {
            pnl / position.committed_margin * 100.0
        } else {
            0.0
        };

        TradeRecord {
            entry_date: position.entry_date,
            exit_date,
            side: position.side,
            entry_price: position.entry_price,
            exit_price,
            contracts: position.contracts,
            pnl,
            pnl_pct,
            holding_days: position.holding_days(exit_date),
            exit_reason,
            commission,
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }
}
