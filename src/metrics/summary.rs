use crate::metrics::timeseries::{calculate_returns, max_drawdown_pct};
use crate::portfolio::TradeRecord;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary statistics derived from the equity curve and trade log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub initial_equity: f64,
    pub final_equity: f64,
    pub total_return_pct: f64,
    //non-positive; the worst observed loss from a peak
    pub max_drawdown_pct: f64,
    pub num_trades: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    //average win over average loss magnitude; infinite when nothing lost
    pub payoff_ratio: f64,
    pub sharpe_ratio: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from the equity curve and trade log
    pub fn from_backtest(
        equity_curve: &[f64],
        trades: &[TradeRecord],
        trading_days_per_year: f64,
    ) -> Self {
        let initial_equity = equity_curve.first().copied().unwrap_or(0.0);
        let final_equity = equity_curve.last().copied().unwrap_or(initial_equity);

        let total_return_pct = if initial_equity != 0.0 {
            (final_equity / initial_equity - 1.0) * 100.0
        } else {
            0.0
        };

        let max_dd = max_drawdown_pct(equity_curve);
        let trade_stats = calculate_trade_statistics(trades);
        let sharpe = calculate_sharpe_ratio(equity_curve, trading_days_per_year);

        SummaryMetrics {
            initial_equity,
            final_equity,
            total_return_pct,
            max_drawdown_pct: max_dd,
            num_trades: trade_stats.num_trades,
            num_winning_trades: trade_stats.num_winning_trades,
            num_losing_trades: trade_stats.num_losing_trades,
            win_rate: trade_stats.win_rate,
            avg_win: trade_stats.avg_win,
            avg_loss: trade_stats.avg_loss,
            payoff_ratio: trade_stats.payoff_ratio,
            sharpe_ratio: sharpe,
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Initial Equity"),
            Cell::new(&format!("{:.2}", self.initial_equity)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Final Equity"),
            Cell::new(&format!("{:.2}", self.final_equity)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Total Return"),
            Cell::new(&format!("{:.2}%", self.total_return_pct)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Max Drawdown"),
            Cell::new(&format!("{:.2}%", self.max_drawdown_pct)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Number of Trades"),
            Cell::new(&format!("{}", self.num_trades)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Win Rate"),
            Cell::new(&format!("{:.2}%", self.win_rate * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Win"),
            Cell::new(&format!("{:.2}", self.avg_win)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Loss"),
            Cell::new(&format!("{:.2}", self.avg_loss)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Payoff Ratio"),
            Cell::new(&format!("{:.3}", self.payoff_ratio)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Sharpe Ratio"),
            Cell::new(&format!("{:.3}", self.sharpe_ratio)),
        ]));

        table.printstd();
    }
}

struct TradeStats {
    num_trades: usize,
    num_winning_trades: usize,
    num_losing_trades: usize,
    win_rate: f64,
    avg_win: f64,
    avg_loss: f64,
    payoff_ratio: f64,
}

fn calculate_trade_statistics(trades: &[TradeRecord]) -> TradeStats {
    if trades.is_empty() {
        return TradeStats {
            num_trades: 0,
            num_winning_trades: 0,
            num_losing_trades: 0,
            win_rate: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            payoff_ratio: 0.0,
        };
    }

    let winners: Vec<f64> = trades.iter().map(|t| t.pnl).filter(|&p| p > 0.0).collect();
    //a zero-pnl trade counts against the payoff denominator
    let losers: Vec<f64> = trades.iter().map(|t| t.pnl).filter(|&p| p <= 0.0).collect();

    let win_rate = winners.len() as f64 / trades.len() as f64;

    let avg_win = if winners.is_empty() {
        0.0
    } else {
        winners.iter().sum::<f64>() / winners.len() as f64
    };

    let avg_loss = if losers.is_empty() {
        0.0
    } else {
        losers.iter().sum::<f64>() / losers.len() as f64
    };

    let payoff_ratio = if avg_loss != 0.0 {
        (avg_win / avg_loss).abs()
    } else {
        f64::INFINITY
    };

    TradeStats {
        num_trades: trades.len(),
        num_winning_trades: winners.len(),
        num_losing_trades: losers.len(),
        win_rate,
        avg_win,
        avg_loss,
        payoff_ratio,
    }
}

//annualized mean-over-volatility of the equity returns
//short or flat series report 0 rather than failing
fn calculate_sharpe_ratio(equity_curve: &[f64], trading_days_per_year: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns = calculate_returns(equity_curve);
    let mean = (&returns).mean();
    let std_dev = (&returns).std_dev();

    if !(std_dev > 0.0) || !mean.is_finite() {
        return 0.0;
    }

    (mean / std_dev) * trading_days_per_year.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{ExitReason, Side};
    use chrono::NaiveDate;

    fn trade(pnl: f64) -> TradeRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        TradeRecord {
            entry_date: date,
            exit_date: date,
            side: Side::Long,
            entry_price: 5000.0,
            exit_price: 5000.0,
            contracts: 1,
            pnl,
            pnl_pct: 0.0,
            holding_days: 1,
            exit_reason: ExitReason::HoldingPeriodExpired,
            commission: 6.6,
        }
    }

    #[test]
    fn total_return_and_drawdown_come_from_the_curve() {
        let equity = [100_000.0, 110_000.0, 99_000.0, 120_000.0];
        let metrics = SummaryMetrics::from_backtest(&equity, &[], 252.0);

        assert!((metrics.total_return_pct - 20.0).abs() < 1e-9);
        assert!((metrics.max_drawdown_pct + 10.0).abs() < 1e-9);
        assert!(metrics.max_drawdown_pct <= 0.0);
    }

    #[test]
    fn zero_trades_report_zero_rates_not_errors() {
        let metrics = SummaryMetrics::from_backtest(&[100.0, 100.0], &[], 252.0);
        assert_eq!(metrics.num_trades, 0);
        assert_eq!(metrics.win_rate, 0.0);
        assert_eq!(metrics.payoff_ratio, 0.0);
    }

    #[test]
    fn win_rate_counts_strict_winners() {
        let trades = vec![trade(500.0), trade(-200.0), trade(0.0), trade(300.0)];
        let metrics = SummaryMetrics::from_backtest(&[100.0, 101.0], &trades, 252.0);

        assert_eq!(metrics.num_winning_trades, 2);
        assert_eq!(metrics.num_losing_trades, 2);
        assert!((metrics.win_rate - 0.5).abs() < 1e-12);
        assert!((metrics.avg_win - 400.0).abs() < 1e-9);
        assert!((metrics.avg_loss + 100.0).abs() < 1e-9);
        assert!((metrics.payoff_ratio - 4.0).abs() < 1e-9);
    }

    #[test]
    fn no_losses_report_an_unbounded_payoff() {
        let trades = vec![trade(500.0), trade(300.0)];
        let metrics = SummaryMetrics::from_backtest(&[100.0, 101.0], &trades, 252.0);
        assert!(metrics.payoff_ratio.is_infinite());
    }

    #[test]
    fn flat_equity_reports_zero_sharpe() {
        let metrics = SummaryMetrics::from_backtest(&[100.0; 10], &[], 252.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
    }

    #[test]
    fn short_series_reports_zero_sharpe() {
        let metrics = SummaryMetrics::from_backtest(&[100.0], &[], 252.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
    }

    #[test]
    fn unevenly_rising_equity_has_positive_sharpe() {
        //growth varies bar to bar, so the return series has real variance
        let equity: Vec<f64> = (0..20)
            .map(|i: i32| 100_000.0 + (i * i) as f64 * 50.0)
            .collect();
        let metrics = SummaryMetrics::from_backtest(&equity, &[], 252.0);
        assert!(metrics.sharpe_ratio > 0.0);
    }
}
