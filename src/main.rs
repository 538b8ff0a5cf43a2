use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pozole::prelude::*;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pozole")]
#[command(about = "A Rust-based backtesting engine for spread-led futures strategies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a single backtest
    Run {
        //path to csv data file
        #[arg(long)]
        data: PathBuf,

        //optional json configuration file; defaults apply otherwise
        #[arg(long)]
        config: Option<PathBuf>,

        //initial account capital
        #[arg(long)]
        capital: Option<f64>,

        //leverage factor
        #[arg(long)]
        leverage: Option<f64>,

        //maximum holding horizon in days
        #[arg(long)]
        holding_period: Option<i64>,

        //volatility multiplier for the entry threshold
        #[arg(long)]
        spread_atr_multiplier: Option<f64>,

        //stop distance in price-atr multiples
        #[arg(long)]
        atr_multiplier: Option<f64>,

        //per-trade fraction of the margin pool
        #[arg(long)]
        position_size: Option<f64>,

        //output path for trades csv
        #[arg(long)]
        output_trades_csv: Option<PathBuf>,

        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,
    },

    //run several named configurations over the same data
    Sweep {
        //path to csv data file
        #[arg(long)]
        data: PathBuf,

        //json file holding an ordered list of {name, config} entries
        #[arg(long)]
        configs: PathBuf,
    },
}

//one entry of the sweep configuration file
#[derive(Debug, Deserialize)]
struct NamedConfig {
    name: String,
    config: StrategyConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            config,
            capital,
            leverage,
            holding_period,
            spread_atr_multiplier,
            atr_multiplier,
            position_size,
            output_trades_csv,
            output_equity_csv,
        } => {
            let mut strategy_config = match config {
                Some(path) => StrategyConfig::from_json_file(&path)
                    .context(format!("Failed to load config from {:?}", path))?,
                None => StrategyConfig::default(),
            };

            //scalar overrides beat the file values
            if let Some(value) = capital {
                strategy_config.initial_capital = value;
            }
            if let Some(value) = leverage {
                strategy_config.leverage = value;
            }
            if let Some(value) = holding_period {
                strategy_config.holding_period = value;
            }
            if let Some(value) = spread_atr_multiplier {
                strategy_config.spread_atr_multiplier = value;
            }
            if let Some(value) = atr_multiplier {
                strategy_config.atr_multiplier = value;
            }
            if let Some(value) = position_size {
                strategy_config.position_size = value;
            }

            run_backtest(
                data,
                strategy_config,
                output_trades_csv,
                output_equity_csv,
            )?;
        }
        Commands::Sweep { data, configs } => {
            run_parameter_sweep(data, configs)?;
        }
    }

    Ok(())
}

fn run_backtest(
    data_path: PathBuf,
    config: StrategyConfig,
    output_trades_csv: Option<PathBuf>,
    output_equity_csv: Option<PathBuf>,
) -> Result<()> {
    println!("Pozole Futures Backtesting Engine");
    println!("=================================\n");

    //load data
    println!("Loading data from {:?}...", data_path);
    let bars =
        load_csv(&data_path).context(format!("Failed to load data from {:?}", data_path))?;

    if bars.is_empty() {
        anyhow::bail!("No usable rows found in {:?}", data_path);
    }

    println!("Loaded {} bars", bars.len());
    println!(
        "Date range: {} to {}\n",
        bars.first().unwrap().date,
        bars.last().unwrap().date
    );

    println!(
        "Contract: {} (size: {}, min margin rate: {})",
        config.contract.symbol, config.contract.contract_size, config.contract.min_margin_rate
    );
    println!("Initial capital: {:.2}", config.initial_capital);
    println!("Leverage: {:.1}x", config.leverage);
    println!("Holding period: {} days", config.holding_period);
    println!(
        "Margin filter: {}",
        if config.enable_margin_filter {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "Basis take-profit: {}\n",
        if config.enable_basis_take_profit {
            "enabled"
        } else {
            "disabled"
        }
    );

    //run backtest
    println!("Running backtest...\n");
    let engine = BacktestEngine::new(config, bars);
    let result = engine.run()?;

    //display results
    println!("Backtest Results");
    println!("================\n");
    println!("Run completed, {} trades\n", result.trades.len());
    result.summary.pretty_print_table();

    //save outputs if requested
    if let Some(trades_path) = output_trades_csv {
        save_trades_csv(&result.trades, &trades_path)?;
        println!("\nTrades saved to {:?}", trades_path);
    }

    if let Some(equity_path) = output_equity_csv {
        save_equity_csv(&result.equity_curve, &equity_path)?;
        println!("Equity curve saved to {:?}", equity_path);
    }

    Ok(())
}

fn run_parameter_sweep(data_path: PathBuf, configs_path: PathBuf) -> Result<()> {
    println!("Pozole Parameter Sweep");
    println!("======================\n");

    let bars =
        load_csv(&data_path).context(format!("Failed to load data from {:?}", data_path))?;
    println!("Loaded {} bars", bars.len());

    let contents = std::fs::read_to_string(&configs_path)
        .context(format!("Failed to read sweep file {:?}", configs_path))?;
    let named: Vec<NamedConfig> = serde_json::from_str(&contents)
        .context(format!("Failed to parse sweep file {:?}", configs_path))?;

    let configs: Vec<(String, StrategyConfig)> = named
        .into_iter()
        .map(|entry| (entry.name, entry.config))
        .collect();

    println!("Running {} configurations...\n", configs.len());
    let results = run_sweep(&bars, &configs)?;

    let mut table = prettytable::Table::new();
    table.add_row(prettytable::Row::new(vec![
        prettytable::Cell::new("Config"),
        prettytable::Cell::new("Trades"),
        prettytable::Cell::new("Return %"),
        prettytable::Cell::new("Max DD %"),
        prettytable::Cell::new("Win Rate"),
        prettytable::Cell::new("Sharpe"),
    ]));

    for (name, result) in &results {
        let summary = &result.summary;
        table.add_row(prettytable::Row::new(vec![
            prettytable::Cell::new(name),
            prettytable::Cell::new(&format!("{}", summary.num_trades)),
            prettytable::Cell::new(&format!("{:.2}", summary.total_return_pct)),
            prettytable::Cell::new(&format!("{:.2}", summary.max_drawdown_pct)),
            prettytable::Cell::new(&format!("{:.2}%", summary.win_rate * 100.0)),
            prettytable::Cell::new(&format!("{:.3}", summary.sharpe_ratio)),
        ]));
    }

    table.printstd();

    Ok(())
}

fn save_trades_csv(trades: &[TradeRecord], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(
        file,
        "entry_date,exit_date,side,entry_price,exit_price,contracts,pnl,pnl_pct,holding_days,exit_reason,commission"
    )?;

    for trade in trades {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{}",
            trade.entry_date,
            trade.exit_date,
            trade.side.as_str(),
            trade.entry_price,
            trade.exit_price,
            trade.contracts,
            trade.pnl,
            trade.pnl_pct,
            trade.holding_days,
            trade.exit_reason,
            trade.commission
        )?;
    }

    Ok(())
}

fn save_equity_csv(equity_curve: &[f64], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let drawdowns = drawdown_series(equity_curve);

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "index,equity,drawdown_pct")?;

    for (i, (equity, drawdown)) in equity_curve.iter().zip(drawdowns.iter()).enumerate() {
        writeln!(file, "{},{},{}", i, equity, drawdown)?;
    }

    Ok(())
}
