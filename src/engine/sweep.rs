use crate::config::StrategyConfig;
use crate::data::Bar;
use crate::engine::backtest::{BacktestEngine, BacktestResult, EngineError};
use indexmap::IndexMap;
use rayon::prelude::*;

//runs every named configuration against the same bar series
//each run is independent and idempotent, so the sweep fans out across the
//rayon pool; results keep the input order, keyed by configuration name
//any validation failure aborts the whole sweep
pub fn run_sweep(
    bars: &[Bar],
    configs: &[(String, StrategyConfig)],
) -> Result<IndexMap<String, BacktestResult>, EngineError> {
    let results: Result<Vec<_>, EngineError> = configs
        .par_iter()
        .map(|(name, config)| {
            let engine = BacktestEngine::new(config.clone(), bars.to_vec());
            engine.run().map(|result| (name.clone(), result))
        })
        .collect();

    Ok(results?.into_iter().collect())
}
