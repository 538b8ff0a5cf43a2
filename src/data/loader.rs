use crate::data::bar::Bar;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    date: String,
    #[serde(default)]
    futures_price: Option<f64>,
    #[serde(default)]
    lead_spread: Option<f64>,
    #[serde(default)]
    processing_margin: Option<f64>,
    #[serde(default)]
    basis: Option<f64>,
}

//loads bars from a csv file with fixed headers
//date,futures_price,lead_spread,processing_margin,basis
//rows missing a required value are skipped; the series is sorted by date
//with duplicate dates removed (heuristic column discovery is an upstream
//concern and is not handled here)
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut bars = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        //parse the date; a present-but-unparseable date is a hard error
        let date = NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d").context(format!(
            "Failed to parse date '{}' at line {}",
            record.date,
            index + 2
        ))?;

        //a row without both required values carries no tradable information
        let (futures_price, lead_spread) = match (record.futures_price, record.lead_spread) {
            (Some(p), Some(s)) if p.is_finite() && s.is_finite() => (p, s),
            _ => continue,
        };

        bars.push(Bar::new_unchecked(
            date,
            futures_price,
            lead_spread,
            record.processing_margin.filter(|v| v.is_finite()),
            record.basis.filter(|v| v.is_finite()),
        ));
    }

    //sort by date to ensure chronological order
    bars.sort_by(|a, b| a.date.cmp(&b.date));

    //keep the first row of any duplicated date
    bars.dedup_by(|b, a| b.date == a.date);

    Ok(bars)
}
