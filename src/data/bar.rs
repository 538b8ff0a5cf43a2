use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarError {
    #[error("Non-finite futures price: {0}")]
    NonFinitePrice(f64),
    #[error("Non-finite lead spread: {0}")]
    NonFiniteLeadSpread(f64),
    #[error("Negative futures price: {0}")]
    NegativePrice(f64),
}

//represents a single trading day of the instrument and its leading indicators
//futures_price is the tradable settlement price, never a cash/spot quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub futures_price: f64,
    pub lead_spread: f64,
    pub processing_margin: Option<f64>,
    pub basis: Option<f64>,
}

impl Bar {
    //creates a new Bar with validation
    pub fn new(
        date: NaiveDate,
        futures_price: f64,
        lead_spread: f64,
        processing_margin: Option<f64>,
        basis: Option<f64>,
    ) -> Result<Self, BarError> {
        //validate the required numeric fields
        if !futures_price.is_finite() {
            return Err(BarError::NonFinitePrice(futures_price));
        }
        if futures_price < 0.0 {
            return Err(BarError::NegativePrice(futures_price));
        }
        if !lead_spread.is_finite() {
            return Err(BarError::NonFiniteLeadSpread(lead_spread));
        }

        Ok(Bar {
            date,
            futures_price,
            lead_spread,
            //optional fields carry only observed finite values
            processing_margin: processing_margin.filter(|v| v.is_finite()),
            basis: basis.filter(|v| v.is_finite()),
        })
    }

    //creates a Bar without validation
    pub fn new_unchecked(
        date: NaiveDate,
        futures_price: f64,
        lead_spread: f64,
        processing_margin: Option<f64>,
        basis: Option<f64>,
    ) -> Self {
        Bar {
            date,
            futures_price,
            lead_spread,
            processing_margin,
            basis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn new_rejects_non_finite_price() {
        let result = Bar::new(date("2024-01-02"), f64::NAN, 100.0, None, None);
        assert!(matches!(result, Err(BarError::NonFinitePrice(_))));
    }

    #[test]
    fn new_rejects_negative_price() {
        let result = Bar::new(date("2024-01-02"), -5000.0, 100.0, None, None);
        assert!(matches!(result, Err(BarError::NegativePrice(_))));
    }

    #[test]
    fn new_drops_non_finite_optionals() {
        let bar = Bar::new(
            date("2024-01-02"),
            5000.0,
            100.0,
            Some(f64::NAN),
            Some(12.0),
        )
        .unwrap();
        assert_eq!(bar.processing_margin, None);
        assert_eq!(bar.basis, Some(12.0));
    }
}
