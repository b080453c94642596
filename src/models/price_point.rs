use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Ticker;

/// A single daily OHLC row, volume already dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceRow {
    /// Placeholder row for the date being forecast.
    pub fn synthetic(date: NaiveDate) -> Self {
        Self {
            date,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
        }
    }
}

/// Daily history for one ticker. The last row is always the synthetic
/// forecast-target row dated `forecast_date`.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub ticker: Ticker,
    pub rows: Vec<PriceRow>,
    pub forecast_date: NaiveDate,
}

impl Dataset {
    /// Rows with real prices, i.e. everything except the synthetic row.
    pub fn history(&self) -> &[PriceRow] {
        &self.rows[..self.rows.len().saturating_sub(1)]
    }

    pub fn last_trading_date(&self) -> Option<NaiveDate> {
        self.history().last().map(|r| r.date)
    }
}
