use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::CompanyInfo;

/// One daily bar as returned by a market-data provider.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("ticker not found: {0}")]
    NotFound(String),

    #[error("rate limited")]
    RateLimited,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars for `ticker` between `start` and `end` (inclusive), oldest first.
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoryBar>, MarketDataError>;

    async fn fetch_company_info(&self, ticker: &str) -> Result<CompanyInfo, MarketDataError>;
}
