#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

use share_sensei::external::market_data::{HistoryBar, MarketDataError, MarketDataProvider};
use share_sensei::models::CompanyInfo;

/// Deterministic in-memory provider: weekday bars ending on `last_date`.
pub struct StubProvider {
    pub last_date: NaiveDate,
    pub trading_days: usize,
    pub history_error: Option<fn() -> MarketDataError>,
    pub company_error: bool,
    pub empty: bool,
}

impl StubProvider {
    pub fn ending_on(last_date: NaiveDate) -> Self {
        Self {
            last_date,
            trading_days: 520,
            history_error: None,
            company_error: false,
            empty: false,
        }
    }

    pub fn bars(&self) -> Vec<HistoryBar> {
        if self.empty {
            return Vec::new();
        }

        let mut dates = Vec::with_capacity(self.trading_days);
        let mut day = self.last_date;
        while dates.len() < self.trading_days {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                dates.push(day);
            }
            day -= Duration::days(1);
        }
        dates.reverse();

        dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                let x = i as f64;
                let close = 150.0 + 0.05 * x + 3.0 * (x / 9.0).sin();
                HistoryBar {
                    date,
                    open: close - 0.4 + 0.3 * (x / 5.0).cos(),
                    high: close + 1.2 + 0.2 * (x / 7.0).sin(),
                    low: close - 1.1 - 0.25 * (x / 3.0).cos(),
                    close,
                    volume: 1_000_000 + i as u64,
                }
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    async fn fetch_daily_history(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<HistoryBar>, MarketDataError> {
        if let Some(make_error) = self.history_error {
            return Err(make_error());
        }
        Ok(self.bars())
    }

    async fn fetch_company_info(&self, ticker: &str) -> Result<CompanyInfo, MarketDataError> {
        if self.company_error {
            return Err(MarketDataError::BadResponse("Unauthorized".to_string()));
        }
        Ok(CompanyInfo {
            sector: Some("Technology".to_string()),
            summary: Some(format!("{} designs consumer electronics.", ticker)),
            country: Some("United States".to_string()),
            website: Some("https://example.com".to_string()),
            employees: Some(161_000),
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
