use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::{debug, error, info};

use crate::config::ForecastConfig;
use crate::errors::AppError;
use crate::external::market_data::{HistoryBar, MarketDataProvider};
use crate::models::{Dataset, PriceRow, Ticker};

/// Fetch the daily history for `ticker` and append the synthetic row for the
/// next trading day.
pub async fn build_dataset(
    provider: &dyn MarketDataProvider,
    ticker: &Ticker,
    config: &ForecastConfig,
    today: NaiveDate,
) -> Result<Dataset, AppError> {
    let bars = provider
        .fetch_daily_history(ticker.as_str(), config.history_start, today)
        .await
        .map_err(|e| {
            error!("Failed to fetch price history for {}: {}", ticker, e);
            AppError::from(e)
        })?;

    let rows = normalize_bars(completed_bars(bars, today));
    if rows.is_empty() {
        error!("No usable price rows for {}", ticker);
        return Err(AppError::Dataset(format!("No usable price history for {}", ticker)));
    }

    Ok(with_forecast_row(ticker.clone(), rows))
}

/// Keep only sessions that closed before `today`; a bar dated today is still
/// in progress.
pub fn completed_bars(bars: Vec<HistoryBar>, today: NaiveDate) -> Vec<HistoryBar> {
    let total = bars.len();
    let completed: Vec<HistoryBar> = bars.into_iter().filter(|b| b.date < today).collect();
    if completed.len() < total {
        debug!("Dropped {} in-progress bar(s) dated {} or later", total - completed.len(), today);
    }
    completed
}

/// Drop volume, discard non-finite bars and keep one row per date (the last
/// one seen), oldest first.
pub fn normalize_bars(bars: Vec<HistoryBar>) -> Vec<PriceRow> {
    let mut rows: Vec<PriceRow> = bars
        .into_iter()
        .filter(|b| [b.open, b.high, b.low, b.close].iter().all(|v| v.is_finite()))
        .map(|b| PriceRow {
            date: b.date,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
        })
        .collect();

    rows.sort_by_key(|r| r.date);

    let mut deduped: Vec<PriceRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match deduped.last_mut() {
            Some(last) if last.date == row.date => *last = row,
            _ => deduped.push(row),
        }
    }
    deduped
}

/// Append the synthetic forecast row to a non-empty, date-sorted history.
pub fn with_forecast_row(ticker: Ticker, mut rows: Vec<PriceRow>) -> Dataset {
    let present_date = rows.last().map(|r| r.date).unwrap_or_default();
    let forecast_date = next_forecast_date(present_date);

    info!("Present date for {}: {}", ticker, present_date);
    info!("Valid forecast date for {}: {}", ticker, forecast_date);

    rows.push(PriceRow::synthetic(forecast_date));
    Dataset {
        ticker,
        rows,
        forecast_date,
    }
}

/// Next weekday after `last`. Friday and Saturday roll to Monday.
pub fn next_forecast_date(last: NaiveDate) -> NaiveDate {
    match last.weekday() {
        Weekday::Fri => last + Duration::days(3),
        Weekday::Sat => last + Duration::days(2),
        _ => last + Duration::days(1),
    }
}
