use crate::external::market_data::{HistoryBar, MarketDataError, MarketDataProvider};
use crate::models::CompanyInfo;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

/// Yahoo Finance provider. No API key required.
///
/// History comes from the chart v8 endpoint, company metadata from the
/// quoteSummary `assetProfile` module.
pub struct YahooFinanceProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Self {
        Self {
            client: build_client(user_agent),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
        ticker: &str,
    ) -> Result<T, MarketDataError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::NotFound(ticker.to_string()));
        }
        if !status.is_success() {
            return Err(MarketDataError::BadResponse(format!("HTTP {}", status)));
        }

        resp.json::<T>()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    meta: YahooMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct YahooMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    asset_profile: Option<AssetProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    sector: Option<String>,
    long_business_summary: Option<String>,
    country: Option<String>,
    website: Option<String>,
    full_time_employees: Option<u64>,
}

fn parse_chart(body: YahooChartResponse, ticker: &str) -> Result<Vec<HistoryBar>, MarketDataError> {
    if let Some(error) = body.chart.error {
        if error.description.contains("No data found") {
            return Err(MarketDataError::NotFound(ticker.to_string()));
        }
        return Err(MarketDataError::BadResponse(error.description));
    }

    let result = body
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))?;

    let quote = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| MarketDataError::BadResponse("No quote data in response".into()))?;

    let n = result.timestamp.len();
    if quote.close.len() != n || quote.open.len() != n || quote.high.len() != n || quote.low.len() != n {
        return Err(MarketDataError::Parse(
            "Timestamp and price arrays have different lengths".into(),
        ));
    }

    let offset = result.meta.gmtoffset;
    let mut bars: Vec<HistoryBar> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            // Null bars show up on market holidays and halted sessions
            let date = chrono::DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(HistoryBar {
                date,
                open: quote.open[i]?,
                high: quote.high[i]?,
                low: quote.low[i]?,
                close: quote.close[i]?,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect();

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

fn parse_quote_summary(
    body: QuoteSummaryResponse,
    ticker: &str,
) -> Result<CompanyInfo, MarketDataError> {
    if let Some(error) = body.quote_summary.error {
        return Err(MarketDataError::BadResponse(error.description));
    }

    let profile = body
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .and_then(|r| r.asset_profile)
        .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))?;

    Ok(CompanyInfo {
        sector: profile.sector,
        summary: profile.long_business_summary,
        country: profile.country,
        website: profile.website,
        employees: profile.full_time_employees,
    })
}

fn build_client(user_agent: &str) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build Yahoo HTTP client, using defaults without user agent: {}", e);
            reqwest::Client::new()
        })
}

/// Daily chart query for `[start, end)`.
fn chart_query(start: NaiveDate, end: NaiveDate) -> Vec<(&'static str, String)> {
    // period2 is exclusive, so the session still trading on `end` is left out
    vec![
        ("interval", "1d".to_string()),
        ("period1", unix_seconds(start).to_string()),
        ("period2", unix_seconds(end).to_string()),
    ]
}

/// Midnight UTC of `date` as a unix timestamp.
fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoryBar>, MarketDataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        debug!("Fetching Yahoo chart for {} from {} to {}", ticker, start, end);
        let body: YahooChartResponse = self
            .get_json(&url, &chart_query(start, end), ticker)
            .await?;

        let bars = parse_chart(body, ticker)?;
        if bars.is_empty() {
            warn!("Yahoo returned no usable bars for {}", ticker);
            return Err(MarketDataError::NotFound(ticker.to_string()));
        }
        Ok(bars)
    }

    async fn fetch_company_info(&self, ticker: &str) -> Result<CompanyInfo, MarketDataError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, ticker);
        let body: QuoteSummaryResponse = self
            .get_json(&url, &[("modules", "assetProfile".to_string())], ticker)
            .await?;
        parse_quote_summary(body, ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "gmtoffset": -18000 },
                "timestamp": [1704292200, 1704378600, 1704465000],
                "indicators": { "quote": [{
                    "open":   [184.2, null, 181.9],
                    "high":   [185.8, 183.0, 182.7],
                    "low":    [183.4, 180.8, 180.1],
                    "close":  [184.2, 181.9, 181.1],
                    "volume": [58414500, 71983600, null]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_skips_null_bars() {
        let body: YahooChartResponse = serde_json::from_str(CHART).unwrap();
        let bars = parse_chart(body, "AAPL").unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(bars[1].volume, 0);
        assert!((bars[0].close - 184.2).abs() < 1e-9);
    }

    #[test]
    fn test_parse_chart_error_not_found() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let body: YahooChartResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(parse_chart(body, "ZZZZ"), Err(MarketDataError::NotFound(_))));
    }

    #[test]
    fn test_parse_chart_length_mismatch() {
        let json = r#"{"chart":{"result":[{"timestamp":[1,2],"indicators":{"quote":[{"open":[1.0],"high":[1.0],"low":[1.0],"close":[1.0,2.0]}]}}],"error":null}}"#;
        let body: YahooChartResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(parse_chart(body, "X"), Err(MarketDataError::Parse(_))));
    }

    #[test]
    fn test_parse_quote_summary() {
        let json = r#"{"quoteSummary":{"result":[{"assetProfile":{
            "sector":"Technology","country":"United States","website":"https://www.apple.com",
            "fullTimeEmployees":161000,"longBusinessSummary":"Apple Inc. designs smartphones."}}],"error":null}}"#;
        let body: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let info = parse_quote_summary(body, "AAPL").unwrap();

        assert_eq!(info.sector.as_deref(), Some("Technology"));
        assert_eq!(info.employees, Some(161000));
        assert_eq!(info.website.as_deref(), Some("https://www.apple.com"));
    }

    #[test]
    fn test_chart_query_ends_before_today() {
        let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let query = chart_query(start, today);

        let period2 = query.iter().find(|(k, _)| *k == "period2").map(|(_, v)| v.as_str());
        assert_eq!(period2, Some("1704240000"));
        assert!(query.iter().all(|(k, _)| *k != "events"));
    }

    #[test]
    fn test_invalid_user_agent_falls_back() {
        let provider = YahooFinanceProvider::new("https://query1.finance.yahoo.com/", "bad\nagent");
        assert_eq!(provider.base_url, "https://query1.finance.yahoo.com");
    }

    #[test]
    fn test_unix_seconds() {
        let date = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        assert_eq!(unix_seconds(date), 1_262_304_000);
    }
}
