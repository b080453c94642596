use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CompanyInfo;

/// Point forecast and uncertainty interval for one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub interval_width: f64, // e.g., 0.80 for 80%
}

impl ForecastResult {
    /// Half-width of the uncertainty interval.
    pub fn bound(&self) -> f64 {
        (self.yhat_upper - self.yhat_lower) / 2.0
    }
}

/// Everything the forecast page shows for a ticker
#[derive(Debug, Clone)]
pub struct PredictionReport {
    pub ticker: String,
    pub company: CompanyInfo,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub forecast: ForecastResult,
    pub plot_image: String,
    pub chart_window: usize,
}

impl PredictionReport {
    pub fn rounded_forecast(&self) -> f64 {
        round2(self.forecast.yhat)
    }

    pub fn rounded_bound(&self) -> f64 {
        round2(self.forecast.bound())
    }
}

/// JSON body for `GET /api/forecast/:ticker`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub ticker: String,
    pub forecast_date: NaiveDate,
    pub forecast: f64,
    pub lower: f64,
    pub upper: f64,
    pub interval_width: f64,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub company: CompanyInfo,
}

impl From<&PredictionReport> for ForecastResponse {
    fn from(report: &PredictionReport) -> Self {
        Self {
            ticker: report.ticker.clone(),
            forecast_date: report.forecast.date,
            forecast: round2(report.forecast.yhat),
            lower: round2(report.forecast.yhat_lower),
            upper: round2(report.forecast.yhat_upper),
            interval_width: report.forecast.interval_width,
            min_date: report.min_date,
            max_date: report.max_date,
            company: report.company.clone(),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ForecastResult {
        ForecastResult {
            date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            yhat: 181.456,
            yhat_lower: 178.0,
            yhat_upper: 185.0,
            interval_width: 0.8,
        }
    }

    #[test]
    fn test_bound_is_half_interval() {
        assert!((sample().bound() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(181.456), 181.46);
        assert_eq!(round2(-0.004), -0.0);
    }
}
