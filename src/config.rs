use chrono::NaiveDate;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_HISTORY_START: &str = "2010-01-01";
pub const DEFAULT_LAG_DEPTH: usize = 12;
pub const DEFAULT_INTERVAL_WIDTH: f64 = 0.80;
pub const DEFAULT_CHART_WINDOW: usize = 365;
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; ShareSensei/0.1)";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings that shape one forecast run
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub history_start: NaiveDate,
    pub lag_depth: usize,
    pub interval_width: f64,
    pub chart_window: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            lag_depth: DEFAULT_LAG_DEPTH,
            interval_width: DEFAULT_INTERVAL_WIDTH,
            chart_window: DEFAULT_CHART_WINDOW,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub yahoo_base_url: String,
    pub yahoo_user_agent: String,
    pub forecast: ForecastConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let history_start = lookup("HISTORY_START")
            .unwrap_or_else(|| DEFAULT_HISTORY_START.to_string());
        let history_start = NaiveDate::parse_from_str(&history_start, "%Y-%m-%d").map_err(|e| {
            ConfigError::Invalid {
                key: "HISTORY_START",
                reason: e.to_string(),
            }
        })?;

        let lag_depth = parse_or("LAG_DEPTH", lookup("LAG_DEPTH"), DEFAULT_LAG_DEPTH)?;
        if !(1..=60).contains(&lag_depth) {
            return Err(ConfigError::Invalid {
                key: "LAG_DEPTH",
                reason: format!("{} is outside 1..=60", lag_depth),
            });
        }

        let interval_width =
            parse_or("INTERVAL_WIDTH", lookup("INTERVAL_WIDTH"), DEFAULT_INTERVAL_WIDTH)?;
        if !(interval_width > 0.0 && interval_width < 1.0) {
            return Err(ConfigError::Invalid {
                key: "INTERVAL_WIDTH",
                reason: format!("{} is outside (0, 1)", interval_width),
            });
        }

        let chart_window = parse_or("CHART_WINDOW", lookup("CHART_WINDOW"), DEFAULT_CHART_WINDOW)?;
        if chart_window == 0 {
            return Err(ConfigError::Invalid {
                key: "CHART_WINDOW",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            yahoo_base_url: lookup("YAHOO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_YAHOO_BASE_URL.to_string()),
            yahoo_user_agent: lookup("YAHOO_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            forecast: ForecastConfig {
                history_start,
                lag_depth,
                interval_width,
                chart_window,
            },
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}
