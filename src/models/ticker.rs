use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AppError;

const MAX_TICKER_LEN: usize = 15;

/// Upper-cased stock symbol, e.g. `AAPL`, `BRK-B`, `^GSPC`, `SHOP.TO`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("Ticker must not be empty".to_string()));
        }
        if trimmed.len() > MAX_TICKER_LEN {
            return Err(AppError::Validation(format!(
                "Ticker must be at most {} characters",
                MAX_TICKER_LEN
            )));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(AppError::Validation(format!(
                "Ticker contains invalid character '{}'",
                bad
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
