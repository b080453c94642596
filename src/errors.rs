use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use http::StatusCode;
use thiserror::Error;

use crate::external::market_data::MarketDataError;
use crate::services::forecasting_service::ModelError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("External error: {0}")]
    External(String),
    #[error("Dataset creation failed: {0}")]
    Dataset(String),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Render error: {0}")]
    Render(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::External(_) | AppError::Dataset(_) => StatusCode::BAD_GATEWAY,
            AppError::Model(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        match self {
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (status, headers, "Rate limited").into_response()
            }
            AppError::Validation(msg) | AppError::NotFound(msg) => (status, msg).into_response(),
            AppError::External(msg) | AppError::Dataset(msg) => (status, msg).into_response(),
            // Model and render internals stay out of the response body
            AppError::Model(_) | AppError::Render(_) => {
                (status, "Internal server error").into_response()
            }
        }
    }
}

impl From<MarketDataError> for AppError {
    fn from(value: MarketDataError) -> Self {
        match value {
            MarketDataError::RateLimited => AppError::RateLimited,
            MarketDataError::NotFound(ticker) => {
                AppError::NotFound(format!("No market data found for ticker {}", ticker))
            }
            other => AppError::External(other.to_string()),
        }
    }
}
