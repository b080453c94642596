use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{ForecastResponse, Ticker};
use crate::services::prediction_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:ticker", get(get_forecast))
}

pub async fn get_forecast(
    Path(ticker): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ForecastResponse>, AppError> {
    info!("GET /api/forecast/{} - Generating forecast", ticker);
    let ticker = Ticker::parse(&ticker)?;

    let report = prediction_service::predict(
        state.provider.as_ref(),
        &state.forecast,
        &ticker,
        Utc::now().date_naive(),
    )
    .await
    .map_err(|e| {
        error!("Forecast failed for {}: {}", ticker, e);
        e
    })?;

    Ok(Json(ForecastResponse::from(&report)))
}
