use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::Ticker;
use crate::services::prediction_service;
use crate::state::AppState;
use crate::views;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/home", get(home))
        .route("/predict", get(predict_query).post(predict_form))
        .route("/health", get(health))
}

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    pub ticker: Option<String>,
}

async fn health() -> &'static str {
    "OK"
}

async fn home() -> Html<String> {
    info!("GET / - Rendering landing page");
    Html(views::render_index())
}

async fn predict_form(
    State(state): State<AppState>,
    Form(params): Form<PredictParams>,
) -> Result<Html<String>, AppError> {
    info!("POST /predict - ticker={:?}", params.ticker);
    render_prediction(&state, params).await
}

async fn predict_query(
    State(state): State<AppState>,
    Query(params): Query<PredictParams>,
) -> Result<Html<String>, AppError> {
    info!("GET /predict - ticker={:?}", params.ticker);
    render_prediction(&state, params).await
}

async fn render_prediction(
    state: &AppState,
    params: PredictParams,
) -> Result<Html<String>, AppError> {
    let raw = params
        .ticker
        .ok_or_else(|| AppError::Validation("Missing form field 'ticker'".to_string()))?;
    let ticker = Ticker::parse(&raw)?;

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

    Ok(Html(views::render_output(&report)))
}
