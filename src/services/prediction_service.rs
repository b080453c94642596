use chrono::NaiveDate;
use tracing::{error, info};

use crate::config::ForecastConfig;
use crate::errors::AppError;
use crate::external::market_data::MarketDataProvider;
use crate::models::{CompanyInfo, PredictionReport, Ticker};
use crate::services::{chart_service, dataset_service, feature_service, forecasting_service};

/// Run the whole fetch -> features -> fit -> predict -> chart sequence for a
/// single ticker.
pub async fn predict(
    provider: &dyn MarketDataProvider,
    config: &ForecastConfig,
    ticker: &Ticker,
    today: NaiveDate,
) -> Result<PredictionReport, AppError> {
    info!("Generating next-day forecast for {}", ticker);

    let company = fetch_company(provider, ticker).await?;

    let dataset = dataset_service::build_dataset(provider, ticker, config, today).await?;
    let frame = feature_service::create_features(&dataset, config.lag_depth);

    let model = forecasting_service::build_model(&frame, config.interval_width).map_err(|e| {
        error!("Failed to build forecasting model for {}: {}", ticker, e);
        AppError::from(e)
    })?;

    let forecast = forecasting_service::train_and_forecast(&model, &frame).map_err(|e| {
        error!("Failed to fit or predict for {}: {}", ticker, e);
        AppError::from(e)
    })?;

    let plot_image =
        chart_service::render_forecast_chart(dataset.history(), &forecast, config.chart_window)?;

    Ok(PredictionReport {
        ticker: ticker.to_string(),
        company,
        min_date: frame.min_date,
        max_date: frame.max_date,
        forecast,
        plot_image,
        chart_window: config.chart_window,
    })
}

async fn fetch_company(
    provider: &dyn MarketDataProvider,
    ticker: &Ticker,
) -> Result<CompanyInfo, AppError> {
    provider.fetch_company_info(ticker.as_str()).await.map_err(|e| {
        error!("Failed to fetch company info for {}: {}", ticker, e);
        AppError::from(e)
    })
}
