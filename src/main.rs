use std::sync::Arc;

use tokio::net::TcpListener;

use share_sensei::app;
use share_sensei::config::AppConfig;
use share_sensei::external::yahoo::YahooFinanceProvider;
use share_sensei::logging::{init_logging, LoggingConfig};
use share_sensei::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;
    tracing::info!(
        "Forecasting from {} with {} lags at {:.0}% interval width",
        config.forecast.history_start,
        config.forecast.lag_depth,
        config.forecast.interval_width * 100.0
    );

    let provider = Arc::new(YahooFinanceProvider::new(
        config.yahoo_base_url.clone(),
        &config.yahoo_user_agent,
    ));
    let state = AppState::new(provider, config.forecast.clone());
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Share Sensei running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
