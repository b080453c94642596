use std::sync::Arc;

use crate::config::ForecastConfig;
use crate::external::market_data::MarketDataProvider;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MarketDataProvider>,
    pub forecast: Arc<ForecastConfig>,
}

impl AppState {
    pub fn new(provider: Arc<dyn MarketDataProvider>, forecast: ForecastConfig) -> Self {
        Self {
            provider,
            forecast: Arc::new(forecast),
        }
    }
}
