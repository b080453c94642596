use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("LOKI_ENABLED is true but LOKI_URL is not set")]
    MissingLokiUrl,
    #[error("invalid log filter '{0}'")]
    InvalidFilter(String),
    #[cfg(feature = "loki")]
    #[error("loki setup failed: {0}")]
    Loki(String),
    #[error("subscriber already initialized: {0}")]
    Init(String),
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            loki_enabled: false,
            loki_url: None,
            service_name: "share-sensei".to_string(),
            environment: "development".to_string(),
            log_level: "info,tower_http=debug".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            loki_enabled: std::env::var("LOKI_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.loki_enabled),
            loki_url: std::env::var("LOKI_URL").ok().filter(|v| !v.is_empty()),
            service_name: std::env::var("SERVICE_NAME").unwrap_or(defaults.service_name),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    pub fn validate(&self) -> Result<(), LoggingError> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err(LoggingError::MissingLokiUrl);
        }
        self.filter()?;
        Ok(())
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.log_level)
            .map_err(|_| LoggingError::InvalidFilter(self.log_level.clone()))
    }
}

/// Install the global subscriber: console output, plus Loki when enabled and
/// the `loki` feature is compiled in.
pub fn init_logging(config: LoggingConfig) -> Result<(), LoggingError> {
    config.validate()?;

    #[cfg(feature = "loki")]
    {
        if config.loki_enabled {
            if let Some(loki_url) = config.loki_url.clone() {
                return init_with_loki(config, &loki_url);
            }
        }
    }

    tracing_subscriber::registry()
        .with(config.filter()?)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    tracing::info!(
        "Console logging initialized for {} ({})",
        config.service_name,
        config.environment
    );
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(config: LoggingConfig, loki_url: &str) -> Result<(), LoggingError> {
    let url = url::Url::parse(loki_url).map_err(|e| LoggingError::Loki(e.to_string()))?;

    let (loki_layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)
        .and_then(|b| b.label("environment", &config.environment))
        .and_then(|b| b.build_url(url))
        .map_err(|e| LoggingError::Loki(e.to_string()))?;

    // Ships buffered log lines to Loki in the background
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(config.filter()?)
        .with(tracing_subscriber::fmt::layer())
        .with(loki_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    tracing::info!("Loki logging initialized at {}", loki_url);
    Ok(())
}
