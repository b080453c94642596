//! Share Sensei: next-trading-day stock close forecasts served over HTTP.

pub mod app;
pub mod config;
pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;
