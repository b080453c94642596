pub mod chart_service;
pub mod dataset_service;
pub mod feature_service;
pub mod forecasting_service;
pub mod prediction_service;
