mod company;
mod forecast;
mod price_point;
mod ticker;

pub use company::CompanyInfo;
pub use forecast::{round2, ForecastResponse, ForecastResult, PredictionReport};
pub use price_point::{Dataset, PriceRow};
pub use ticker::Ticker;
