use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use std::f64::consts::PI;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::ForecastResult;
use crate::services::feature_service::FeatureFrame;

const RESERVED_NAMES: [&str; 3] = ["ds", "y", "trend"];
/// Diagonal jitter for coefficients that carry no prior
const UNPENALIZED_JITTER: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid regressor name '{name}': {reason}")]
    InvalidRegressor { name: String, reason: &'static str },
    #[error("invalid model setting: {0}")]
    InvalidSetting(String),
    #[error("insufficient training data: {0} rows")]
    InsufficientData(usize),
    #[error("column length mismatch: {0}")]
    ShapeMismatch(String),
    #[error("missing regressor column '{0}'")]
    MissingRegressor(String),
    #[error("unknown regressor column '{0}'")]
    UnknownRegressor(String),
    #[error("non-finite value in {0}")]
    NonFinite(String),
    #[error("normal equations are singular")]
    Singular,
}

/// Periodic component modelled with a truncated Fourier series.
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    pub name: &'static str,
    pub period: f64,
    pub fourier_order: usize,
}

impl Seasonality {
    pub const fn yearly() -> Self {
        Self { name: "yearly", period: 365.25, fourier_order: 10 }
    }

    pub const fn weekly() -> Self {
        Self { name: "weekly", period: 7.0, fourier_order: 3 }
    }

    pub const fn daily() -> Self {
        Self { name: "daily", period: 1.0, fourier_order: 4 }
    }
}

/// Named regressor columns, each aligned with the `ds` slice passed alongside.
pub type RegressorColumns<'a> = [(&'a str, &'a [f64])];

#[derive(Debug, Clone)]
pub struct SeasonalModelBuilder {
    yearly: bool,
    weekly: bool,
    daily: bool,
    n_changepoints: usize,
    changepoint_range: f64,
    changepoint_prior_scale: f64,
    seasonality_prior_scale: f64,
    regressor_prior_scale: f64,
    interval_width: f64,
}

impl Default for SeasonalModelBuilder {
    fn default() -> Self {
        Self {
            yearly: true,
            weekly: true,
            daily: false,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            regressor_prior_scale: 10.0,
            interval_width: 0.80,
        }
    }
}

impl SeasonalModelBuilder {
    pub fn yearly_seasonality(mut self, enabled: bool) -> Self {
        self.yearly = enabled;
        self
    }

    pub fn weekly_seasonality(mut self, enabled: bool) -> Self {
        self.weekly = enabled;
        self
    }

    pub fn daily_seasonality(mut self, enabled: bool) -> Self {
        self.daily = enabled;
        self
    }

    pub fn n_changepoints(mut self, n: usize) -> Self {
        self.n_changepoints = n;
        self
    }

    pub fn changepoint_range(mut self, range: f64) -> Self {
        self.changepoint_range = range;
        self
    }

    pub fn changepoint_prior_scale(mut self, scale: f64) -> Self {
        self.changepoint_prior_scale = scale;
        self
    }

    pub fn seasonality_prior_scale(mut self, scale: f64) -> Self {
        self.seasonality_prior_scale = scale;
        self
    }

    pub fn interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }

    pub fn build(self) -> Result<SeasonalModel, ModelError> {
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ModelError::InvalidSetting(format!(
                "interval_width {} must be in (0, 1)",
                self.interval_width
            )));
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ModelError::InvalidSetting(format!(
                "changepoint_range {} must be in (0, 1]",
                self.changepoint_range
            )));
        }
        for (name, scale) in [
            ("changepoint_prior_scale", self.changepoint_prior_scale),
            ("seasonality_prior_scale", self.seasonality_prior_scale),
        ] {
            if !(scale > 0.0 && scale.is_finite()) {
                return Err(ModelError::InvalidSetting(format!("{} must be positive", name)));
            }
        }

        let mut seasonalities = Vec::new();
        if self.yearly {
            seasonalities.push(Seasonality::yearly());
        }
        if self.weekly {
            seasonalities.push(Seasonality::weekly());
        }
        if self.daily {
            seasonalities.push(Seasonality::daily());
        }

        Ok(SeasonalModel {
            settings: self,
            seasonalities,
            regressors: Vec::new(),
        })
    }
}

/// Additive model: piecewise-linear trend + Fourier seasonalities + linear
/// external regressors, fit by penalized least squares.
#[derive(Debug, Clone)]
pub struct SeasonalModel {
    settings: SeasonalModelBuilder,
    seasonalities: Vec<Seasonality>,
    regressors: Vec<String>,
}

impl SeasonalModel {
    pub fn builder() -> SeasonalModelBuilder {
        SeasonalModelBuilder::default()
    }

    pub fn add_regressor(&mut self, name: impl Into<String>) -> Result<(), ModelError> {
        let name = name.into();
        let reason = if name.trim().is_empty() {
            Some("name is empty")
        } else if RESERVED_NAMES.contains(&name.as_str()) {
            Some("name is reserved")
        } else if self.seasonalities.iter().any(|s| s.name == name) {
            Some("name collides with a seasonality")
        } else if self.regressors.contains(&name) {
            Some("regressor already added")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ModelError::InvalidRegressor { name, reason }),
            None => {
                self.regressors.push(name);
                Ok(())
            }
        }
    }

    pub fn regressors(&self) -> &[String] {
        &self.regressors
    }

    pub fn seasonalities(&self) -> &[Seasonality] {
        &self.seasonalities
    }

    pub fn interval_width(&self) -> f64 {
        self.settings.interval_width
    }

    pub fn fit(
        &self,
        ds: &[NaiveDate],
        y: &[f64],
        columns: &RegressorColumns<'_>,
    ) -> Result<FittedModel, ModelError> {
        let n = ds.len();
        if n < 2 {
            return Err(ModelError::InsufficientData(n));
        }
        if y.len() != n {
            return Err(ModelError::ShapeMismatch(format!("{} dates but {} targets", n, y.len())));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("y".to_string()));
        }

        let regressor_values = self.align_regressors(columns, n)?;

        let days: Vec<f64> = ds.iter().map(|d| days_since_epoch(*d)).collect();
        let t_start = days.iter().cloned().fold(f64::INFINITY, f64::min);
        let t_end = days.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let t_span = if t_end > t_start { t_end - t_start } else { 1.0 };

        let y_scale = y.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let regressor_stats = regressor_values.iter().map(|values| standardization(values)).collect();

        let mut fitted = FittedModel {
            model: self.clone(),
            t_start,
            t_span,
            y_scale,
            changepoints: self.changepoint_locations(&days, t_start, t_span),
            regressor_stats,
            coefficients: Array1::zeros(0),
            sigma: 0.0,
        };

        let x = fitted.design_matrix(&days, &regressor_values);
        let y_scaled = Array1::from_iter(y.iter().map(|v| v / y_scale));

        let mut xtx = x.t().dot(&x);
        for (i, penalty) in fitted.penalties().iter().enumerate() {
            xtx[[i, i]] += penalty;
        }
        let xty = x.t().dot(&y_scaled);
        let beta = cholesky_solve(&xtx, &xty)?;

        let residuals = &y_scaled - &x.dot(&beta);
        fitted.sigma = (residuals.mapv(|r| r * r).sum() / n as f64).sqrt();
        fitted.coefficients = beta;

        debug!(
            "Fitted seasonal model on {} rows with {} columns (sigma={:.6})",
            n,
            x.ncols(),
            fitted.sigma * y_scale
        );

        Ok(fitted)
    }

    /// Regressor values in registration order, checked against `n` rows.
    fn align_regressors(
        &self,
        columns: &RegressorColumns<'_>,
        n: usize,
    ) -> Result<Vec<Vec<f64>>, ModelError> {
        if let Some((name, _)) = columns.iter().find(|(name, _)| !self.regressors.iter().any(|r| r == name)) {
            return Err(ModelError::UnknownRegressor(name.to_string()));
        }

        self.regressors
            .iter()
            .map(|name| {
                let values = columns
                    .iter()
                    .find(|(col, _)| col == name)
                    .map(|(_, values)| *values)
                    .ok_or_else(|| ModelError::MissingRegressor(name.clone()))?;
                if values.len() != n {
                    return Err(ModelError::ShapeMismatch(format!(
                        "regressor '{}' has {} rows, expected {}",
                        name,
                        values.len(),
                        n
                    )));
                }
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(ModelError::NonFinite(name.clone()));
                }
                Ok(values.to_vec())
            })
            .collect()
    }

    /// Uniformly spaced changepoints over the first `changepoint_range` of
    /// the history, in scaled time.
    fn changepoint_locations(&self, days: &[f64], t_start: f64, t_span: f64) -> Vec<f64> {
        let hist_size = (days.len() as f64 * self.settings.changepoint_range).floor() as usize;
        let n_changepoints = self.settings.n_changepoints.min(hist_size.saturating_sub(1));
        if n_changepoints == 0 {
            return Vec::new();
        }

        let mut sorted = days.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let last_index = (hist_size - 1) as f64;
        (1..=n_changepoints)
            .map(|j| {
                let idx = (last_index * j as f64 / n_changepoints as f64).round() as usize;
                (sorted[idx] - t_start) / t_span
            })
            .collect()
    }
}

/// A [`SeasonalModel`] with solved coefficients, ready to predict.
#[derive(Debug, Clone)]
pub struct FittedModel {
    model: SeasonalModel,
    t_start: f64,
    t_span: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    regressor_stats: Vec<(f64, f64)>,
    coefficients: Array1<f64>,
    sigma: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl FittedModel {
    pub fn predict(
        &self,
        ds: &[NaiveDate],
        columns: &RegressorColumns<'_>,
    ) -> Result<Vec<Prediction>, ModelError> {
        let regressor_values = self.model.align_regressors(columns, ds.len())?;
        let days: Vec<f64> = ds.iter().map(|d| days_since_epoch(*d)).collect();
        let x = self.design_matrix(&days, &regressor_values);
        let yhat = x.dot(&self.coefficients);

        let z = normal_quantile(0.5 + self.model.interval_width() / 2.0);
        let half_width = z * self.sigma;

        Ok(ds
            .iter()
            .zip(yhat.iter())
            .map(|(date, y)| Prediction {
                ds: *date,
                yhat: y * self.y_scale,
                yhat_lower: (y - half_width) * self.y_scale,
                yhat_upper: (y + half_width) * self.y_scale,
            })
            .collect())
    }

    /// Training residual standard deviation in the units of `y`.
    pub fn residual_std(&self) -> f64 {
        self.sigma * self.y_scale
    }

    fn n_columns(&self) -> usize {
        2 + self.changepoints.len()
            + self
                .model
                .seasonalities
                .iter()
                .map(|s| 2 * s.fourier_order)
                .sum::<usize>()
            + self.model.regressors.len()
    }

    /// Columns: intercept, slope, changepoint hinges, Fourier terms, regressors.
    fn design_matrix(&self, days: &[f64], regressor_values: &[Vec<f64>]) -> Array2<f64> {
        let mut x = Array2::<f64>::zeros((days.len(), self.n_columns()));

        for (i, day) in days.iter().enumerate() {
            let t = (day - self.t_start) / self.t_span;
            let mut col = 0;

            x[[i, col]] = 1.0;
            x[[i, col + 1]] = t;
            col += 2;

            for s in &self.changepoints {
                x[[i, col]] = (t - s).max(0.0);
                col += 1;
            }

            for season in &self.model.seasonalities {
                for k in 1..=season.fourier_order {
                    let angle = 2.0 * PI * k as f64 * day / season.period;
                    x[[i, col]] = angle.sin();
                    x[[i, col + 1]] = angle.cos();
                    col += 2;
                }
            }

            for (values, (mean, std)) in regressor_values.iter().zip(&self.regressor_stats) {
                x[[i, col]] = (values[i] - mean) / std;
                col += 1;
            }
        }

        x
    }

    /// Ridge penalty per column, `1 / prior_scale^2`.
    fn penalties(&self) -> Array1<f64> {
        let settings = &self.model.settings;
        let mut penalties = Vec::with_capacity(self.n_columns());
        penalties.extend([UNPENALIZED_JITTER, UNPENALIZED_JITTER]);
        penalties.extend(
            std::iter::repeat(1.0 / settings.changepoint_prior_scale.powi(2)).take(self.changepoints.len()),
        );
        for season in &self.model.seasonalities {
            penalties.extend(
                std::iter::repeat(1.0 / settings.seasonality_prior_scale.powi(2))
                    .take(2 * season.fourier_order),
            );
        }
        penalties.extend(
            std::iter::repeat(1.0 / settings.regressor_prior_scale.powi(2)).take(self.model.regressors.len()),
        );
        Array1::from_vec(penalties)
    }
}

fn days_since_epoch(date: NaiveDate) -> f64 {
    (date - NaiveDate::default()).num_days() as f64
}

/// Mean and standard deviation used to standardize a regressor. Binary
/// columns and constant columns are left on their original scale.
fn standardization(values: &[f64]) -> (f64, f64) {
    if values.iter().all(|v| *v == 0.0 || *v == 1.0) {
        return (0.0, 1.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if std > 0.0 {
        (mean, std)
    } else {
        (0.0, 1.0)
    }
}

/// Solve `a x = b` for symmetric positive-definite `a`.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, ModelError> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if !(sum > 0.0 && sum.is_finite()) {
                    return Err(ModelError::Singular);
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }

    Ok(x)
}

/// Inverse of the standard normal CDF (Acklam's rational approximation,
/// relative error below 1.2e-9).
pub fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -normal_quantile(1.0 - p)
    }
}

/// Model with yearly, weekly and daily seasonality and every lag column of
/// `frame` registered as a regressor.
pub fn build_model(frame: &FeatureFrame, interval_width: f64) -> Result<SeasonalModel, ModelError> {
    let mut model = SeasonalModel::builder()
        .yearly_seasonality(true)
        .weekly_seasonality(true)
        .daily_seasonality(true)
        .interval_width(interval_width)
        .build()?;

    for name in frame.regressor_names() {
        model.add_regressor(name)?;
    }
    Ok(model)
}

/// Fit on every row but the last, then forecast the last (synthetic) row.
pub fn train_and_forecast(
    model: &SeasonalModel,
    frame: &FeatureFrame,
) -> Result<ForecastResult, ModelError> {
    let n = frame.len();
    if n < 3 {
        return Err(ModelError::InsufficientData(n.saturating_sub(1)));
    }
    let train = n - 1;

    let train_columns: Vec<(&str, &[f64])> = frame
        .lag_columns
        .iter()
        .map(|c| (c.name.as_str(), &c.values[..train]))
        .collect();
    let fitted = model.fit(&frame.dates[..train], &frame.close[..train], &train_columns)?;

    let target_columns: Vec<(&str, &[f64])> = frame
        .lag_columns
        .iter()
        .map(|c| (c.name.as_str(), &c.values[train..]))
        .collect();
    let prediction = fitted
        .predict(&frame.dates[train..], &target_columns)?
        .into_iter()
        .next()
        .ok_or(ModelError::InsufficientData(0))?;

    info!(
        "Forecast for {}: {:.2} [{:.2}, {:.2}]",
        prediction.ds, prediction.yhat, prediction.yhat_lower, prediction.yhat_upper
    );

    Ok(ForecastResult {
        date: prediction.ds,
        yhat: prediction.yhat,
        yhat_lower: prediction.yhat_lower,
        yhat_upper: prediction.yhat_upper,
        interval_width: model.interval_width(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    fn trend_only() -> SeasonalModel {
        SeasonalModel::builder()
            .yearly_seasonality(false)
            .weekly_seasonality(false)
            .daily_seasonality(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_normal_quantile() {
        assert!((normal_quantile(0.9) - 1.281_551_6).abs() < 1e-6);
        assert!((normal_quantile(0.975) - 1.959_964).abs() < 1e-6);
        assert!(normal_quantile(0.5).abs() < 1e-9);
        assert!((normal_quantile(0.01) + 2.326_348).abs() < 1e-6);
    }

    #[test]
    fn test_builder_rejects_bad_settings() {
        assert!(SeasonalModel::builder().interval_width(1.0).build().is_err());
        assert!(SeasonalModel::builder().interval_width(0.0).build().is_err());
        assert!(SeasonalModel::builder().changepoint_range(0.0).build().is_err());
        assert!(SeasonalModel::builder().seasonality_prior_scale(-1.0).build().is_err());
    }

    #[test]
    fn test_builder_seasonalities() {
        let model = SeasonalModel::builder().daily_seasonality(true).build().unwrap();
        let names: Vec<_> = model.seasonalities().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["yearly", "weekly", "daily"]);
    }

    #[test]
    fn test_add_regressor_validation() {
        let mut model = SeasonalModel::builder().build().unwrap();

        assert!(model.add_regressor("Close_lag_1").is_ok());
        assert!(matches!(
            model.add_regressor("Close_lag_1"),
            Err(ModelError::InvalidRegressor { .. })
        ));
        assert!(model.add_regressor("ds").is_err());
        assert!(model.add_regressor("y").is_err());
        assert!(model.add_regressor("weekly").is_err());
        assert!(model.add_regressor(" ").is_err());
        assert_eq!(model.regressors(), ["Close_lag_1".to_string()]);
    }

    #[test]
    fn test_linear_series_extrapolates() {
        let ds = dates(120);
        let y: Vec<f64> = (0..120).map(|i| 10.0 + 0.5 * i as f64).collect();
        let fitted = trend_only().fit(&ds, &y, &[]).unwrap();

        let next = dates(121)[120];
        let p = fitted.predict(&[next], &[]).unwrap()[0];

        assert!((p.yhat - 70.0).abs() < 1e-3, "yhat was {}", p.yhat);
        assert!(fitted.residual_std() < 1e-3);
    }

    #[test]
    fn test_weekly_pattern_is_learned() {
        let n = 400;
        let ds = dates(n + 1);
        let y: Vec<f64> = ds
            .iter()
            .map(|d| 100.0 + 5.0 * (2.0 * PI * days_since_epoch(*d) / 7.0).sin())
            .collect();

        let model = SeasonalModel::builder().daily_seasonality(true).build().unwrap();
        let fitted = model.fit(&ds[..n], &y[..n], &[]).unwrap();
        let p = fitted.predict(&ds[n..], &[]).unwrap()[0];

        assert!((p.yhat - y[n]).abs() < 0.5, "yhat {} vs {}", p.yhat, y[n]);
    }

    #[test]
    fn test_regressor_drives_prediction() {
        let n = 100;
        let ds = dates(n + 1);
        let x: Vec<f64> = (0..=n).map(|i| ((i * 7) % 11) as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 5.0 + 2.0 * v).collect();

        let mut model = trend_only();
        model.add_regressor("x").unwrap();
        let fitted = model.fit(&ds[..n], &y[..n], &[("x", &x[..n])]).unwrap();
        let p = fitted.predict(&ds[n..], &[("x", &x[n..])]).unwrap()[0];

        assert!((p.yhat - y[n]).abs() < 0.05, "yhat {} vs {}", p.yhat, y[n]);
    }

    #[test]
    fn test_interval_brackets_prediction() {
        let ds = dates(200);
        let y: Vec<f64> = (0..200).map(|i| if i % 2 == 0 { 51.0 } else { 49.0 }).collect();
        let fitted = trend_only().fit(&ds, &y, &[]).unwrap();
        let p = fitted.predict(&dates(201)[200..], &[]).unwrap()[0];

        assert!(p.yhat_lower < p.yhat && p.yhat < p.yhat_upper);
        let implied_sigma = (p.yhat_upper - p.yhat_lower) / (2.0 * normal_quantile(0.9));
        assert!(implied_sigma > 0.5 && implied_sigma < 1.5, "sigma {}", implied_sigma);
    }

    #[test]
    fn test_fit_errors() {
        let model = trend_only();
        let ds = dates(10);

        assert!(matches!(model.fit(&ds[..1], &[1.0], &[]), Err(ModelError::InsufficientData(1))));
        assert!(matches!(model.fit(&ds, &[1.0; 9], &[]), Err(ModelError::ShapeMismatch(_))));

        let mut y = vec![1.0; 10];
        y[3] = f64::NAN;
        assert!(matches!(model.fit(&ds, &y, &[]), Err(ModelError::NonFinite(_))));

        let extra = [1.0; 10];
        assert!(matches!(
            model.fit(&ds, &[1.0; 10], &[("extra", &extra[..])]),
            Err(ModelError::UnknownRegressor(_))
        ));

        let mut with_reg = trend_only();
        with_reg.add_regressor("x").unwrap();
        assert!(matches!(
            with_reg.fit(&ds, &[1.0; 10], &[]),
            Err(ModelError::MissingRegressor(_))
        ));
    }

    #[test]
    fn test_standardization() {
        assert_eq!(standardization(&[0.0, 1.0, 1.0]), (0.0, 1.0));
        assert_eq!(standardization(&[3.0, 3.0]), (0.0, 1.0));
        let (mean, std) = standardization(&[2.0, 4.0]);
        assert_eq!(mean, 3.0);
        assert_eq!(std, 1.0);
    }

    #[test]
    fn test_cholesky_solve() {
        let a = ndarray::arr2(&[[4.0, 2.0], [2.0, 3.0]]);
        let b = ndarray::arr1(&[2.0, 5.0]);
        let x = cholesky_solve(&a, &b).unwrap();
        assert!((x[0] + 0.5).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);

        let singular = ndarray::arr2(&[[1.0, 1.0], [1.0, 1.0]]);
        assert!(matches!(cholesky_solve(&singular, &b), Err(ModelError::Singular)));
    }
}
