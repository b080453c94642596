use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::{Dataset, PriceRow};

/// Price columns that get lagged, in column order.
pub const LAGGED_COLUMNS: [PriceColumn; 4] = [
    PriceColumn::Close,
    PriceColumn::Open,
    PriceColumn::High,
    PriceColumn::Low,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceColumn {
    Close,
    Open,
    High,
    Low,
}

impl PriceColumn {
    pub fn name(&self) -> &'static str {
        match self {
            PriceColumn::Close => "Close",
            PriceColumn::Open => "Open",
            PriceColumn::High => "High",
            PriceColumn::Low => "Low",
        }
    }

    fn value(&self, row: &PriceRow) -> f64 {
        match self {
            PriceColumn::Close => row.close,
            PriceColumn::Open => row.open,
            PriceColumn::High => row.high,
            PriceColumn::Low => row.low,
        }
    }
}

pub fn lag_column_name(column: PriceColumn, lag: usize) -> String {
    format!("{}_lag_{}", column.name(), lag)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LagColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// Borrowed view of one row of a [`FeatureFrame`].
#[derive(Debug, Clone)]
pub struct FeatureRow<'a> {
    pub date: NaiveDate,
    pub close: f64,
    pub lags: Vec<(&'a str, f64)>,
}

impl FeatureRow<'_> {
    pub fn lag(&self, name: &str) -> Option<f64> {
        self.lags.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

/// Columnar feature set: date, close and the imputed lag columns. Open, high
/// and low are gone by the time a frame exists.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub lag_columns: Vec<LagColumn>,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn regressor_names(&self) -> Vec<String> {
        self.lag_columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.lag_columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn row(&self, i: usize) -> Option<FeatureRow<'_>> {
        if i >= self.len() {
            return None;
        }
        Some(FeatureRow {
            date: self.dates[i],
            close: self.close[i],
            lags: self
                .lag_columns
                .iter()
                .map(|c| (c.name.as_str(), c.values[i]))
                .collect(),
        })
    }
}

/// Shift every price column by 1..=`lag_depth` rows, fill the undefined
/// leading cells with 0 and record the displayable date range.
pub fn create_features(dataset: &Dataset, lag_depth: usize) -> FeatureFrame {
    let rows = &dataset.rows;

    let mut lag_columns = Vec::with_capacity(lag_depth * LAGGED_COLUMNS.len());
    for lag in 1..=lag_depth {
        for column in LAGGED_COLUMNS {
            lag_columns.push(LagColumn {
                name: lag_column_name(column, lag),
                values: impute_missing(&shift(rows, column, lag)),
            });
        }
    }

    let min_date = rows.first().map(|r| r.date).unwrap_or_default();
    // last row is the synthetic one
    let max_date = rows
        .last()
        .map(|r| r.date - Duration::days(1))
        .unwrap_or_default();

    debug!(
        "Built {} lag columns over {} rows for {}",
        lag_columns.len(),
        rows.len(),
        dataset.ticker
    );

    FeatureFrame {
        dates: rows.iter().map(|r| r.date).collect(),
        close: rows.iter().map(|r| r.close).collect(),
        lag_columns,
        min_date,
        max_date,
    }
}

/// `out[i] = column[i - lag]`, `None` for the first `lag` rows.
fn shift(rows: &[PriceRow], column: PriceColumn, lag: usize) -> Vec<Option<f64>> {
    (0..rows.len())
        .map(|i| i.checked_sub(lag).map(|j| column.value(&rows[j])))
        .collect()
}

fn impute_missing(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ticker;
    use crate::services::dataset_service::with_forecast_row;

    fn dataset(n: usize) -> Dataset {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = (0..n)
            .map(|i| PriceRow {
                date: start + Duration::days(i as i64),
                open: 100.0 + i as f64,
                high: 200.0 + i as f64,
                low: 50.0 + i as f64,
                close: 150.0 + i as f64,
            })
            .collect();
        with_forecast_row(Ticker::parse("TEST").unwrap(), rows)
    }

    #[test]
    fn test_lag_names_and_order() {
        let frame = create_features(&dataset(20), 12);
        let names = frame.regressor_names();

        assert_eq!(names.len(), 48);
        assert_eq!(&names[..5], ["Close_lag_1", "Open_lag_1", "High_lag_1", "Low_lag_1", "Close_lag_2"]);
        assert_eq!(names.last().map(String::as_str), Some("Low_lag_12"));
    }

    #[test]
    fn test_lag_values_and_imputation() {
        let ds = dataset(20);
        let frame = create_features(&ds, 12);
        let close_lag_3 = frame.column("Close_lag_3").unwrap();
        let low_lag_1 = frame.column("Low_lag_1").unwrap();

        for i in 0..frame.len() {
            if i >= 3 {
                assert_eq!(close_lag_3[i], ds.rows[i - 3].close);
            } else {
                assert_eq!(close_lag_3[i], 0.0);
            }
        }
        assert_eq!(low_lag_1[0], 0.0);
        assert_eq!(low_lag_1[5], ds.rows[4].low);
    }

    #[test]
    fn test_synthetic_row_lags_point_at_history() {
        let ds = dataset(20);
        let frame = create_features(&ds, 12);
        let last = frame.row(frame.len() - 1).unwrap();

        assert_eq!(last.close, 0.0);
        assert_eq!(last.lag("Close_lag_1"), Some(ds.rows[19].close));
        assert_eq!(last.lag("High_lag_12"), Some(ds.rows[8].high));
        assert_eq!(last.lag("Open_lag_99"), None);
    }

    #[test]
    fn test_date_range() {
        let ds = dataset(5);
        let frame = create_features(&ds, 12);

        assert_eq!(frame.min_date, ds.rows[0].date);
        assert_eq!(frame.max_date, ds.forecast_date - Duration::days(1));
    }

    #[test]
    fn test_short_history_all_zero_lags() {
        let frame = create_features(&dataset(2), 12);
        let deep = frame.column("Close_lag_12").unwrap();
        assert!(deep.iter().all(|v| *v == 0.0));
        assert!(frame.row(3).is_none());
    }
}
