use base64::{engine::general_purpose::STANDARD, Engine as _};
use plotters::prelude::*;
use tracing::debug;

use crate::errors::AppError;
use crate::models::{ForecastResult, PriceRow};

pub const CHART_WIDTH: u32 = 1000;
pub const CHART_HEIGHT: u32 = 600;

const ACTUAL_COLOR: RGBColor = RGBColor(31, 119, 180);
const FORECAST_COLOR: RGBColor = RGBColor(214, 39, 40);
const GRID_COLOR: RGBColor = RGBColor(230, 230, 230);

/// Render the trailing actual closes against the forecast point and its
/// uncertainty band, returned as a base64 PNG.
///
/// The bitmap carries no text. Captions and the legend live in the page.
pub fn render_forecast_chart(
    history: &[PriceRow],
    forecast: &ForecastResult,
    window: usize,
) -> Result<String, AppError> {
    let png = render_png(history, forecast, window)?;
    Ok(STANDARD.encode(png))
}

pub fn render_png(
    history: &[PriceRow],
    forecast: &ForecastResult,
    window: usize,
) -> Result<Vec<u8>, AppError> {
    let trailing = &history[history.len().saturating_sub(window)..];

    // x axis: days relative to the forecast date
    let points: Vec<(f64, f64)> = trailing
        .iter()
        .map(|r| ((r.date - forecast.date).num_days() as f64, r.close))
        .collect();

    let (x_min, x_max) = (points.first().map(|p| p.0).unwrap_or(-1.0).min(-1.0), 1.0);
    let (y_min, y_max) = y_bounds(&points, forecast);

    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(render_error)?;

        chart
            .draw_series((0..=10).map(|i| {
                let y = y_min + (y_max - y_min) * i as f64 / 10.0;
                PathElement::new(vec![(x_min, y), (x_max, y)], GRID_COLOR)
            }))
            .map_err(render_error)?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), ACTUAL_COLOR.stroke_width(2)))
            .map_err(render_error)?;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(-0.5, forecast.yhat_lower), (0.5, forecast.yhat_upper)],
                FORECAST_COLOR.mix(0.2).filled(),
            )))
            .map_err(render_error)?;

        chart
            .draw_series(std::iter::once(Circle::new(
                (0.0, forecast.yhat),
                6,
                FORECAST_COLOR.mix(0.6).filled(),
            )))
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
    }

    debug!("Rendered forecast chart with {} actual points", points.len());
    encode_png(&buffer, CHART_WIDTH, CHART_HEIGHT)
}

fn y_bounds(points: &[(f64, f64)], forecast: &ForecastResult) -> (f64, f64) {
    let (lo, hi) = points
        .iter()
        .map(|p| p.1)
        .chain([forecast.yhat_lower, forecast.yhat_upper, forecast.yhat])
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1.0);
    (lo - pad, hi + pad)
}

fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, AppError> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(render_error)?;
        writer.write_image_data(rgb).map_err(render_error)?;
        writer.finish().map_err(render_error)?;
    }
    Ok(out)
}

fn render_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Render(e.to_string())
}
