//! Trend characterization for metric time series.
//!
//! Direction is classified from the relative change between the leading
//! and trailing windows of the series; strength measures how consistently
//! the series moves in that direction.

use crate::models::TimeSeriesPoint;

use super::models::{TrendDirection, TrendResult};

/// Change rates within this band classify as stable.
const DIRECTION_BAND: f64 = 0.05;

/// Denominators below this are treated as zero.
const MIN_BASELINE: f64 = 1e-10;

/// Characterizes the overall direction and strength of a series.
///
/// `change_rate` is the relative difference between the trailing-window
/// mean and the leading-window mean (window = len / 4, at least 1).
/// `strength` is the coefficient of determination of the least-squares
/// line over the series: bounded to [0, 1], higher means more consistent
/// directional movement. `variance` is the sample variance.
///
/// Series shorter than two points produce a flat, all-zero result.
pub fn analyze_trend(series: &[TimeSeriesPoint]) -> TrendResult {
    if series.len() < 2 {
        return TrendResult::flat();
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let n = values.len();

    let window = (n / 4).max(1);
    let head = values[..window].iter().sum::<f64>() / window as f64;
    let tail = values[n - window..].iter().sum::<f64>() / window as f64;

    let mean = values.iter().sum::<f64>() / n as f64;
    let baseline = if head.abs() > MIN_BASELINE {
        head.abs()
    } else {
        mean.abs()
    };
    let change_rate = if baseline > MIN_BASELINE {
        (tail - head) / baseline
    } else {
        0.0
    };

    let direction = if change_rate > DIRECTION_BAND {
        TrendDirection::Increasing
    } else if change_rate < -DIRECTION_BAND {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    TrendResult {
        direction,
        strength: linear_fit_r_squared(&values),
        variance: sample_variance(&values, mean),
        change_rate,
    }
}

/// Coefficient of determination of the least-squares line over indices.
///
/// Zero for a flat series: no directional movement to be consistent with.
fn linear_fit_r_squared(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let mut cov_xy = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (i, value) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        let dy = value - mean_y;
        cov_xy += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }

    ((cov_xy * cov_xy) / (var_x * var_y)).clamp(0.0, 1.0)
}

/// Sample variance (n - 1 denominator); zero for fewer than two points.
fn sample_variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}
