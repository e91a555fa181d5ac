//! Driver analysis: ranking feature columns against a target series.
//!
//! Each feature is scored by its Pearson correlation with the target,
//! optionally weighted by its relative variance, then ranked descending.
//! Ties break by feature insertion order, so identical inputs always
//! produce identical rankings.

use crate::models::FeatureTable;

use super::config::{DriverConfig, DriverMethod};
use super::models::{Direction, Driver, DriverAnalysisResult, DriverMetadata};

/// Per-feature intermediate measurements before ranking.
struct FeatureStats {
    name: String,
    correlation: f64,
    variance: f64,
    std_dev: f64,
    target_std_dev: f64,
    samples: usize,
}

/// Ranks feature columns by their relationship to the target series.
///
/// Features whose length differs from the target are analyzed over the
/// common prefix rather than rejected; a warning is logged because a
/// mismatch usually indicates a misaligned column upstream.
///
/// # Arguments
/// * `features` - Named feature columns, insertion-ordered
/// * `target` - Target sequence the features are scored against
/// * `config` - Ranking method and depth
///
/// # Returns
/// Drivers ranked descending by importance, truncated to `top_n`, plus
/// run metadata. Degenerate input yields an empty, well-formed result.
pub fn analyze(
    features: &FeatureTable,
    target: &[f64],
    config: &DriverConfig,
) -> DriverAnalysisResult {
    if features.is_empty() || target.is_empty() {
        return DriverAnalysisResult::empty(config.method);
    }

    // First pass: per-feature stats over each feature's usable overlap
    let mut stats: Vec<FeatureStats> = Vec::with_capacity(features.len());
    for (name, column) in features.iter() {
        let overlap = column.len().min(target.len());
        if column.len() != target.len() {
            tracing::warn!(
                "Feature '{}' length {} does not match target length {}, truncating to {}",
                name,
                column.len(),
                target.len(),
                overlap
            );
        }

        let feature_slice = &column[..overlap];
        let target_slice = &target[..overlap];
        let (_, feature_std) = mean_and_std(feature_slice);
        let (_, target_std) = mean_and_std(target_slice);

        stats.push(FeatureStats {
            name: name.to_string(),
            correlation: pearson(feature_slice, target_slice),
            variance: feature_std * feature_std,
            std_dev: feature_std,
            target_std_dev: target_std,
            samples: overlap,
        });
    }

    let max_variance = stats.iter().map(|s| s.variance).fold(0.0f64, f64::max);
    let samples_analyzed = stats.iter().map(|s| s.samples).max().unwrap_or(0);

    // Second pass: score and assemble drivers
    let mut drivers: Vec<Driver> = stats
        .iter()
        .map(|s| {
            let importance = match config.method {
                DriverMethod::Correlation => s.correlation.abs(),
                DriverMethod::Importance => {
                    let normalized_variance = if max_variance > 0.0 {
                        s.variance / max_variance
                    } else {
                        0.0
                    };
                    (s.correlation.abs() * (0.7 + 0.3 * normalized_variance)).clamp(0.0, 1.0)
                }
            };

            let contribution = if s.target_std_dev > 0.0 {
                s.correlation * (s.std_dev / s.target_std_dev)
            } else {
                0.0
            };

            Driver {
                feature: s.name.clone(),
                importance,
                contribution,
                direction: if s.correlation >= 0.0 {
                    Direction::Positive
                } else {
                    Direction::Negative
                },
            }
        })
        .collect();

    // Stable sort: equal importance keeps insertion order
    drivers.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    drivers.truncate(config.top_n);

    DriverAnalysisResult {
        drivers,
        metadata: DriverMetadata {
            method: config.method,
            total_features: features.len(),
            samples_analyzed,
        },
    }
}

/// Pearson correlation coefficient.
///
/// Returns 0 when either series has zero variance or fewer than two
/// points, so degenerate columns never produce NaN.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }

    let nf = n as f64;
    let mean_x = x[..n].iter().sum::<f64>() / nf;
    let mean_y = y[..n].iter().sum::<f64>() / nf;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xv, yv) in x[..n].iter().zip(&y[..n]) {
        let dx = xv - mean_x;
        let dy = yv - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }

    (covariance / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Mean and population standard deviation.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    (mean, variance.sqrt())
}
