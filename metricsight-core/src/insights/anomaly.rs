//! Anomaly detection for metric time series.
//!
//! This module flags unusual points in a single series using either a
//! fixed-threshold z-score test or the generalized extreme Studentized
//! deviate (ESD) test, with optional seasonal de-trending applied before
//! scoring. Detection is deterministic: identical input and configuration
//! always produce identical output.

use crate::models::TimeSeriesPoint;

use super::config::{AnomalyConfig, AnomalyMethod};
use super::models::{Anomaly, AnomalyResult, Severity, Statistics};

/// Standard deviations below this are treated as zero variance.
const MIN_STD_DEV: f64 = 1e-10;

/// Detects anomalous points in an ordered time series.
///
/// When `seasonal_period > 0` and the series covers at least two full
/// cycles, a per-phase seasonal baseline is subtracted before scoring and
/// reconstructed into each anomaly's `expected_value`.
///
/// # Arguments
/// * `series` - Ordered observations, one per reporting period
/// * `config` - Method, threshold, seasonality, and significance settings
///
/// # Returns
/// Flagged points in series order plus the run statistics. Degenerate
/// input (empty series, zero variance) yields an empty, well-formed
/// result rather than an error.
pub fn detect(series: &[TimeSeriesPoint], config: &AnomalyConfig) -> AnomalyResult {
    if series.is_empty() {
        return AnomalyResult::empty(config.method);
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();

    // Seasonal baseline per phase-in-period, only when at least two full
    // cycles are available
    let seasonal = seasonal_baseline(&values, config.seasonal_period);
    let residuals: Vec<f64> = match &seasonal {
        Some(baseline) => values
            .iter()
            .enumerate()
            .map(|(i, v)| v - baseline[i % baseline.len()])
            .collect(),
        None => values.clone(),
    };

    let (mean, std_dev) = calculate_statistics(&residuals);
    let std_dev = if std_dev < MIN_STD_DEV { 0.0 } else { std_dev };

    let expected_for = |index: usize| -> f64 {
        match &seasonal {
            Some(baseline) => mean + baseline[index % baseline.len()],
            None => mean,
        }
    };

    match config.method {
        AnomalyMethod::ZScore => {
            detect_zscore(series, &residuals, mean, std_dev, expected_for, config)
        }
        AnomalyMethod::Esd => detect_esd(series, &residuals, mean, std_dev, expected_for, config),
    }
}

/// Fixed-threshold z-score detection over de-seasonalized values.
fn detect_zscore(
    series: &[TimeSeriesPoint],
    residuals: &[f64],
    mean: f64,
    std_dev: f64,
    expected_for: impl Fn(usize) -> f64,
    config: &AnomalyConfig,
) -> AnomalyResult {
    let statistics = Statistics {
        mean,
        std_dev,
        threshold: config.threshold,
        method: AnomalyMethod::ZScore,
    };

    // A zero-variance series never reports anomalies
    if std_dev == 0.0 {
        return AnomalyResult {
            anomalies: Vec::new(),
            statistics,
        };
    }

    let anomalies = residuals
        .iter()
        .enumerate()
        .filter_map(|(i, residual)| {
            let score = (residual - mean) / std_dev;
            if score.abs() > config.threshold {
                Some(Anomaly {
                    timestamp: series[i].timestamp.clone(),
                    value: series[i].value,
                    expected_value: expected_for(i),
                    score,
                    severity: Severity::from_score(score.abs(), config.threshold),
                })
            } else {
                None
            }
        })
        .collect();

    AnomalyResult {
        anomalies,
        statistics,
    }
}

/// Generalized ESD detection over de-seasonalized values.
///
/// Iteratively removes the most deviant remaining point while its test
/// statistic exceeds the Student-t critical value at the configured
/// significance. Removal is tracked through an index mask; the input is
/// never spliced. Iterations are bounded at half the series length.
fn detect_esd(
    series: &[TimeSeriesPoint],
    residuals: &[f64],
    full_mean: f64,
    full_std_dev: f64,
    expected_for: impl Fn(usize) -> f64,
    config: &AnomalyConfig,
) -> AnomalyResult {
    let n = residuals.len();
    let max_outliers = n / 2;
    let mut removed = vec![false; n];
    let mut flagged: Vec<(usize, f64, f64)> = Vec::new();
    let mut first_critical = 0.0;

    for iteration in 0..max_outliers {
        let remaining: Vec<(usize, f64)> = residuals
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| !removed[*i])
            .collect();

        // The critical value needs n - 2 degrees of freedom
        let n_rem = remaining.len();
        if n_rem < 3 {
            break;
        }

        let values: Vec<f64> = remaining.iter().map(|(_, v)| *v).collect();
        let (mean, std_dev) = calculate_statistics(&values);
        if std_dev < MIN_STD_DEV {
            break;
        }

        // Max absolute deviation; ties resolve to the earliest index
        let (candidate, deviation) = remaining
            .iter()
            .map(|(i, v)| (*i, (v - mean).abs()))
            .fold((0usize, f64::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 { cur } else { best }
            });

        let test_statistic = deviation / std_dev;
        let critical = esd_critical_value(n_rem, config.alpha);
        if iteration == 0 {
            first_critical = critical;
        }

        if test_statistic > critical {
            removed[candidate] = true;
            let expected = expected_for(candidate);
            flagged.push((candidate, test_statistic, expected));
        } else {
            break;
        }
    }

    // Report in series order regardless of removal order
    flagged.sort_by_key(|(index, _, _)| *index);

    let anomalies = flagged
        .into_iter()
        .map(|(index, score, expected_value)| Anomaly {
            timestamp: series[index].timestamp.clone(),
            value: series[index].value,
            expected_value,
            score,
            severity: Severity::from_score(score, config.threshold),
        })
        .collect();

    AnomalyResult {
        anomalies,
        statistics: Statistics {
            mean: full_mean,
            std_dev: full_std_dev,
            threshold: first_critical,
            method: AnomalyMethod::Esd,
        },
    }
}

/// Computes the per-phase seasonal baseline.
///
/// Returns None when seasonality handling is disabled or the series does
/// not cover at least two full cycles.
fn seasonal_baseline(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < 2 * period {
        return None;
    }

    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, value) in values.iter().enumerate() {
        sums[i % period] += value;
        counts[i % period] += 1;
    }

    Some(
        sums.iter()
            .zip(&counts)
            .map(|(sum, count)| sum / *count as f64)
            .collect(),
    )
}

/// Calculates mean and population standard deviation for a set of values.
///
/// Uses population standard deviation (divides by n, not n-1), matching
/// the z-score convention used throughout detection.
fn calculate_statistics(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    (mean, variance.sqrt())
}

/// Critical value for one ESD iteration with `n` remaining points.
///
/// lambda = (n-1) * t / sqrt((n - 2 + t^2) * n), where t is the Student-t
/// quantile at 1 - alpha / (2n) with n - 2 degrees of freedom.
fn esd_critical_value(n: usize, alpha: f64) -> f64 {
    let nf = n as f64;
    let p = 1.0 - alpha / (2.0 * nf);
    let t = t_quantile(p, n - 2);

    (nf - 1.0) * t / (((nf - 2.0 + t * t) * nf).sqrt())
}

/// Student-t quantile at probability `p` with `df` degrees of freedom.
///
/// Closed forms for df 1 and 2; otherwise a normal quantile corrected by
/// the Cornish-Fisher expansion in 1/df, which is accurate to a few parts
/// in a thousand for df >= 3 - plenty for an outlier cut-off.
fn t_quantile(p: f64, df: usize) -> f64 {
    match df {
        0 => f64::INFINITY,
        1 => (std::f64::consts::PI * (p - 0.5)).tan(),
        2 => {
            let u = 2.0 * p - 1.0;
            u * (1.0 / (2.0 * p * (1.0 - p))).sqrt()
        }
        _ => {
            let nu = df as f64;
            let z = normal_quantile(p);
            let z3 = z.powi(3);
            let z5 = z.powi(5);
            let z7 = z.powi(7);
            let g1 = (z3 + z) / 4.0;
            let g2 = (5.0 * z5 + 16.0 * z3 + 3.0 * z) / 96.0;
            let g3 = (3.0 * z7 + 19.0 * z5 + 17.0 * z3 - 15.0 * z) / 384.0;

            z + g1 / nu + g2 / (nu * nu) + g3 / (nu * nu * nu)
        }
    }
}

/// Standard normal quantile via Acklam's rational approximation.
///
/// Relative error below 1.2e-9 across the open unit interval.
fn normal_quantile(p: f64) -> f64 {
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
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}
