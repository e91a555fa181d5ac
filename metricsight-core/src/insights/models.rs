//! Result models for the insights engine.
//!
//! These types carry the outputs of anomaly detection, driver analysis,
//! and trend characterization, plus the persisted `InsightsReport` bundle.
//! All numeric fields round-trip through JSON exactly and array ordering
//! is preserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::{AnomalyMethod, DriverMethod};

/// Severity tier for a detected anomaly.
///
/// Tiers are fixed multiples of the effective threshold: a score below
/// 1.5x the threshold is low, below 2.5x is medium, anything beyond is
/// high. A more extreme deviation never receives a lower tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Score below 1.5x the threshold
    Low,
    /// Score between 1.5x and 2.5x the threshold
    Medium,
    /// Score at or beyond 2.5x the threshold
    High,
}

impl Severity {
    /// Classifies an absolute score against the effective threshold.
    pub fn from_score(score_abs: f64, threshold: f64) -> Self {
        if score_abs < threshold * 1.5 {
            Severity::Low
        } else if score_abs < threshold * 2.5 {
            Severity::Medium
        } else {
            Severity::High
        }
    }
}

/// Statistics computed once per detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Mean of the (de-seasonalized) series
    pub mean: f64,
    /// Population standard deviation of the (de-seasonalized) series
    pub std_dev: f64,
    /// Effective threshold: the configured z threshold, or for ESD the
    /// first-iteration critical value (0 when no test could run)
    pub threshold: f64,
    /// Detection method that produced this run
    pub method: AnomalyMethod,
}

impl Statistics {
    /// All-zero statistics for degenerate input.
    pub fn zero(method: AnomalyMethod) -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.0,
            threshold: 0.0,
            method,
        }
    }
}

/// A single flagged point in a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Period label of the flagged point
    pub timestamp: String,
    /// Observed value
    pub value: f64,
    /// Value the model expected for this period (seasonal component
    /// reconstructed when seasonality handling was active)
    pub expected_value: f64,
    /// Deviation score at the time the point was flagged
    pub score: f64,
    /// Severity tier
    pub severity: Severity,
}

/// Output of a detection run: flagged points plus run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Flagged points in series order
    pub anomalies: Vec<Anomaly>,
    /// Statistics for the run
    pub statistics: Statistics,
}

impl AnomalyResult {
    /// Empty result for degenerate input.
    pub fn empty(method: AnomalyMethod) -> Self {
        Self {
            anomalies: Vec::new(),
            statistics: Statistics::zero(method),
        }
    }
}

/// Relationship direction between a feature and the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Feature moves with the target
    Positive,
    /// Feature moves against the target
    Negative,
}

/// A ranked feature with its relationship to the target series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Feature name
    pub feature: String,
    /// Bounded importance score in [0, 1]
    pub importance: f64,
    /// Signed contribution in target units per feature standard deviation
    pub contribution: f64,
    /// Sign of the correlation with the target
    pub direction: Direction,
}

/// Metadata describing a driver analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverMetadata {
    /// Ranking method used
    pub method: DriverMethod,
    /// Features presented, counted before truncation to top_n
    pub total_features: usize,
    /// Largest aligned sample length used across analyzed features
    pub samples_analyzed: usize,
}

/// Output of driver analysis: ranked drivers plus run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAnalysisResult {
    /// Drivers ranked descending by importance, ties in insertion order
    pub drivers: Vec<Driver>,
    /// Run metadata
    pub metadata: DriverMetadata,
}

impl DriverAnalysisResult {
    /// Empty result for degenerate input.
    pub fn empty(method: DriverMethod) -> Self {
        Self {
            drivers: Vec::new(),
            metadata: DriverMetadata {
                method,
                total_features: 0,
                samples_analyzed: 0,
            },
        }
    }
}

/// Overall direction of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Change rate above +5%
    Increasing,
    /// Change rate below -5%
    Decreasing,
    /// Change rate within +/-5%
    Stable,
}

/// Characterization of the overall movement of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Direction classification
    pub direction: TrendDirection,
    /// Consistency of directional movement, bounded to [0, 1]
    pub strength: f64,
    /// Sample variance of the full series
    pub variance: f64,
    /// Relative change between leading and trailing windows
    pub change_rate: f64,
}

impl TrendResult {
    /// Flat result for degenerate input.
    pub fn flat() -> Self {
        Self {
            direction: TrendDirection::Stable,
            strength: 0.0,
            variance: 0.0,
            change_rate: 0.0,
        }
    }
}

/// The persisted, immutable bundle produced for one analysis request.
///
/// Created once by the orchestrator, read-only afterward. The `id` is
/// globally unique and stable for the lifetime of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    /// Globally unique report identifier
    pub id: String,
    /// When the analysis ran
    pub timestamp: DateTime<Utc>,
    /// Opaque echo of the query that produced this report
    pub query_params: serde_json::Value,
    /// Anomaly detection output
    pub anomalies: AnomalyResult,
    /// Driver analysis output
    pub drivers: DriverAnalysisResult,
    /// Trend characterization output
    pub trends: TrendResult,
    /// Deterministic natural-language summary
    pub narrative: String,
}
