//! Statistical insights engine.
//!
//! This module turns raw time-series metrics and feature tables into:
//! - **Anomaly findings**: z-score or generalized ESD outlier detection
//!   with optional seasonal de-trending
//! - **Ranked drivers**: correlation or variance-weighted importance of
//!   feature columns against a target series
//! - **Trend characterization**: direction, strength, and change rate
//! - **Narrative**: a deterministic text summary of the above
//!
//! The four analysis components are pure, stateless functions over
//! immutable inputs - safe to call from arbitrary concurrent callers.
//! `InsightsOrchestrator` composes them and is the only place I/O
//! happens, through the `MetricsSource` and `ReportStore` seams.
//!
//! # Example
//! ```rust,ignore
//! use metricsight_core::insights::{anomaly, AnomalyConfig};
//!
//! let result = anomaly::detect(&series, &AnomalyConfig::default());
//! println!("{} anomalies", result.anomalies.len());
//! ```

pub mod anomaly;
mod config;
pub mod drivers;
mod models;
pub mod narrative;
mod orchestrator;
pub mod trend;

// Re-export public API
pub use config::{
    AnomalyConfig, AnomalyMethod, ConfigValidationError, DriverConfig, DriverMethod,
    InsightsConfig,
};
pub use models::{
    Anomaly, AnomalyResult, Direction, Driver, DriverAnalysisResult, DriverMetadata,
    InsightsReport, Severity, Statistics, TrendDirection, TrendResult,
};
pub use orchestrator::InsightsOrchestrator;
