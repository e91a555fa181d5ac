//! Core library for Metricsight.
//!
//! This crate implements the statistical insights engine: anomaly
//! detection, driver ranking, trend characterization, narrative
//! generation, and the orchestration that assembles them into persisted
//! `InsightsReport`s.
//!
//! # Architecture
//! The engine follows these patterns:
//! - Pure, stateless analysis functions taking explicit configuration
//!   structs - no service singletons, no internal caches
//! - Object-safe collaborator traits for data access and report storage;
//!   the engine never touches SQL, queues, or HTTP itself
//! - Graceful degradation: degenerate input produces well-formed,
//!   zero-valued results rather than errors

pub mod datasource;
pub mod error;
pub mod insights;
pub mod logging;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use datasource::{AnalysisDataset, InsightsQuery, MetricsSource};
pub use error::{MetricsightError, Result};
pub use insights::{
    AnomalyConfig, AnomalyMethod, AnomalyResult, DriverAnalysisResult, DriverConfig, DriverMethod,
    InsightsConfig, InsightsOrchestrator, InsightsReport, TrendResult,
};
pub use logging::init_logging;
pub use models::{FeatureTable, TimeSeriesPoint};
pub use store::{InMemoryReportStore, ReportRecord, ReportStore};
