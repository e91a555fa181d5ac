//! Data-access collaborator seam.
//!
//! The engine never builds SQL or talks to storage. It consumes plain
//! numeric sequences through the `MetricsSource` trait; the implementation
//! behind it (warehouse reader, API client, fixture file) is the calling
//! service's concern, as is any retry or timeout policy.

use crate::models::{FeatureTable, TimeSeriesPoint};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters identifying one analysis request.
///
/// Facility scoping is resolved by the data-access collaborator; RBAC and
/// redaction happen outside the engine, which treats all fetched numbers
/// as already authorized and de-identified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsQuery {
    /// Primary metric to analyze
    pub metric: String,
    /// Inclusive start of the query window
    pub start: DateTime<Utc>,
    /// Inclusive end of the query window
    pub end: DateTime<Utc>,
    /// Optional facility scope
    pub facility_id: Option<String>,
}

/// Raw numeric material for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDataset {
    /// Time series for the primary metric, one point per reporting period
    pub series: Vec<TimeSeriesPoint>,
    /// Secondary metrics aligned by the same time index
    pub features: FeatureTable,
    /// Target sequence for driver analysis (commonly the primary metric)
    pub target: Vec<f64>,
}

/// Data-access collaborator consumed by the orchestrator.
///
/// # Object Safety
/// This trait is object-safe, allowing dynamic dispatch through
/// `Arc<dyn MetricsSource>`.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Resolves a query window into the raw numeric inputs of one run.
    ///
    /// # Errors
    /// Returns an error when the underlying source cannot supply data for
    /// the window. The engine performs no retries of its own.
    async fn fetch_dataset(&self, query: &InsightsQuery) -> Result<AnalysisDataset>;
}
