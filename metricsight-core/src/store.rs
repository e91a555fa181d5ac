//! Report-store collaborator seam.
//!
//! Persisted state is one row per report keyed by id, with the analysis
//! sub-structures stored as JSON text so any backing store (relational
//! table, document store, object storage) can hold them without knowing
//! their shape. The engine serializes and deserializes these columns
//! losslessly; the store itself only moves opaque strings.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::MetricsightError;
use crate::insights::InsightsReport;
use crate::Result;

/// One persisted report row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Globally unique report identifier
    pub id: String,
    /// When the analysis ran
    pub timestamp: DateTime<Utc>,
    /// Query parameters as JSON text
    pub query_params: String,
    /// Anomaly result as JSON text
    pub anomalies: String,
    /// Driver analysis result as JSON text
    pub drivers: String,
    /// Trend result as JSON text
    pub trends: String,
    /// Narrative as plain text
    pub narrative: String,
}

impl ReportRecord {
    /// Serializes a report into its persisted row shape.
    pub fn from_report(report: &InsightsReport) -> Result<Self> {
        Ok(Self {
            id: report.id.clone(),
            timestamp: report.timestamp,
            query_params: encode("query_params", &report.query_params)?,
            anomalies: encode("anomalies", &report.anomalies)?,
            drivers: encode("drivers", &report.drivers)?,
            trends: encode("trends", &report.trends)?,
            narrative: report.narrative.clone(),
        })
    }

    /// Deserializes the persisted row back into a report.
    ///
    /// # Errors
    /// Returns a serialization error when any stored JSON column fails to
    /// parse; callers decide whether that is fatal (the orchestrator maps
    /// it to not-found).
    pub fn into_report(self) -> Result<InsightsReport> {
        Ok(InsightsReport {
            id: self.id,
            timestamp: self.timestamp,
            query_params: decode("query_params", &self.query_params)?,
            anomalies: decode("anomalies", &self.anomalies)?,
            drivers: decode("drivers", &self.drivers)?,
            trends: decode("trends", &self.trends)?,
            narrative: self.narrative,
        })
    }
}

fn encode<T: Serialize>(column: &str, value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| MetricsightError::serialization(format!("encoding report {}", column), e))
}

fn decode<T: for<'de> Deserialize<'de>>(column: &str, json: &str) -> Result<T> {
    serde_json::from_str(json)
        .map_err(|e| MetricsightError::serialization(format!("decoding report {}", column), e))
}

/// Report-store collaborator consumed by the orchestrator.
///
/// Reports are immutable once saved; there is no update operation.
/// Deletion is an external retention concern and not part of this seam.
///
/// # Object Safety
/// This trait is object-safe, allowing dynamic dispatch through
/// `Arc<dyn ReportStore>`.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persists one report row.
    ///
    /// # Errors
    /// Returns an error when the row cannot be written.
    async fn save(&self, record: ReportRecord) -> Result<()>;

    /// Loads a report row by id, or None when no such row exists.
    ///
    /// # Errors
    /// Returns an error when the store itself fails; a missing row is not
    /// an error.
    async fn load(&self, id: &str) -> Result<Option<ReportRecord>>;
}

/// In-memory report store.
///
/// Backs tests and the CLI; production deployments provide their own
/// `ReportStore` over real storage.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    records: RwLock<HashMap<String, ReportRecord>>,
}

impl InMemoryReportStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn save(&self, record: ReportRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<ReportRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }
}
