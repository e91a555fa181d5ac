//! Insights orchestration.
//!
//! The orchestrator is the only component that performs I/O: it resolves
//! a query through the data-access collaborator, runs the pure analysis
//! components over the fetched data, assembles an immutable
//! `InsightsReport`, and persists it through the report-store
//! collaborator. Retrieval degrades gracefully: storage faults and
//! corrupt rows surface as not-found, never as an analysis fault.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::datasource::{InsightsQuery, MetricsSource};
use crate::store::{ReportRecord, ReportStore};
use crate::Result;

use super::config::InsightsConfig;
use super::models::InsightsReport;
use super::{anomaly, drivers, narrative, trend};

/// Orchestrates a full insights run.
///
/// All analysis components are pure functions; the orchestrator only adds
/// identity (report id, timestamp), composition, and persistence. It is
/// safe to share across concurrent callers.
///
/// # Example
///
/// ```rust,ignore
/// use metricsight_core::insights::{InsightsConfig, InsightsOrchestrator};
///
/// let orchestrator = InsightsOrchestrator::new(source, store, InsightsConfig::default());
/// let report = orchestrator.generate_insights(&query, "analyst@example.org").await?;
/// ```
pub struct InsightsOrchestrator {
    source: Arc<dyn MetricsSource>,
    store: Arc<dyn ReportStore>,
    config: InsightsConfig,
}

impl InsightsOrchestrator {
    /// Creates a new orchestrator over the given collaborators.
    pub fn new(
        source: Arc<dyn MetricsSource>,
        store: Arc<dyn ReportStore>,
        config: InsightsConfig,
    ) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    /// Creates a new orchestrator with default analysis configuration.
    pub fn with_defaults(source: Arc<dyn MetricsSource>, store: Arc<dyn ReportStore>) -> Self {
        Self::new(source, store, InsightsConfig::default())
    }

    /// Returns a reference to the analysis configuration.
    pub fn config(&self) -> &InsightsConfig {
        &self.config
    }

    /// Runs a full analysis for one query and persists the result.
    ///
    /// `requested_by` is recorded in the report's query parameters for
    /// audit purposes only; authorization happened upstream.
    ///
    /// # Errors
    /// Returns an error when the data-access collaborator cannot supply
    /// data or the report store cannot persist the result. Analysis
    /// itself never fails: degenerate data produces a zero-valued report.
    pub async fn generate_insights(
        &self,
        query: &InsightsQuery,
        requested_by: &str,
    ) -> Result<InsightsReport> {
        tracing::info!(
            "Generating insights for metric '{}' ({} to {})",
            query.metric,
            query.start,
            query.end
        );

        let dataset = self.source.fetch_dataset(query).await?;
        tracing::debug!(
            "Fetched {} points, {} features, {} target samples",
            dataset.series.len(),
            dataset.features.len(),
            dataset.target.len()
        );

        let anomalies = anomaly::detect(&dataset.series, &self.config.anomaly);
        let drivers = drivers::analyze(&dataset.features, &dataset.target, &self.config.drivers);
        let trends = trend::analyze_trend(&dataset.series);
        let narrative = narrative::generate(&trends, &anomalies, &drivers);

        let report = InsightsReport {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            query_params: query_params(query, requested_by)?,
            anomalies,
            drivers,
            trends,
            narrative,
        };

        let record = ReportRecord::from_report(&report)?;
        self.store.save(record).await?;

        tracing::info!(
            "Insights report {} generated: {} anomalies, {} drivers",
            report.id,
            report.anomalies.anomalies.len(),
            report.drivers.drivers.len()
        );
        Ok(report)
    }

    /// Reads back a previously persisted report.
    ///
    /// Storage faults and corrupt rows are logged and surfaced as `None`;
    /// this never propagates a storage fault to the caller.
    pub async fn get_report(&self, id: &str) -> Result<Option<InsightsReport>> {
        let record = match self.store.load(id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!("Report store failed loading '{}': {}", id, e);
                return Ok(None);
            }
        };

        match record.into_report() {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                tracing::warn!("Stored report '{}' failed to parse: {}", id, e);
                Ok(None)
            }
        }
    }
}

/// Builds the opaque query-parameter echo stored on the report.
fn query_params(query: &InsightsQuery, requested_by: &str) -> Result<serde_json::Value> {
    let mut params = serde_json::to_value(query).map_err(|e| {
        crate::error::MetricsightError::serialization("encoding query parameters", e)
    })?;
    if let Some(object) = params.as_object_mut() {
        object.insert(
            "requested_by".to_string(),
            serde_json::Value::String(requested_by.to_string()),
        );
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::AnalysisDataset;
    use crate::error::MetricsightError;
    use crate::models::{FeatureTable, TimeSeriesPoint};
    use crate::store::InMemoryReportStore;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FixtureSource {
        dataset: AnalysisDataset,
    }

    #[async_trait]
    impl MetricsSource for FixtureSource {
        async fn fetch_dataset(&self, _query: &InsightsQuery) -> Result<AnalysisDataset> {
            Ok(self.dataset.clone())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ReportStore for FailingStore {
        async fn save(&self, _record: ReportRecord) -> Result<()> {
            Err(MetricsightError::storage(
                "saving report",
                std::io::Error::new(std::io::ErrorKind::Other, "backend down"),
            ))
        }

        async fn load(&self, _id: &str) -> Result<Option<ReportRecord>> {
            Err(MetricsightError::storage(
                "loading report",
                std::io::Error::new(std::io::ErrorKind::Other, "backend down"),
            ))
        }
    }

    fn fixture_dataset() -> AnalysisDataset {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 8.0).collect();
        let series: Vec<TimeSeriesPoint> = values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(format!("2026-04-{:02}", i + 1), *v))
            .collect();

        let mut features = FeatureTable::new();
        features.insert("outreach", values.iter().map(|v| v * 1.5).collect::<Vec<_>>());
        features.insert("staffing", vec![12.0; 30]);

        AnalysisDataset {
            target: values,
            series,
            features,
        }
    }

    fn fixture_query() -> InsightsQuery {
        InsightsQuery {
            metric: "visits".to_string(),
            start: Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 4, 30, 0, 0, 0).unwrap(),
            facility_id: None,
        }
    }

    fn orchestrator_with(
        dataset: AnalysisDataset,
        store: Arc<dyn ReportStore>,
    ) -> InsightsOrchestrator {
        InsightsOrchestrator::with_defaults(Arc::new(FixtureSource { dataset }), store)
    }

    #[tokio::test]
    async fn test_generate_insights_assembles_full_report() {
        let orchestrator =
            orchestrator_with(fixture_dataset(), Arc::new(InMemoryReportStore::new()));

        let report = orchestrator
            .generate_insights(&fixture_query(), "analyst")
            .await
            .unwrap();

        assert!(!report.id.is_empty());
        assert!(!report.narrative.is_empty());
        assert_eq!(report.drivers.metadata.total_features, 2);
        assert_eq!(report.drivers.drivers[0].feature, "outreach");
        assert_eq!(report.query_params["metric"], "visits");
        assert_eq!(report.query_params["requested_by"], "analyst");
    }

    #[tokio::test]
    async fn test_report_ids_are_unique() {
        let orchestrator =
            orchestrator_with(fixture_dataset(), Arc::new(InMemoryReportStore::new()));

        let first = orchestrator
            .generate_insights(&fixture_query(), "analyst")
            .await
            .unwrap();
        let second = orchestrator
            .generate_insights(&fixture_query(), "analyst")
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_get_report_roundtrip_is_lossless() {
        let orchestrator =
            orchestrator_with(fixture_dataset(), Arc::new(InMemoryReportStore::new()));

        let generated = orchestrator
            .generate_insights(&fixture_query(), "analyst")
            .await
            .unwrap();
        let loaded = orchestrator
            .get_report(&generated.id)
            .await
            .unwrap()
            .expect("report present");

        assert_eq!(generated, loaded);
    }

    #[tokio::test]
    async fn test_get_report_unknown_id_is_none() {
        let orchestrator =
            orchestrator_with(fixture_dataset(), Arc::new(InMemoryReportStore::new()));

        assert!(orchestrator.get_report("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_report_survives_storage_fault() {
        let orchestrator = orchestrator_with(fixture_dataset(), Arc::new(FailingStore));

        // Storage faults surface as not-found, not as an error
        assert!(orchestrator.get_report("any").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_report_survives_corrupt_row() {
        let store = Arc::new(InMemoryReportStore::new());
        let orchestrator = orchestrator_with(fixture_dataset(), store.clone());

        let report = orchestrator
            .generate_insights(&fixture_query(), "analyst")
            .await
            .unwrap();

        // Corrupt the stored anomalies column behind the orchestrator
        let mut record = store.load(&report.id).await.unwrap().unwrap();
        record.anomalies = "{broken".to_string();
        store.save(record).await.unwrap();

        assert!(orchestrator.get_report(&report.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generate_insights_propagates_save_failure() {
        let orchestrator = orchestrator_with(fixture_dataset(), Arc::new(FailingStore));

        let result = orchestrator
            .generate_insights(&fixture_query(), "analyst")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_dataset_produces_zero_valued_report() {
        let orchestrator =
            orchestrator_with(AnalysisDataset::default(), Arc::new(InMemoryReportStore::new()));

        let report = orchestrator
            .generate_insights(&fixture_query(), "analyst")
            .await
            .unwrap();

        assert!(report.anomalies.anomalies.is_empty());
        assert!(report.drivers.drivers.is_empty());
        assert_eq!(report.trends.variance, 0.0);
        assert!(!report.narrative.is_empty());
    }
}
