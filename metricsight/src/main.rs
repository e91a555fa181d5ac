//! Insights generation tool.
//!
//! This binary runs the Metricsight statistical insights engine over a
//! JSON dataset file: anomaly detection, driver ranking, trend
//! characterization, and full report generation with a deterministic
//! narrative. It is a thin shell over `metricsight-core`; production
//! deployments embed the same engine behind their own service layer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use metricsight_core::insights::{anomaly, drivers};
use metricsight_core::{
    init_logging, AnalysisDataset, AnomalyConfig, AnomalyMethod, DriverConfig, DriverMethod,
    InMemoryReportStore, InsightsConfig, InsightsOrchestrator, InsightsQuery, MetricsSource,
    Result as CoreResult,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "metricsight")]
#[command(about = "Statistical insights over metric datasets")]
#[command(version)]
#[command(long_about = "
Metricsight - statistical insights engine

Analyzes a JSON dataset file containing a metric time series, a feature
table, and a target sequence:
- Anomaly detection (generalized ESD or z-score, seasonal-aware)
- Driver ranking (variance-weighted importance or plain correlation)
- Trend characterization and a deterministic narrative summary

DATASET FORMAT:
  {
    \"series\":   [{\"timestamp\": \"2026-01-01\", \"value\": 120.5}, ...],
    \"features\": {\"marketing_spend\": [10.0, 12.5, ...], ...},
    \"target\":   [120.5, 118.0, ...]
  }

EXAMPLES:
  metricsight report --input dataset.json --metric daily_visits
  metricsight anomalies --input dataset.json --method zscore --threshold 2.5
  metricsight drivers --input dataset.json --top-n 3
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a full insights report
    Report(ReportArgs),
    /// Run anomaly detection only
    Anomalies(AnomaliesArgs),
    /// Run driver analysis only
    Drivers(DriversArgs),
}

#[derive(Args)]
pub struct ReportArgs {
    /// Dataset file path
    #[arg(short, long, help = "JSON dataset file")]
    pub input: PathBuf,

    /// Output file path (stdout if omitted)
    #[arg(short, long, help = "Output file path")]
    pub output: Option<PathBuf>,

    /// Metric name recorded in the report
    #[arg(long, default_value = "metric", help = "Metric name for the report")]
    pub metric: String,

    /// Facility scope recorded in the report
    #[arg(long, help = "Optional facility scope")]
    pub facility: Option<String>,

    /// Query window start (RFC 3339)
    #[arg(long, help = "Window start, RFC 3339 (defaults to now)")]
    pub start: Option<DateTime<Utc>>,

    /// Query window end (RFC 3339)
    #[arg(long, help = "Window end, RFC 3339 (defaults to now)")]
    pub end: Option<DateTime<Utc>>,
}

#[derive(Args)]
pub struct AnomaliesArgs {
    /// Dataset file path
    #[arg(short, long, help = "JSON dataset file")]
    pub input: PathBuf,

    /// Output file path (stdout if omitted)
    #[arg(short, long, help = "Output file path")]
    pub output: Option<PathBuf>,

    /// Detection method (esd or zscore; unknown names fall back to esd)
    #[arg(long, help = "Detection method: esd or zscore")]
    pub method: Option<String>,

    /// Z-score threshold
    #[arg(long, help = "Z-score threshold (zscore method)")]
    pub threshold: Option<f64>,

    /// Seasonal period in points (0 disables seasonality handling)
    #[arg(long, help = "Seasonal period, 0 to disable")]
    pub seasonal_period: Option<usize>,

    /// ESD significance level
    #[arg(long, help = "Significance level for the ESD test")]
    pub alpha: Option<f64>,
}

#[derive(Args)]
pub struct DriversArgs {
    /// Dataset file path
    #[arg(short, long, help = "JSON dataset file")]
    pub input: PathBuf,

    /// Output file path (stdout if omitted)
    #[arg(short, long, help = "Output file path")]
    pub output: Option<PathBuf>,

    /// Ranking method (importance or correlation; unknown names fall back)
    #[arg(long, help = "Ranking method: importance or correlation")]
    pub method: Option<String>,

    /// Maximum number of drivers to return
    #[arg(long, help = "Maximum drivers in the ranking")]
    pub top_n: Option<usize>,
}

/// Dataset file standing in for the data-access collaborator.
struct FileSource {
    dataset: AnalysisDataset,
}

#[async_trait]
impl MetricsSource for FileSource {
    async fn fetch_dataset(&self, _query: &InsightsQuery) -> CoreResult<AnalysisDataset> {
        Ok(self.dataset.clone())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    match cli.command {
        Command::Report(args) => run_report(args).await,
        Command::Anomalies(args) => run_anomalies(&args),
        Command::Drivers(args) => run_drivers(&args),
    }
}

/// Runs the full pipeline through the orchestrator.
async fn run_report(args: ReportArgs) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.input)?;
    info!(
        "Loaded {} points, {} features from {}",
        dataset.series.len(),
        dataset.features.len(),
        args.input.display()
    );

    let query = InsightsQuery {
        metric: args.metric,
        start: args.start.unwrap_or_else(Utc::now),
        end: args.end.unwrap_or_else(Utc::now),
        facility_id: args.facility,
    };

    let orchestrator = InsightsOrchestrator::new(
        Arc::new(FileSource { dataset }),
        Arc::new(InMemoryReportStore::new()),
        InsightsConfig::default(),
    );

    let report = orchestrator
        .generate_insights(&query, "metricsight-cli")
        .await
        .context("insights generation failed")?;

    info!(
        "Report {}: {} anomalies, {} drivers",
        report.id,
        report.anomalies.anomalies.len(),
        report.drivers.drivers.len()
    );
    write_output(&report, args.output.as_deref())
}

/// Runs anomaly detection only.
fn run_anomalies(args: &AnomaliesArgs) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.input)?;

    let mut config = AnomalyConfig::new();
    if let Some(method) = &args.method {
        // FromStr is infallible: unknown names warn and fall back
        let method: AnomalyMethod = method.parse().unwrap_or_default();
        config = config.with_method(method);
    }
    if let Some(threshold) = args.threshold {
        config = config.with_threshold(threshold);
    }
    if let Some(period) = args.seasonal_period {
        config = config.with_seasonal_period(period);
    }
    if let Some(alpha) = args.alpha {
        config = config.with_alpha(alpha);
    }

    let result = anomaly::detect(&dataset.series, &config);
    info!(
        "Detected {} anomalies over {} points ({})",
        result.anomalies.len(),
        dataset.series.len(),
        result.statistics.method
    );
    write_output(&result, args.output.as_deref())
}

/// Runs driver analysis only.
fn run_drivers(args: &DriversArgs) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.input)?;

    let mut config = DriverConfig::new();
    if let Some(method) = &args.method {
        let method: DriverMethod = method.parse().unwrap_or_default();
        config = config.with_method(method);
    }
    if let Some(top_n) = args.top_n {
        config = config.with_top_n(top_n);
    }

    let result = drivers::analyze(&dataset.features, &dataset.target, &config);
    info!(
        "Ranked {} of {} features over {} samples",
        result.drivers.len(),
        result.metadata.total_features,
        result.metadata.samples_analyzed
    );
    write_output(&result, args.output.as_deref())
}

/// Loads and parses a JSON dataset file.
fn load_dataset(path: &Path) -> anyhow::Result<AnalysisDataset> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading dataset file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing dataset file {}", path.display()))
}

/// Writes pretty-printed JSON to the output path or stdout.
fn write_output<T: serde::Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing output file {}", path.display()))?;
            info!("Output written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn dataset_json() -> &'static str {
        r#"{
            "series": [
                {"timestamp": "2026-01-01", "value": 100.0},
                {"timestamp": "2026-01-02", "value": 102.0},
                {"timestamp": "2026-01-03", "value": 98.0},
                {"timestamp": "2026-01-04", "value": 101.0},
                {"timestamp": "2026-01-05", "value": 300.0},
                {"timestamp": "2026-01-06", "value": 99.0},
                {"timestamp": "2026-01-07", "value": 100.0},
                {"timestamp": "2026-01-08", "value": 101.0},
                {"timestamp": "2026-01-09", "value": 100.0},
                {"timestamp": "2026-01-10", "value": 99.0}
            ],
            "features": {
                "spend": [10.0, 10.2, 9.8, 10.1, 30.0, 9.9, 10.0, 10.1, 10.0, 9.9]
            },
            "target": [100.0, 102.0, 98.0, 101.0, 300.0, 99.0, 100.0, 101.0, 100.0, 99.0]
        }"#
    }

    fn dataset_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(dataset_json().as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "metricsight",
            "anomalies",
            "--input",
            "data.json",
            "--method",
            "zscore",
            "--threshold",
            "2.5",
        ])
        .unwrap();

        match cli.command {
            Command::Anomalies(args) => {
                assert_eq!(args.input, PathBuf::from("data.json"));
                assert_eq!(args.method.as_deref(), Some("zscore"));
                assert_eq!(args.threshold, Some(2.5));
            }
            _ => panic!("expected anomalies subcommand"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["metricsight"]).is_err());
    }

    #[test]
    fn test_load_dataset_roundtrip() {
        let file = dataset_file();
        let dataset = load_dataset(file.path()).unwrap();

        assert_eq!(dataset.series.len(), 10);
        assert_eq!(dataset.features.len(), 1);
        assert_eq!(dataset.target.len(), 10);
        assert_eq!(dataset.series[4].value, 300.0);
    }

    #[test]
    fn test_load_dataset_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json at all").unwrap();

        assert!(load_dataset(file.path()).is_err());
    }

    #[test]
    fn test_run_anomalies_writes_result_file() {
        let file = dataset_file();
        let out = tempfile::NamedTempFile::new().unwrap();

        let args = AnomaliesArgs {
            input: file.path().to_path_buf(),
            output: Some(out.path().to_path_buf()),
            method: Some("zscore".to_string()),
            threshold: Some(2.0),
            seasonal_period: Some(0),
            alpha: None,
        };
        run_anomalies(&args).unwrap();

        let written = std::fs::read_to_string(out.path()).unwrap();
        let result: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(result["anomalies"].as_array().unwrap().len(), 1);
        assert_eq!(result["anomalies"][0]["timestamp"], "2026-01-05");
    }

    #[test]
    fn test_run_drivers_writes_result_file() {
        let file = dataset_file();
        let out = tempfile::NamedTempFile::new().unwrap();

        let args = DriversArgs {
            input: file.path().to_path_buf(),
            output: Some(out.path().to_path_buf()),
            method: None,
            top_n: Some(1),
        };
        run_drivers(&args).unwrap();

        let written = std::fs::read_to_string(out.path()).unwrap();
        let result: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(result["drivers"][0]["feature"], "spend");
        assert_eq!(result["metadata"]["total_features"], 1);
    }
}
