//! Core input data models for the insights engine.
//!
//! These types describe the raw numeric material handed to the engine by
//! the data-access collaborator: an ordered time series, an
//! insertion-ordered feature table, and a target sequence. All models are
//! serializable and carry no storage or query knowledge.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single observation in a metric time series.
///
/// One point per reporting period, ordered by the caller. Timestamps are
/// kept as opaque period labels (ISO-8601 dates in practice); the engine
/// only relies on sequence order, never on parsing the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Period label for this observation
    pub timestamp: String,
    /// Observed metric value
    pub value: f64,
}

impl TimeSeriesPoint {
    /// Creates a new time series point.
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

/// An insertion-ordered mapping from feature name to numeric column.
///
/// Columns are conceptually aligned by index with a target sequence.
/// Insertion order is preserved so that driver ranking ties break
/// deterministically regardless of feature name hashing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureTable {
    columns: IndexMap<String, Vec<f64>>,
}

impl FeatureTable {
    /// Creates an empty feature table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a feature column, replacing any column with the same name.
    ///
    /// A replaced column keeps its original insertion position, matching
    /// the behavior of the underlying ordered map.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.columns.insert(name.into(), values);
    }

    /// Returns the column for a feature name, if present.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Iterates over (name, column) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns the number of feature columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true when the table holds no feature columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<IndexMap<String, Vec<f64>>> for FeatureTable {
    fn from(columns: IndexMap<String, Vec<f64>>) -> Self {
        Self { columns }
    }
}

impl FromIterator<(String, Vec<f64>)> for FeatureTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f64>)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}
