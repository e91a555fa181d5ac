//! Insights engine configuration.
//!
//! This module provides configuration for anomaly detection and driver
//! analysis, including method selection, detection thresholds, and
//! ranking depth.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Anomaly detection method.
///
/// Unknown method names deserialize to the default (ESD) rather than
/// failing, so callers with stale configuration degrade gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyMethod {
    /// Generalized extreme Studentized deviate test (iterative)
    #[default]
    Esd,
    /// Fixed-threshold z-score test
    ZScore,
}

impl<'de> Deserialize<'de> for AnomalyMethod {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // FromStr is infallible: unknown names warn and fall back
        let name = String::deserialize(deserializer)?;
        Ok(name.parse().unwrap_or_default())
    }
}

impl std::fmt::Display for AnomalyMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyMethod::Esd => write!(f, "esd"),
            AnomalyMethod::ZScore => write!(f, "zscore"),
        }
    }
}

impl std::str::FromStr for AnomalyMethod {
    type Err = std::convert::Infallible;

    /// Parses a method name, falling back to the default for unknown input.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "esd" => Ok(AnomalyMethod::Esd),
            "zscore" | "z-score" | "z_score" => Ok(AnomalyMethod::ZScore),
            other => {
                tracing::warn!(
                    "Unknown anomaly detection method '{}', falling back to '{}'",
                    other,
                    AnomalyMethod::default()
                );
                Ok(AnomalyMethod::default())
            }
        }
    }
}

/// Anomaly detection configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Detection method
    pub method: AnomalyMethod,
    /// Z-score threshold (z-score method only)
    pub threshold: f64,
    /// Points per seasonal cycle; 0 disables seasonality handling
    pub seasonal_period: usize,
    /// Significance level for the ESD test
    pub alpha: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            method: AnomalyMethod::Esd,
            threshold: 3.0,
            seasonal_period: 7,
            alpha: 0.05,
        }
    }
}

impl AnomalyConfig {
    /// Creates a new anomaly config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the detection method.
    pub fn with_method(mut self, method: AnomalyMethod) -> Self {
        self.method = method;
        self
    }

    /// Builder method to set the z-score threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        if threshold <= 0.0 {
            tracing::warn!("threshold {} must be positive, keeping {}", threshold, self.threshold);
            return self;
        }
        self.threshold = threshold;
        self
    }

    /// Builder method to set the seasonal period.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    /// Builder method to set the ESD significance level.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        if !(0.0..1.0).contains(&alpha) || alpha == 0.0 {
            tracing::warn!("alpha {} clamped to (0.0, 1.0)", alpha);
            self.alpha = alpha.clamp(f64::MIN_POSITIVE, 0.999);
            return self;
        }
        self.alpha = alpha;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold(self.threshold));
        }
        if !(0.0..1.0).contains(&self.alpha) || self.alpha == 0.0 {
            return Err(ConfigValidationError::InvalidAlpha(self.alpha));
        }
        Ok(())
    }
}

/// Driver analysis method.
///
/// Unknown method names deserialize to the default (importance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DriverMethod {
    /// Correlation weighted by relative feature variance
    #[default]
    Importance,
    /// Plain Pearson correlation magnitude
    Correlation,
}

impl<'de> Deserialize<'de> for DriverMethod {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(name.parse().unwrap_or_default())
    }
}

impl std::fmt::Display for DriverMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverMethod::Importance => write!(f, "importance"),
            DriverMethod::Correlation => write!(f, "correlation"),
        }
    }
}

impl std::str::FromStr for DriverMethod {
    type Err = std::convert::Infallible;

    /// Parses a method name, falling back to the default for unknown input.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "importance" => Ok(DriverMethod::Importance),
            "correlation" => Ok(DriverMethod::Correlation),
            other => {
                tracing::warn!(
                    "Unknown driver analysis method '{}', falling back to '{}'",
                    other,
                    DriverMethod::default()
                );
                Ok(DriverMethod::default())
            }
        }
    }
}

/// Driver analysis configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Ranking method
    pub method: DriverMethod,
    /// Maximum number of drivers to return
    pub top_n: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            method: DriverMethod::Importance,
            top_n: 5,
        }
    }
}

impl DriverConfig {
    /// Creates a new driver config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the ranking method.
    pub fn with_method(mut self, method: DriverMethod) -> Self {
        self.method = method;
        self
    }

    /// Builder method to set the ranking depth.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        if top_n == 0 {
            tracing::warn!("top_n 0 would suppress all drivers, keeping {}", self.top_n);
            return self;
        }
        self.top_n = top_n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.top_n == 0 {
            return Err(ConfigValidationError::InvalidTopN);
        }
        Ok(())
    }
}

/// Combined configuration for a full insights run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Anomaly detection settings
    pub anomaly: AnomalyConfig,
    /// Driver analysis settings
    pub drivers: DriverConfig,
}

impl InsightsConfig {
    /// Creates a new insights config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the anomaly detection config.
    pub fn with_anomaly(mut self, anomaly: AnomalyConfig) -> Self {
        self.anomaly = anomaly;
        self
    }

    /// Builder method to set the driver analysis config.
    pub fn with_drivers(mut self, drivers: DriverConfig) -> Self {
        self.drivers = drivers;
        self
    }

    /// Validates all component configurations.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        self.anomaly.validate()?;
        self.drivers.validate()
    }
}

/// Validation errors for insights configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("threshold must be positive, got {0}")]
    InvalidThreshold(f64),
    #[error("alpha must be in (0.0, 1.0), got {0}")]
    InvalidAlpha(f64),
    #[error("top_n must be at least 1")]
    InvalidTopN,
}
