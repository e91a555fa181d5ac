//! Deterministic narrative generation for insights reports.
//!
//! The narrative is assembled from fixed templates over a centralized
//! vocabulary, so identical analysis results always produce identical
//! text and unit tests can assert on substrings. There is no model call
//! and no randomness here.

use super::models::{AnomalyResult, Direction, DriverAnalysisResult, Severity, TrendDirection, TrendResult};

/// Centralized vocabulary for narrative assembly.
///
/// Every word choice the generator can make lives here; the templates
/// below only concatenate.
mod vocab {
    use super::{Direction, Severity, TrendDirection};

    pub(super) fn trend_word(direction: TrendDirection) -> &'static str {
        match direction {
            TrendDirection::Increasing => "upward",
            TrendDirection::Decreasing => "downward",
            TrendDirection::Stable => "flat",
        }
    }

    pub(super) fn strength_adjective(strength: f64) -> &'static str {
        if strength < 0.3 {
            "weak"
        } else if strength < 0.7 {
            "moderate"
        } else {
            "strong"
        }
    }

    pub(super) fn severity_word(severity: Severity) -> &'static str {
        match severity {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub(super) fn direction_phrase(direction: Direction) -> &'static str {
        match direction {
            Direction::Positive => "moving with the metric",
            Direction::Negative => "moving against the metric",
        }
    }
}

/// Renders a deterministic text summary of one analysis run.
///
/// The summary always characterizes the trend (direction plus a
/// qualitative magnitude), always states whether anomalies were found,
/// and names the top driver with its importance and direction whenever
/// any drivers exist.
pub fn generate(
    trend: &TrendResult,
    anomalies: &AnomalyResult,
    drivers: &DriverAnalysisResult,
) -> String {
    let mut sentences = Vec::with_capacity(3);
    sentences.push(trend_sentence(trend));
    sentences.push(anomaly_sentence(anomalies));
    if let Some(sentence) = driver_sentence(drivers) {
        sentences.push(sentence);
    }

    sentences.join(" ")
}

fn trend_sentence(trend: &TrendResult) -> String {
    let percent = trend.change_rate * 100.0;
    match trend.direction {
        TrendDirection::Stable => format!(
            "The metric held {} over the period ({:+.1}% net change).",
            vocab::trend_word(trend.direction),
            percent
        ),
        _ => format!(
            "The metric shows a {} {} trend ({:+.1}% over the period).",
            vocab::strength_adjective(trend.strength),
            vocab::trend_word(trend.direction),
            percent
        ),
    }
}

fn anomaly_sentence(anomalies: &AnomalyResult) -> String {
    let count = anomalies.anomalies.len();
    match count {
        0 => "No anomalies were detected.".to_string(),
        1 => {
            let anomaly = &anomalies.anomalies[0];
            format!(
                "1 anomaly was detected at {} ({} severity).",
                anomaly.timestamp,
                vocab::severity_word(anomaly.severity)
            )
        }
        _ => {
            // Severity tiers are ordered, so max is the worst
            let worst = anomalies
                .anomalies
                .iter()
                .map(|a| a.severity)
                .max()
                .unwrap_or(Severity::Low);
            format!(
                "{} anomalies were detected, the most severe rated {}.",
                count,
                vocab::severity_word(worst)
            )
        }
    }
}

fn driver_sentence(drivers: &DriverAnalysisResult) -> Option<String> {
    let top = drivers.drivers.first()?;
    Some(format!(
        "The leading driver is \"{}\" (importance {:.2}, {}).",
        top.feature,
        top.importance,
        vocab::direction_phrase(top.direction)
    ))
}
