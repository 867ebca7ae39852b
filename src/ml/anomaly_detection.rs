//! Rule-based anomaly classification, used whenever no learned detector is
//! available. Rules are ordered and mutually exclusive: evaluation stops at
//! the first match.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::anomaly::Severity;
use crate::errors::ServiceError;
use crate::ingestion::FeatureVector;

/// Confidence label attached to rule matches.
pub const CONFIDENCE_HIGH: &str = "High";

/// Confidence label for readings classified as normal.
pub const CONFIDENCE_NORMAL: &str = "Normal";

/// Known anomaly categories. Learned detectors may emit labels outside this
/// set; those are carried through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyType {
    GradualDegradation,
    CellFailure,
    Overheating,
    Other(String),
}

impl AnomalyType {
    pub fn label(&self) -> &str {
        match self {
            AnomalyType::GradualDegradation => "Gradual Degradation",
            AnomalyType::CellFailure => "Cell Failure",
            AnomalyType::Overheating => "Overheating",
            AnomalyType::Other(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Gradual Degradation" => AnomalyType::GradualDegradation,
            "Cell Failure" => AnomalyType::CellFailure,
            "Overheating" => AnomalyType::Overheating,
            other => AnomalyType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of one classification, learned or rule-based. Persistence is the
/// lifecycle manager's job; a classification on its own stores nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub is_anomaly: bool,
    pub anomaly_type: Option<AnomalyType>,
    pub severity: Severity,
    pub confidence: String,
    /// Isolation Forest score, when a learned detector supplied one
    pub isolation_score: Option<f64>,
    /// Autoencoder reconstruction error, when supplied
    pub reconstruction_error: Option<f64>,
}

impl Classification {
    pub fn normal() -> Self {
        Self {
            is_anomaly: false,
            anomaly_type: None,
            severity: Severity::Low,
            confidence: CONFIDENCE_NORMAL.to_string(),
            isolation_score: None,
            reconstruction_error: None,
        }
    }

    fn rule_match(anomaly_type: AnomalyType, severity: Severity) -> Self {
        Self {
            is_anomaly: true,
            anomaly_type: Some(anomaly_type),
            severity,
            confidence: CONFIDENCE_HIGH.to_string(),
            isolation_score: None,
            reconstruction_error: None,
        }
    }
}

/// Thresholds for the classification rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleThresholds {
    /// Efficiency below this is gradual degradation
    pub degradation_efficiency: f64,
    /// Max power below this is a cell failure, in watts
    pub cell_failure_power_w: f64,
    /// Cell temperature above this is overheating, in degC
    pub overheating_cell_temp_c: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            degradation_efficiency: 0.12,
            cell_failure_power_w: 200.0,
            overheating_cell_temp_c: 80.0,
        }
    }
}

/// Classifies a module reading with the default thresholds.
pub fn rule_classify(features: &FeatureVector) -> Result<Classification, ServiceError> {
    rule_classify_with_thresholds(features, &RuleThresholds::default())
}

/// Classifies a module reading. First matching rule wins; later rules are
/// not evaluated.
pub fn rule_classify_with_thresholds(
    features: &FeatureVector,
    thresholds: &RuleThresholds,
) -> Result<Classification, ServiceError> {
    let efficiency = features.require("efficiency")?;
    let power_max = features.require("power_max")?;
    let cell_temp = features.require("cell_temp")?;

    let classification = if efficiency < thresholds.degradation_efficiency {
        Classification::rule_match(AnomalyType::GradualDegradation, Severity::Medium)
    } else if power_max < thresholds.cell_failure_power_w {
        Classification::rule_match(AnomalyType::CellFailure, Severity::High)
    } else if cell_temp > thresholds.overheating_cell_temp_c {
        Classification::rule_match(AnomalyType::Overheating, Severity::High)
    } else {
        Classification::normal()
    };

    Ok(classification)
}
