use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel policy type for requests that map to no product in the catalog.
pub const UNKNOWN_POLICY: &str = "neznano";

/// Identifier attached to a pipeline run so log lines can be correlated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product line name keying the coverage, exclusion, premium and factor tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyType(pub String);

impl PolicyType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_POLICY.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_POLICY
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw request handed to the classifier: free text or any structured payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassifierInput {
    Text(String),
    Structured(serde_json::Value),
}

impl ClassifierInput {
    /// Coerce the input to the text the keyword tables are matched against.
    pub fn render(&self) -> String {
        match self {
            ClassifierInput::Text(text) => text.clone(),
            ClassifierInput::Structured(serde_json::Value::String(text)) => text.clone(),
            ClassifierInput::Structured(value) => value.to_string(),
        }
    }
}

impl From<&str> for ClassifierInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ClassifierInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Category and hazards detected in a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: String,
    pub risks: Vec<String>,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}

/// Discrete contribution to a risk score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskComponent {
    pub source: String,
    pub contribution: f64,
    pub notes: String,
}

/// Supporting detail behind a risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDetails {
    pub category: String,
    /// Sum of all contributions before clamping to [0, 1].
    pub raw_score: f64,
    pub components: Vec<RiskComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvaluation {
    pub risk_score: f64,
    pub suggested_policy: PolicyType,
    pub premium: f64,
    pub details: RiskDetails,
}

/// Lifecycle marker of an assembled policy. Drafts are never promoted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    Draft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTerms {
    pub duration: String,
    pub payment_frequency: String,
    pub waiting_period: String,
    pub coverage_details: BTreeMap<String, bool>,
    pub special_conditions: Vec<String>,
}

/// Draft policy produced by the assembler. Coverage is ordered by priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDraft {
    pub policy_type: PolicyType,
    pub coverage: Vec<String>,
    pub exclusions: Vec<String>,
    pub terms: PolicyTerms,
    pub created_at: DateTime<Utc>,
    pub status: PolicyStatus,
}

/// Value supplied for an exposure factor so scoring can consume structured data.
///
/// Deserialization is untagged: JSON numbers become `Numeric`, strings become
/// `Category` and every other shape lands in `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactorInput {
    Numeric(f64),
    Category(String),
    Other(serde_json::Value),
}

impl From<f64> for FactorInput {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for FactorInput {
    fn from(value: &str) -> Self {
        Self::Category(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const LOW_CUTOFF: f64 = 0.3;
    pub const HIGH_CUTOFF: f64 = 0.7;

    /// Each bucket includes its lower bound: 0.3 is medium, 0.7 is high.
    pub fn from_score(score: f64) -> Self {
        if score < Self::LOW_CUTOFF {
            Severity::Low
        } else if score < Self::HIGH_CUTOFF {
            Severity::Medium
        } else {
            Severity::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorAssessment {
    pub factor: String,
    pub score: f64,
    pub weight: f64,
    pub impact: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureResult {
    pub exposure_score: f64,
    pub risk_factors: Vec<RiskFactorAssessment>,
    pub mitigation_suggestions: Vec<String>,
    pub confidence_level: f64,
    pub analyzed_at: DateTime<Utc>,
}

/// Emission estimate returned by the carbon data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonFootprint {
    pub activity: String,
    pub co2e_kg: f64,
    pub source: String,
}

/// Extreme-weather outlook returned by the weather data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherImpact {
    pub location: String,
    pub extreme_event_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_hazard: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub esg_score: f64,
    pub carbon_footprint: CarbonFootprint,
    pub weather_impact: WeatherImpact,
    pub sustainability_suggestions: Vec<String>,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
