use super::domain::PolicyType;

/// Violations of the static decision tables, detected when components are built.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("keyword rule '{rule}' has no usable keywords")]
    EmptyKeywords { rule: String },
    #[error("factor weights for '{policy_type}' sum to {sum}, expected 1.0")]
    WeightSum { policy_type: PolicyType, sum: f64 },
    #[error("weight for '{name}' must be a finite non-negative number (found {weight})")]
    InvalidWeight { name: String, weight: f64 },
    #[error("normalization range for '{factor}' is invalid ({min}..{max})")]
    InvalidRange { factor: String, min: f64, max: f64 },
    #[error("category score for '{factor}'/'{label}' must lie in [0, 1] (found {score})")]
    InvalidCategoryScore {
        factor: String,
        label: String,
        score: f64,
    },
    #[error("no premium configured for policy type '{0}'")]
    MissingPremium(PolicyType),
    #[error("no base rate configured for category '{0}'")]
    MissingBaseRate(String),
    #[error("exclusions configured for '{0}' which has no coverage entry")]
    OrphanExclusions(PolicyType),
}

#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("request is blank after coercion to text")]
    BlankRequest,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("hazard '{0}' has no configured weight")]
    UnweightedHazard(String),
    #[error("category '{0}' has no configured base rate")]
    UnratedCategory(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("risk score {0} is outside [0, 1]")]
    RiskScoreOutOfRange(f64),
    #[error("premium {0} is not a finite non-negative amount")]
    InvalidPremium(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum ExposureError {
    #[error("factor '{factor}' received a non-finite value")]
    NonFiniteValue { factor: String },
}

/// Failure reported by an external impact data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ImpactError {
    #[error("{service} lookup failed: {source}")]
    Source {
        service: &'static str,
        source: SourceError,
    },
    #[error("{service} lookup timed out after {timeout_ms} ms")]
    Timeout {
        service: &'static str,
        timeout_ms: u64,
    },
}

/// Error raised by the underwriting pipeline; the first failing stage aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum UnderwritingError {
    #[error("classification failed: {0}")]
    Classification(#[from] ClassificationError),
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
    #[error("policy assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
    #[error("exposure analysis failed: {0}")]
    Exposure(#[from] ExposureError),
    #[error("impact estimate failed: {0}")]
    Impact(#[from] ImpactError),
}

impl UnderwritingError {
    /// Name of the stage that produced the error, as used in log fields.
    pub const fn stage(&self) -> &'static str {
        match self {
            UnderwritingError::Classification(_) => "classifier",
            UnderwritingError::Scoring(_) => "underwriter",
            UnderwritingError::Assembly(_) => "policy",
            UnderwritingError::Exposure(_) => "exposure",
            UnderwritingError::Impact(_) => "impact",
        }
    }
}
