//! Underwriting pipeline: a free-text insurance enquiry becomes a product
//! category with hazards, a risk score and premium, a draft policy, a weighted
//! exposure breakdown and an environmental impact estimate.

pub mod classifier;
pub mod domain;
pub mod error;
pub mod exposure;
pub mod impact;
pub mod pipeline;
pub mod policy;
pub mod router;
pub mod tables;
pub mod underwriter;

#[cfg(test)]
mod tests;

pub use classifier::{Classifier, ClassifierConfig, KeywordRule, FALLBACK_CATEGORY};
pub use domain::{
    CarbonFootprint, ClassificationResult, ClassifierInput, ExposureResult, FactorInput,
    ImpactResult, PolicyDraft, PolicyStatus, PolicyTerms, PolicyType, RequestId, RiskComponent,
    RiskDetails, RiskEvaluation, RiskFactorAssessment, Severity, WeatherImpact, UNKNOWN_POLICY,
};
pub use error::{
    AssemblyError, ClassificationError, ExposureError, ImpactError, ScoringError, SourceError,
    TableError, UnderwritingError,
};
pub use exposure::{ExposureAnalyzer, ExposureConfig, FactorWeight, NormalizationRange};
pub use impact::{
    CarbonFootprintSource, ImpactConfig, ImpactEstimator, ImpactQuery, OfflineImpactSources,
    WeatherImpactSource,
};
pub use pipeline::{UnderwritingPipeline, UnderwritingReport, UnderwritingRequest, DEFAULT_LOCATION};
pub use policy::{PolicyAssembler, PolicyCatalog, TermsTemplate};
pub use router::{underwriting_router, ExposureRequest};
pub use tables::UnderwritingTables;
pub use underwriter::{Underwriter, UnderwriterConfig};
