use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};

use super::classifier::Classifier;
use super::domain::{
    CarbonFootprint, ClassificationResult, ClassifierInput, ExposureResult, FactorInput,
    ImpactResult, PolicyDraft, PolicyTerms, PolicyType, RequestId, RiskEvaluation,
    RiskFactorAssessment, WeatherImpact,
};
use super::error::{TableError, UnderwritingError};
use super::exposure::ExposureAnalyzer;
use super::impact::{CarbonFootprintSource, ImpactEstimator, WeatherImpactSource};
use super::policy::PolicyAssembler;
use super::tables::UnderwritingTables;
use super::underwriter::Underwriter;

pub const DEFAULT_LOCATION: &str = "Ljubljana";

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

/// One insurance enquiry as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingRequest {
    pub request: ClassifierInput,
    #[serde(default)]
    pub factors: BTreeMap<String, FactorInput>,
    #[serde(default)]
    pub location: Option<String>,
}

impl UnderwritingRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            request: ClassifierInput::Text(text.into()),
            factors: BTreeMap::new(),
            location: None,
        }
    }

    pub fn with_factor(mut self, name: &str, value: impl Into<FactorInput>) -> Self {
        self.factors.insert(name.to_string(), value.into());
        self
    }

    pub fn at(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }
}

/// Composite result of a pipeline run, consumed by presentation and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingReport {
    pub category: String,
    pub risks: Vec<String>,
    pub recommendation: String,
    pub risk_score: f64,
    pub suggested_policy: PolicyType,
    pub premium: f64,
    pub policy_type: PolicyType,
    pub coverage: Vec<String>,
    pub exclusions: Vec<String>,
    pub terms: PolicyTerms,
    pub exposure_score: f64,
    pub risk_factors: Vec<RiskFactorAssessment>,
    pub mitigation_suggestions: Vec<String>,
    pub confidence_level: f64,
    pub esg_score: f64,
    pub carbon_footprint: CarbonFootprint,
    pub weather_impact: WeatherImpact,
    pub sustainability_suggestions: Vec<String>,
}

impl UnderwritingReport {
    fn compose(
        classification: ClassificationResult,
        evaluation: RiskEvaluation,
        draft: PolicyDraft,
        exposure: ExposureResult,
        impact: ImpactResult,
    ) -> Self {
        Self {
            category: classification.category,
            risks: classification.risks,
            recommendation: classification.recommendation,
            risk_score: evaluation.risk_score,
            suggested_policy: evaluation.suggested_policy,
            premium: evaluation.premium,
            policy_type: draft.policy_type,
            coverage: draft.coverage,
            exclusions: draft.exclusions,
            terms: draft.terms,
            exposure_score: exposure.exposure_score,
            risk_factors: exposure.risk_factors,
            mitigation_suggestions: exposure.mitigation_suggestions,
            confidence_level: exposure.confidence_level,
            esg_score: impact.esg_score,
            carbon_footprint: impact.carbon_footprint,
            weather_impact: impact.weather_impact,
            sustainability_suggestions: impact.sustainability_suggestions,
        }
    }
}

/// Classifier, underwriter, assembler, exposure analyzer and impact estimator
/// wired in order. Holds no per-request state.
pub struct UnderwritingPipeline<C, W> {
    classifier: Classifier,
    underwriter: Underwriter,
    assembler: PolicyAssembler,
    exposure: ExposureAnalyzer,
    impact: ImpactEstimator<C, W>,
    default_location: String,
}

impl<C, W> UnderwritingPipeline<C, W>
where
    C: CarbonFootprintSource + 'static,
    W: WeatherImpactSource + 'static,
{
    pub fn new(
        tables: UnderwritingTables,
        carbon: Arc<C>,
        weather: Arc<W>,
    ) -> Result<Self, TableError> {
        let UnderwritingTables {
            classifier,
            underwriter,
            catalog,
            exposure,
            impact,
        } = tables;

        let classifier = Classifier::new(classifier)?;
        let underwriter = Underwriter::new(underwriter, &catalog)?;
        if let Some(unrated) = classifier
            .categories()
            .find(|category| !underwriter.rates(category))
        {
            return Err(TableError::MissingBaseRate(unrated.to_string()));
        }

        Ok(Self {
            classifier,
            underwriter,
            assembler: PolicyAssembler::new(catalog)?,
            exposure: ExposureAnalyzer::new(exposure)?,
            impact: ImpactEstimator::new(carbon, weather, impact),
            default_location: DEFAULT_LOCATION.to_string(),
        })
    }

    /// Location used for weather lookups when a request names none.
    pub fn with_default_location(mut self, location: impl Into<String>) -> Self {
        self.default_location = location.into();
        self
    }

    pub fn exposure(&self) -> &ExposureAnalyzer {
        &self.exposure
    }

    /// Run every stage for one request. The first failing stage aborts the run.
    pub async fn run(
        &self,
        request: UnderwritingRequest,
    ) -> Result<UnderwritingReport, UnderwritingError> {
        let request_id = next_request_id();
        let span = info_span!("underwriting", request_id = %request_id);
        self.execute(request).instrument(span).await
    }

    async fn execute(
        &self,
        request: UnderwritingRequest,
    ) -> Result<UnderwritingReport, UnderwritingError> {
        let UnderwritingRequest {
            request,
            factors,
            location,
        } = request;

        let classification = self.classifier.classify(&request)?;
        let evaluation = self.underwriter.evaluate(&classification)?;
        let draft = self.assembler.draft(&evaluation)?;
        let exposure = self.exposure.analyze_draft(&draft, &factors)?;

        let location = location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .unwrap_or(self.default_location.as_str());
        let impact = self.impact.estimate(&draft, location).await?;

        info!(
            category = %classification.category,
            policy_type = %draft.policy_type,
            risk_score = evaluation.risk_score,
            exposure_score = exposure.exposure_score,
            esg_score = impact.esg_score,
            "underwriting completed"
        );

        Ok(UnderwritingReport::compose(
            classification,
            evaluation,
            draft,
            exposure,
            impact,
        ))
    }
}
