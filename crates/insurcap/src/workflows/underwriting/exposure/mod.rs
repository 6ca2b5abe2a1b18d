mod config;
mod rules;

pub use config::{ExposureConfig, FactorWeight, NormalizationRange};

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, error};

use super::domain::{round2, ExposureResult, FactorInput, PolicyDraft, PolicyType};
use super::error::{ExposureError, TableError};

/// Stateless analyzer that applies the factor tables to raw factor inputs.
#[derive(Debug, Clone)]
pub struct ExposureAnalyzer {
    config: ExposureConfig,
}

impl ExposureAnalyzer {
    pub fn new(config: ExposureConfig) -> Result<Self, TableError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Weighted exposure for `policy_type`. Input keys that name no configured
    /// factor are ignored; an unknown policy type has no factors at all.
    pub fn analyze(
        &self,
        policy_type: &PolicyType,
        inputs: &BTreeMap<String, FactorInput>,
    ) -> Result<ExposureResult, ExposureError> {
        let weights = self
            .config
            .factors
            .get(policy_type)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let risk_factors = weights
            .iter()
            .map(|entry| rules::assess_factor(entry, inputs, &self.config))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| {
                error!(stage = "exposure", %policy_type, %err, "exposure analysis failed");
            })?;

        let exposure_score = round2(risk_factors.iter().map(|factor| factor.impact).sum());
        let mitigation_suggestions = risk_factors
            .iter()
            .filter_map(rules::mitigation_for)
            .collect();
        let confidence_level = round2(rules::confidence(&risk_factors));

        debug!(%policy_type, exposure_score, confidence_level, "exposure analyzed");

        Ok(ExposureResult {
            exposure_score,
            risk_factors,
            mitigation_suggestions,
            confidence_level,
            analyzed_at: Utc::now(),
        })
    }

    pub fn analyze_draft(
        &self,
        draft: &PolicyDraft,
        inputs: &BTreeMap<String, FactorInput>,
    ) -> Result<ExposureResult, ExposureError> {
        self.analyze(&draft.policy_type, inputs)
    }
}
