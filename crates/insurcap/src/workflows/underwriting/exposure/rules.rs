use std::collections::BTreeMap;

use super::super::domain::{FactorInput, RiskFactorAssessment, Severity};
use super::super::error::ExposureError;
use super::config::{ExposureConfig, FactorWeight};

/// Score assigned to a factor that has no usable input.
pub(crate) const UNKNOWN_FACTOR_SCORE: f64 = 0.5;

pub(crate) fn assess_factor(
    entry: &FactorWeight,
    inputs: &BTreeMap<String, FactorInput>,
    config: &ExposureConfig,
) -> Result<RiskFactorAssessment, ExposureError> {
    let score = resolve_score(&entry.factor, inputs.get(&entry.factor), config)?;

    Ok(RiskFactorAssessment {
        factor: entry.factor.clone(),
        score,
        weight: entry.weight,
        impact: score * entry.weight,
        severity: Severity::from_score(score),
    })
}

fn resolve_score(
    factor: &str,
    input: Option<&FactorInput>,
    config: &ExposureConfig,
) -> Result<f64, ExposureError> {
    match input {
        Some(FactorInput::Numeric(value)) if !value.is_finite() => {
            Err(ExposureError::NonFiniteValue {
                factor: factor.to_string(),
            })
        }
        Some(FactorInput::Numeric(value)) => Ok(config.range_for(factor).normalize(*value)),
        Some(FactorInput::Category(label)) => Ok(config
            .category_scores
            .get(factor)
            .and_then(|scores| scores.get(label.as_str()))
            .copied()
            .unwrap_or(UNKNOWN_FACTOR_SCORE)),
        Some(FactorInput::Other(_)) | None => Ok(UNKNOWN_FACTOR_SCORE),
    }
}

pub(crate) fn mitigation_for(assessment: &RiskFactorAssessment) -> Option<String> {
    match assessment.severity {
        Severity::High => Some(format!(
            "Zmanjšajte {} z dodatnimi varnostnimi ukrepi",
            assessment.factor
        )),
        Severity::Medium => Some(format!(
            "Spremljajte {} in načrtujte preventivne ukrepe",
            assessment.factor
        )),
        Severity::Low => None,
    }
}

/// Share of factors resolved from real input rather than the unknown default.
pub(crate) fn confidence(assessments: &[RiskFactorAssessment]) -> f64 {
    if assessments.is_empty() {
        return 0.0;
    }

    let known = assessments
        .iter()
        .filter(|assessment| assessment.score != UNKNOWN_FACTOR_SCORE)
        .count();
    known as f64 / assessments.len() as f64
}
