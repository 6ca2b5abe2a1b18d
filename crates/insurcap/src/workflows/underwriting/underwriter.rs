use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::classifier::FALLBACK_CATEGORY;
use super::domain::{
    round2, ClassificationResult, PolicyType, RiskComponent, RiskDetails, RiskEvaluation,
};
use super::error::{ScoringError, TableError};
use super::policy::PolicyCatalog;

/// Rating tables for the underwriter.
///
/// `risk_score = clamp(base_rate[category] + Σ hazard_weights[risk], 0, 1)` and
/// `premium = base_premium[policy] × (1 + premium_loading × risk_score)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwriterConfig {
    pub base_rates: BTreeMap<String, f64>,
    pub hazard_weights: BTreeMap<String, f64>,
    pub base_premiums: BTreeMap<PolicyType, f64>,
    pub premium_loading: f64,
}

impl UnderwriterConfig {
    pub fn standard() -> Self {
        let base_rates = [
            ("avtomobilsko", 0.2),
            ("nepremičninsko", 0.1),
            ("zdravstveno", 0.15),
            ("življenjsko", 0.1),
            (FALLBACK_CATEGORY, 0.0),
        ]
        .into_iter()
        .map(|(category, rate)| (category.to_string(), rate))
        .collect();

        let hazard_weights = [
            ("požar", 0.3),
            ("poplava", 0.25),
            ("vlom", 0.2),
            ("potres", 0.25),
        ]
        .into_iter()
        .map(|(hazard, weight)| (hazard.to_string(), weight))
        .collect();

        let base_premiums = [
            ("avtomobilsko", 450.0),
            ("nepremičninsko", 300.0),
            ("zdravstveno", 600.0),
            ("življenjsko", 250.0),
        ]
        .into_iter()
        .map(|(policy, premium)| (PolicyType::new(policy), premium))
        .collect();

        Self {
            base_rates,
            hazard_weights,
            base_premiums,
            premium_loading: 1.5,
        }
    }
}

/// Turns a classification into a risk score, policy suggestion and premium.
#[derive(Debug, Clone)]
pub struct Underwriter {
    config: UnderwriterConfig,
    products: BTreeSet<PolicyType>,
}

impl Underwriter {
    pub fn new(config: UnderwriterConfig, catalog: &PolicyCatalog) -> Result<Self, TableError> {
        let weights = config
            .base_rates
            .iter()
            .chain(config.hazard_weights.iter())
            .map(|(name, weight)| (name.as_str(), *weight))
            .chain(std::iter::once(("premium_loading", config.premium_loading)));
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(TableError::InvalidWeight {
                    name: name.to_string(),
                    weight,
                });
            }
        }

        for policy_type in catalog.policy_types() {
            match config.base_premiums.get(policy_type) {
                Some(premium) if premium.is_finite() && *premium >= 0.0 => {}
                Some(premium) => {
                    return Err(TableError::InvalidWeight {
                        name: policy_type.to_string(),
                        weight: *premium,
                    })
                }
                None => return Err(TableError::MissingPremium(policy_type.clone())),
            }
        }

        Ok(Self {
            products: catalog.policy_types().cloned().collect(),
            config,
        })
    }

    /// Whether `category` has a base rate, i.e. whether it can be scored at all.
    pub fn rates(&self, category: &str) -> bool {
        self.config.base_rates.contains_key(category)
    }

    pub fn evaluate(
        &self,
        classification: &ClassificationResult,
    ) -> Result<RiskEvaluation, ScoringError> {
        let details = self.score(classification).inspect_err(|err| {
            error!(stage = "underwriter", %err, "risk scoring failed");
        })?;

        let risk_score = round2(details.raw_score.clamp(0.0, 1.0));
        let suggested_policy = self.suggest_policy(&classification.category);
        let premium = self.premium_for(&suggested_policy, risk_score);

        debug!(risk_score, %suggested_policy, premium, "risk evaluated");

        Ok(RiskEvaluation {
            risk_score,
            suggested_policy,
            premium,
            details,
        })
    }

    /// Premium for a policy at a given score; zero for products without a price.
    pub fn premium_for(&self, policy_type: &PolicyType, risk_score: f64) -> f64 {
        match self.config.base_premiums.get(policy_type) {
            Some(base) => round2(base * (1.0 + self.config.premium_loading * risk_score)),
            None => 0.0,
        }
    }

    fn score(&self, classification: &ClassificationResult) -> Result<RiskDetails, ScoringError> {
        let category = &classification.category;
        let base_rate = *self
            .config
            .base_rates
            .get(category)
            .ok_or_else(|| ScoringError::UnratedCategory(category.clone()))?;

        let mut components = vec![RiskComponent {
            source: format!("kategorija:{category}"),
            contribution: base_rate,
            notes: format!("osnovna stopnja tveganja {base_rate:.2}"),
        }];
        let mut raw_score = base_rate;

        for hazard in &classification.risks {
            let weight = *self
                .config
                .hazard_weights
                .get(hazard)
                .ok_or_else(|| ScoringError::UnweightedHazard(hazard.clone()))?;
            raw_score += weight;
            components.push(RiskComponent {
                source: format!("nevarnost:{hazard}"),
                contribution: weight,
                notes: format!("zaznana nevarnost {hazard} (utež {weight:.2})"),
            });
        }

        Ok(RiskDetails {
            category: category.clone(),
            raw_score,
            components,
        })
    }

    fn suggest_policy(&self, category: &str) -> PolicyType {
        let candidate = PolicyType::new(category);
        if self.products.contains(&candidate) {
            candidate
        } else {
            PolicyType::unknown()
        }
    }
}
