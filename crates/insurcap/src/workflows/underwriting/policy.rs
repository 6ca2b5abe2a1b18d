use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::domain::{PolicyDraft, PolicyStatus, PolicyTerms, PolicyType, RiskEvaluation};
use super::error::{AssemblyError, TableError};

const FULL_COVERAGE_ABOVE: f64 = 0.7;
const REDUCED_COVERAGE_ABOVE: f64 = 0.4;
const BASIC_COVERAGE_ITEMS: usize = 2;
const INSPECTION_ABOVE: f64 = 0.8;
const DOCUMENTATION_ABOVE: f64 = 0.6;

const PRE_INSPECTION: &str = "Potreben predhodni ogled";
const ADDITIONAL_DOCUMENTATION: &str = "Potrebna dodatna dokumentacija";

/// Fixed wording of the terms block shared by every draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsTemplate {
    pub duration: String,
    pub payment_frequency: String,
    pub waiting_period: String,
}

impl Default for TermsTemplate {
    fn default() -> Self {
        Self {
            duration: "1 leto".to_string(),
            payment_frequency: "mesečno".to_string(),
            waiting_period: "30 dni".to_string(),
        }
    }
}

/// Coverage and exclusion tables per policy type.
///
/// Coverage items are listed highest priority first; lower risk scores drop
/// items from the tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCatalog {
    pub coverage: BTreeMap<PolicyType, Vec<String>>,
    pub exclusions: BTreeMap<PolicyType, Vec<String>>,
    pub terms: TermsTemplate,
}

impl PolicyCatalog {
    pub fn standard() -> Self {
        let coverage = [
            (
                "avtomobilsko",
                &["osnovno", "delni kasko", "polni kasko", "asistenca"][..],
            ),
            ("nepremičninsko", &["požar", "vlom", "poplave", "potres"][..]),
            (
                "zdravstveno",
                &["osnovno", "dodatno", "zobozdravstvo", "specialistični pregledi"][..],
            ),
            (
                "življenjsko",
                &["smrt", "nezgoda", "kritične bolezni", "varčevanje"][..],
            ),
        ];
        let exclusions = [
            ("avtomobilsko", &["namerna škoda", "vožnja pod vplivom"][..]),
            ("nepremičninsko", &["vojna", "jedrska nesreča"][..]),
            ("zdravstveno", &["predhodne bolezni", "kozmetični posegi"][..]),
            ("življenjsko", &["samomor v prvem letu", "ekstremni športi"][..]),
        ];

        Self {
            coverage: table(&coverage),
            exclusions: table(&exclusions),
            terms: TermsTemplate::default(),
        }
    }

    pub fn policy_types(&self) -> impl Iterator<Item = &PolicyType> {
        self.coverage.keys()
    }
}

fn table(rows: &[(&str, &[&str])]) -> BTreeMap<PolicyType, Vec<String>> {
    rows.iter()
        .map(|(policy, items)| {
            (
                PolicyType::new(*policy),
                items.iter().map(|item| item.to_string()).collect(),
            )
        })
        .collect()
}

/// Builds draft policies from risk evaluations using score thresholds.
#[derive(Debug, Clone)]
pub struct PolicyAssembler {
    catalog: PolicyCatalog,
}

impl PolicyAssembler {
    pub fn new(catalog: PolicyCatalog) -> Result<Self, TableError> {
        if let Some(orphan) = catalog
            .exclusions
            .keys()
            .find(|policy_type| !catalog.coverage.contains_key(*policy_type))
        {
            return Err(TableError::OrphanExclusions(orphan.clone()));
        }

        Ok(Self { catalog })
    }

    pub fn catalog(&self) -> &PolicyCatalog {
        &self.catalog
    }

    pub fn draft(&self, evaluation: &RiskEvaluation) -> Result<PolicyDraft, AssemblyError> {
        let risk_score = evaluation.risk_score;
        if !risk_score.is_finite() || !(0.0..=1.0).contains(&risk_score) {
            let err = AssemblyError::RiskScoreOutOfRange(risk_score);
            error!(stage = "policy", %err, "policy assembly failed");
            return Err(err);
        }
        if !evaluation.premium.is_finite() || evaluation.premium < 0.0 {
            let err = AssemblyError::InvalidPremium(evaluation.premium);
            error!(stage = "policy", %err, "policy assembly failed");
            return Err(err);
        }

        let policy_type = evaluation.suggested_policy.clone();
        let coverage = self.select_coverage(&policy_type, risk_score);
        let exclusions = self
            .catalog
            .exclusions
            .get(&policy_type)
            .cloned()
            .unwrap_or_default();
        let terms = self.terms_for(&coverage, risk_score);

        debug!(%policy_type, coverage = coverage.len(), "policy draft assembled");

        Ok(PolicyDraft {
            policy_type,
            coverage,
            exclusions,
            terms,
            created_at: Utc::now(),
            status: PolicyStatus::Draft,
        })
    }

    fn select_coverage(&self, policy_type: &PolicyType, risk_score: f64) -> Vec<String> {
        let base = self
            .catalog
            .coverage
            .get(policy_type)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let selected = if risk_score > FULL_COVERAGE_ABOVE {
            base
        } else if risk_score > REDUCED_COVERAGE_ABOVE {
            &base[..base.len().saturating_sub(1)]
        } else {
            &base[..base.len().min(BASIC_COVERAGE_ITEMS)]
        };

        selected.to_vec()
    }

    fn terms_for(&self, coverage: &[String], risk_score: f64) -> PolicyTerms {
        let template = &self.catalog.terms;
        PolicyTerms {
            duration: template.duration.clone(),
            payment_frequency: template.payment_frequency.clone(),
            waiting_period: template.waiting_period.clone(),
            coverage_details: coverage.iter().map(|item| (item.clone(), true)).collect(),
            special_conditions: special_conditions(risk_score),
        }
    }
}

fn special_conditions(risk_score: f64) -> Vec<String> {
    let mut conditions = Vec::new();
    if risk_score > INSPECTION_ABOVE {
        conditions.push(PRE_INSPECTION.to_string());
    }
    if risk_score > DOCUMENTATION_ABOVE {
        conditions.push(ADDITIONAL_DOCUMENTATION.to_string());
    }
    conditions
}
