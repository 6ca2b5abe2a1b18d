use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::domain::{ClassificationResult, ClassifierInput};
use super::error::{ClassificationError, TableError};

pub const FALLBACK_CATEGORY: &str = "drugo";

const RISKS_PLACEHOLDER: &str = "{risks}";
const DEFAULT_RISKS: &str = "osnovna tveganja";
const GENERIC_RECOMMENDATION: &str = "Potrebna je dodatna analiza";

/// Named keyword set. A rule matches when any keyword occurs in the lower-cased text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| lowered.contains(keyword.as_str()))
    }
}

/// Keyword tables for category and hazard detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Ordered; the first matching category wins.
    pub categories: Vec<KeywordRule>,
    pub hazards: Vec<KeywordRule>,
    /// Per-category template with a `{risks}` placeholder.
    pub recommendations: BTreeMap<String, String>,
    pub fallback_category: String,
}

impl ClassifierConfig {
    pub fn standard() -> Self {
        let categories = vec![
            KeywordRule::new("avtomobilsko", &["avto", "vozil", "motor"]),
            KeywordRule::new(
                "nepremičninsko",
                &["hiš", "stanovanj", "zgradb", "nepremičnin"],
            ),
            KeywordRule::new("zdravstveno", &["zdravj", "zdravstv", "bolez", "nezgod"]),
            KeywordRule::new("življenjsko", &["življenj", "smrt", "varčevanj"]),
        ];

        let hazards = vec![
            KeywordRule::new("požar", &["požar", "ogenj", "ognj"]),
            KeywordRule::new("poplava", &["poplav", "voda", "vode", "vodo"]),
            KeywordRule::new("vlom", &["vlom", "kraja", "kraje", "tatvin"]),
            KeywordRule::new("potres", &["potres", "tresenj"]),
        ];

        let recommendations = [
            (
                "avtomobilsko",
                "Priporočamo avtomobilsko zavarovanje s kritjem za {risks}",
            ),
            (
                "nepremičninsko",
                "Priporočamo nepremičninsko zavarovanje z vključenim kritjem za {risks}",
            ),
            (
                "zdravstveno",
                "Priporočamo zdravstveno zavarovanje s poudarkom na {risks}",
            ),
            (
                "življenjsko",
                "Priporočamo življenjsko zavarovanje z dodatnim kritjem za {risks}",
            ),
        ]
        .into_iter()
        .map(|(category, template)| (category.to_string(), template.to_string()))
        .collect();

        Self {
            categories,
            hazards,
            recommendations,
            fallback_category: FALLBACK_CATEGORY.to_string(),
        }
    }
}

/// Stateless text classifier mapping a request to a product category and hazards.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(mut config: ClassifierConfig) -> Result<Self, TableError> {
        for rule in config.categories.iter_mut().chain(config.hazards.iter_mut()) {
            rule.keywords = rule
                .keywords
                .iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect();
            if rule.keywords.is_empty() {
                return Err(TableError::EmptyKeywords {
                    rule: rule.name.clone(),
                });
            }
        }

        Ok(Self { config })
    }

    pub fn classify(
        &self,
        input: &ClassifierInput,
    ) -> Result<ClassificationResult, ClassificationError> {
        let text = input.render();
        if text.trim().is_empty() {
            let err = ClassificationError::BlankRequest;
            error!(stage = "classifier", %err, "request classification failed");
            return Err(err);
        }

        let lowered = text.to_lowercase();
        let category = self.detect_category(&lowered);
        let risks = self.identify_risks(&lowered);
        let recommendation = self.recommend(&category, &risks);

        debug!(%category, risks = ?risks, "request classified");

        Ok(ClassificationResult {
            category,
            risks,
            recommendation,
            timestamp: Utc::now(),
        })
    }

    /// Configured category names followed by the fallback category.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.config
            .categories
            .iter()
            .map(|rule| rule.name.as_str())
            .chain(std::iter::once(self.config.fallback_category.as_str()))
    }

    fn detect_category(&self, lowered: &str) -> String {
        self.config
            .categories
            .iter()
            .find(|rule| rule.matches(lowered))
            .map(|rule| rule.name.clone())
            .unwrap_or_else(|| self.config.fallback_category.clone())
    }

    fn identify_risks(&self, lowered: &str) -> Vec<String> {
        self.config
            .hazards
            .iter()
            .filter(|rule| rule.matches(lowered))
            .map(|rule| rule.name.clone())
            .collect()
    }

    fn recommend(&self, category: &str, risks: &[String]) -> String {
        match self.config.recommendations.get(category) {
            Some(template) => {
                let joined = if risks.is_empty() {
                    DEFAULT_RISKS.to_string()
                } else {
                    risks.join(", ")
                };
                template.replace(RISKS_PLACEHOLDER, &joined)
            }
            None => GENERIC_RECOMMENDATION.to_string(),
        }
    }
}
