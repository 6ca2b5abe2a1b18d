//! Property checks over the decision tables.

use std::collections::BTreeMap;

use chrono::Utc;
use proptest::prelude::*;

use insurcap::workflows::underwriting::{
    ClassificationResult, Classifier, ClassifierConfig, ClassifierInput, ExposureAnalyzer,
    ExposureConfig, FactorInput, PolicyAssembler, PolicyCatalog, PolicyType, RiskDetails,
    RiskEvaluation, Severity, Underwriter, UnderwriterConfig,
};

const CATEGORIES: [&str; 5] = [
    "avtomobilsko",
    "nepremičninsko",
    "zdravstveno",
    "življenjsko",
    "drugo",
];
const HAZARDS: [&str; 4] = ["požar", "poplava", "vlom", "potres"];
const PRODUCTS: [&str; 4] = ["avtomobilsko", "nepremičninsko", "zdravstveno", "življenjsko"];

fn classifier() -> Classifier {
    Classifier::new(ClassifierConfig::standard()).expect("standard classifier tables")
}

fn underwriter() -> Underwriter {
    Underwriter::new(UnderwriterConfig::standard(), &PolicyCatalog::standard())
        .expect("standard underwriter tables")
}

fn evaluation(policy: &str, risk_score: f64) -> RiskEvaluation {
    RiskEvaluation {
        risk_score,
        suggested_policy: PolicyType::new(policy),
        premium: 0.0,
        details: RiskDetails {
            category: policy.to_string(),
            raw_score: risk_score,
            components: Vec::new(),
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    #[test]
    fn classification_always_lands_in_a_known_category(text in "[a-zA-Zčšž ,.]{1,80}") {
        prop_assume!(!text.trim().is_empty());
        let result = classifier()
            .classify(&ClassifierInput::from(text))
            .expect("non-blank text classifies");

        prop_assert!(CATEGORIES.contains(&result.category.as_str()));
        prop_assert!(result.risks.iter().all(|risk| HAZARDS.contains(&risk.as_str())));
    }

    #[test]
    fn hazard_keywords_are_found_anywhere(prefix in "[a-z ]{0,30}", suffix in "[a-z ]{0,30}") {
        let text = format!("{prefix}POPLAVE{suffix}");
        let result = classifier()
            .classify(&ClassifierInput::from(text))
            .expect("non-blank text classifies");

        prop_assert!(result.risks.iter().any(|risk| risk == "poplava"));
    }

    #[test]
    fn risk_score_stays_in_unit_interval(
        category in proptest::sample::select(CATEGORIES.to_vec()),
        hazards in proptest::sample::subsequence(HAZARDS.to_vec(), 0..=4),
    ) {
        let classification = ClassificationResult {
            category: category.to_string(),
            risks: hazards.iter().map(|hazard| hazard.to_string()).collect(),
            recommendation: String::new(),
            timestamp: Utc::now(),
        };

        let evaluation = underwriter().evaluate(&classification).expect("scoring succeeds");

        prop_assert!((0.0..=1.0).contains(&evaluation.risk_score));
        prop_assert!(evaluation.premium >= 0.0);
    }

    #[test]
    fn premium_never_decreases_with_score(
        product in proptest::sample::select(PRODUCTS.to_vec()),
        low in 0.0f64..=1.0,
        high in 0.0f64..=1.0,
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let underwriter = underwriter();
        let policy = PolicyType::new(product);

        prop_assert!(underwriter.premium_for(&policy, low) <= underwriter.premium_for(&policy, high));
    }

    #[test]
    fn drafts_are_stable_and_drawn_from_the_catalog(
        product in proptest::sample::select(PRODUCTS.to_vec()),
        score in 0.0f64..=1.0,
    ) {
        let assembler = PolicyAssembler::new(PolicyCatalog::standard()).expect("standard catalog");
        let input = evaluation(product, score);

        let mut first = assembler.draft(&input).expect("draft assembled");
        let second = assembler.draft(&input).expect("draft assembled");
        first.created_at = second.created_at;
        prop_assert_eq!(&first, &second);

        let catalog = assembler.catalog();
        let full = &catalog.coverage[&PolicyType::new(product)];
        prop_assert!(first.coverage.iter().all(|item| full.contains(item)));
        prop_assert_eq!(first.terms.coverage_details.len(), first.coverage.len());
        if score <= 0.4 {
            prop_assert!(first.coverage.len() <= 2);
        }
    }

    #[test]
    fn exposure_is_the_sum_of_weighted_scores(
        product in proptest::sample::select(PRODUCTS.to_vec()),
        values in proptest::collection::vec(-50.0f64..150.0, 3),
    ) {
        let analyzer = ExposureAnalyzer::new(ExposureConfig::standard()).expect("standard tables");
        let policy = PolicyType::new(product);
        let names: Vec<String> = ExposureConfig::standard().factors[&policy]
            .iter()
            .map(|entry| entry.factor.clone())
            .collect();
        let inputs: BTreeMap<String, FactorInput> = names
            .into_iter()
            .zip(values)
            .map(|(name, value)| (name, FactorInput::Numeric(value)))
            .collect();

        let result = analyzer.analyze(&policy, &inputs).expect("analysis succeeds");
        let total: f64 = result.risk_factors.iter().map(|factor| factor.impact).sum();

        prop_assert!((result.exposure_score - total).abs() <= 0.005 + 1e-9);
        prop_assert!((0.0..=1.0).contains(&result.exposure_score));
        prop_assert!(result
            .risk_factors
            .iter()
            .all(|factor| factor.severity == Severity::from_score(factor.score)));
    }

    #[test]
    fn severity_buckets_follow_cutoffs(score in 0.0f64..=1.0) {
        let expected = if score < 0.3 {
            Severity::Low
        } else if score < 0.7 {
            Severity::Medium
        } else {
            Severity::High
        };
        prop_assert_eq!(Severity::from_score(score), expected);
    }
}
