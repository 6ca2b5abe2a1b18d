use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::PolicyType;
use super::super::error::TableError;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Static weight of one factor within a policy type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorWeight {
    pub factor: String,
    pub weight: f64,
}

/// Linear normalization bounds for a numeric factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationRange {
    pub min: f64,
    pub max: f64,
}

impl NormalizationRange {
    pub const IDENTITY: Self = Self { min: 0.0, max: 1.0 };

    pub fn normalize(self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

/// Factor tables driving the exposure analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureConfig {
    /// Factors per policy type in reporting order. Weights must sum to 1.0.
    pub factors: BTreeMap<PolicyType, Vec<FactorWeight>>,
    /// Factors without an entry normalize against `NormalizationRange::IDENTITY`.
    pub ranges: BTreeMap<String, NormalizationRange>,
    pub category_scores: BTreeMap<String, BTreeMap<String, f64>>,
}

impl ExposureConfig {
    pub fn standard() -> Self {
        let factors = [
            (
                "avtomobilsko",
                &[
                    ("starost_vozila", 0.3),
                    ("voznikove_izkušnje", 0.4),
                    ("območje_vožnje", 0.3),
                ][..],
            ),
            (
                "nepremičninsko",
                &[
                    ("lokacija", 0.4),
                    ("starost_objekta", 0.3),
                    ("varnostni_sistemi", 0.3),
                ][..],
            ),
            (
                "zdravstveno",
                &[
                    ("starost", 0.4),
                    ("življenjski_slog", 0.3),
                    ("zdravstvena_zgodovina", 0.3),
                ][..],
            ),
            (
                "življenjsko",
                &[
                    ("starost", 0.3),
                    ("poklic", 0.3),
                    ("zdravstveno_stanje", 0.4),
                ][..],
            ),
        ]
        .into_iter()
        .map(|(policy, weights)| {
            let weights: Vec<FactorWeight> = weights
                .iter()
                .map(|(factor, weight)| FactorWeight {
                    factor: factor.to_string(),
                    weight: *weight,
                })
                .collect();
            (PolicyType::new(policy), weights)
        })
        .collect();

        let ranges = [
            ("starost", 18.0, 100.0),
            ("starost_vozila", 0.0, 20.0),
            ("starost_objekta", 0.0, 100.0),
        ]
        .into_iter()
        .map(|(factor, min, max)| (factor.to_string(), NormalizationRange { min, max }))
        .collect();

        let category_scores = [
            (
                "voznikove_izkušnje",
                &[("začetnik", 0.8), ("izkušen", 0.4), ("profesionalec", 0.2)][..],
            ),
            (
                "območje_vožnje",
                &[("mesto", 0.6), ("podeželje", 0.4), ("avtocesta", 0.5)][..],
            ),
            (
                "lokacija",
                &[("poplavno območje", 0.9), ("mesto", 0.6), ("podeželje", 0.3)][..],
            ),
            (
                "varnostni_sistemi",
                &[("brez", 0.9), ("osnovni", 0.6), ("alarm", 0.3), ("napredni", 0.1)][..],
            ),
            (
                "življenjski_slog",
                &[("aktiven", 0.2), ("zmeren", 0.4), ("sedeč", 0.7), ("kadilec", 0.9)][..],
            ),
            (
                "zdravstvena_zgodovina",
                &[("brez posebnosti", 0.1), ("kronična bolezen", 0.8)][..],
            ),
            (
                "poklic",
                &[("pisarniški", 0.1), ("fizični", 0.6), ("rizični", 0.9)][..],
            ),
            (
                "zdravstveno_stanje",
                &[("odlično", 0.1), ("dobro", 0.3), ("slabo", 0.8)][..],
            ),
        ]
        .into_iter()
        .map(|(factor, scores)| {
            let scores: BTreeMap<String, f64> = scores
                .iter()
                .map(|(label, score)| (label.to_string(), *score))
                .collect();
            (factor.to_string(), scores)
        })
        .collect();

        Self {
            factors,
            ranges,
            category_scores,
        }
    }

    pub fn validate(&self) -> Result<(), TableError> {
        for (policy_type, weights) in &self.factors {
            for entry in weights {
                if !entry.weight.is_finite() || entry.weight < 0.0 {
                    return Err(TableError::InvalidWeight {
                        name: entry.factor.clone(),
                        weight: entry.weight,
                    });
                }
            }
            let sum: f64 = weights.iter().map(|entry| entry.weight).sum();
            if !weights.is_empty() && (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(TableError::WeightSum {
                    policy_type: policy_type.clone(),
                    sum,
                });
            }
        }

        for (factor, range) in &self.ranges {
            if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
                return Err(TableError::InvalidRange {
                    factor: factor.clone(),
                    min: range.min,
                    max: range.max,
                });
            }
        }

        for (factor, scores) in &self.category_scores {
            for (label, score) in scores {
                if !(0.0..=1.0).contains(score) {
                    return Err(TableError::InvalidCategoryScore {
                        factor: factor.clone(),
                        label: label.clone(),
                        score: *score,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn range_for(&self, factor: &str) -> NormalizationRange {
        self.ranges
            .get(factor)
            .copied()
            .unwrap_or(NormalizationRange::IDENTITY)
    }
}
