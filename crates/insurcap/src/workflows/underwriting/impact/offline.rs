use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{CarbonFootprintSource, ImpactQuery, WeatherImpactSource};
use crate::workflows::underwriting::domain::{CarbonFootprint, PolicyType, WeatherImpact};
use crate::workflows::underwriting::error::SourceError;

const SOURCE_LABEL: &str = "offline";

#[derive(Debug, Clone, Copy, PartialEq)]
struct EmissionProfile {
    base_kg: f64,
    per_coverage_item_kg: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct WeatherProfile {
    extreme_event_probability: f64,
    dominant_hazard: &'static str,
}

/// Table-driven stand-in for the carbon and weather services.
///
/// Emissions grow with the number of covered items; weather outlooks are keyed
/// by lower-cased location with a national default.
#[derive(Debug, Clone)]
pub struct OfflineImpactSources {
    emissions: BTreeMap<PolicyType, EmissionProfile>,
    weather: BTreeMap<String, WeatherProfile>,
    default_weather: WeatherProfile,
}

impl OfflineImpactSources {
    pub fn standard() -> Self {
        let emissions = [
            ("avtomobilsko", 2_400.0, 150.0),
            ("nepremičninsko", 1_800.0, 100.0),
            ("zdravstveno", 300.0, 50.0),
            ("življenjsko", 200.0, 25.0),
        ]
        .into_iter()
        .map(|(policy, base_kg, per_coverage_item_kg)| {
            (
                PolicyType::new(policy),
                EmissionProfile {
                    base_kg,
                    per_coverage_item_kg,
                },
            )
        })
        .collect();

        let weather = [
            ("ljubljana", 0.35, "poplava"),
            ("celje", 0.55, "poplava"),
            ("maribor", 0.3, "toča"),
            ("koper", 0.25, "neurje"),
            ("kranj", 0.2, "neurje"),
        ]
        .into_iter()
        .map(|(location, extreme_event_probability, dominant_hazard)| {
            (
                location.to_string(),
                WeatherProfile {
                    extreme_event_probability,
                    dominant_hazard,
                },
            )
        })
        .collect();

        Self {
            emissions,
            weather,
            default_weather: WeatherProfile {
                extreme_event_probability: 0.3,
                dominant_hazard: "neurje",
            },
        }
    }
}

impl Default for OfflineImpactSources {
    fn default() -> Self {
        Self::standard()
    }
}

#[async_trait]
impl CarbonFootprintSource for OfflineImpactSources {
    async fn carbon_footprint(&self, query: &ImpactQuery) -> Result<CarbonFootprint, SourceError> {
        let co2e_kg = self
            .emissions
            .get(&query.policy_type)
            .map(|profile| {
                profile.base_kg + profile.per_coverage_item_kg * query.coverage.len() as f64
            })
            .unwrap_or(0.0);

        Ok(CarbonFootprint {
            activity: format!("zavarovanje:{}", query.policy_type),
            co2e_kg,
            source: SOURCE_LABEL.to_string(),
        })
    }
}

#[async_trait]
impl WeatherImpactSource for OfflineImpactSources {
    async fn weather_impact(&self, query: &ImpactQuery) -> Result<WeatherImpact, SourceError> {
        let key = query.location.trim().to_lowercase();
        if key.is_empty() {
            return Err(SourceError::InvalidResponse(
                "weather lookup requires a location".to_string(),
            ));
        }

        let profile = self.weather.get(&key).unwrap_or(&self.default_weather);

        Ok(WeatherImpact {
            location: query.location.trim().to_string(),
            extreme_event_probability: profile.extreme_event_probability,
            dominant_hazard: Some(profile.dominant_hazard.to_string()),
            source: SOURCE_LABEL.to_string(),
        })
    }
}
