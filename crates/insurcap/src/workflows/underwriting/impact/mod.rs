//! Environmental impact estimate for an assembled policy.
//!
//! Carbon and weather data come from injected sources; both lookups run
//! concurrently and are joined before the composite score is computed.
//! A weather payload with a non-finite probability is rejected.

mod offline;

pub use offline::OfflineImpactSources;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::domain::{
    round2, CarbonFootprint, ImpactResult, PolicyDraft, PolicyType, WeatherImpact,
};
use super::error::{ImpactError, SourceError};

/// What the data sources are asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactQuery {
    pub policy_type: PolicyType,
    pub coverage: Vec<String>,
    pub location: String,
}

impl ImpactQuery {
    pub fn from_draft(draft: &PolicyDraft, location: &str) -> Self {
        Self {
            policy_type: draft.policy_type.clone(),
            coverage: draft.coverage.clone(),
            location: location.to_string(),
        }
    }
}

#[async_trait]
pub trait CarbonFootprintSource: Send + Sync {
    async fn carbon_footprint(&self, query: &ImpactQuery) -> Result<CarbonFootprint, SourceError>;
}

#[async_trait]
pub trait WeatherImpactSource: Send + Sync {
    async fn weather_impact(&self, query: &ImpactQuery) -> Result<WeatherImpact, SourceError>;
}

/// Scoring dials for the composite ESG score.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactConfig {
    /// Upper bound for each data-source lookup.
    pub fetch_timeout: Duration,
    /// Emissions at or above this amount consume the whole carbon half of the score.
    pub carbon_ceiling_kg: f64,
    /// Carbon share or event probability from which a targeted suggestion is emitted.
    pub suggestion_threshold: f64,
    pub low_esg_score: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_millis(5_000),
            carbon_ceiling_kg: 5_000.0,
            suggestion_threshold: 0.5,
            low_esg_score: 50.0,
        }
    }
}

pub struct ImpactEstimator<C, W> {
    carbon: Arc<C>,
    weather: Arc<W>,
    config: ImpactConfig,
}

impl<C, W> ImpactEstimator<C, W>
where
    C: CarbonFootprintSource,
    W: WeatherImpactSource,
{
    pub fn new(carbon: Arc<C>, weather: Arc<W>, config: ImpactConfig) -> Self {
        Self {
            carbon,
            weather,
            config,
        }
    }

    /// Estimate the impact of `draft`. Source failures are returned as-is; no retry.
    pub async fn estimate(
        &self,
        draft: &PolicyDraft,
        location: &str,
    ) -> Result<ImpactResult, ImpactError> {
        let query = ImpactQuery::from_draft(draft, location);
        let timeout = self.config.fetch_timeout;

        let (carbon, weather) = tokio::join!(
            bounded("carbon", timeout, self.carbon.carbon_footprint(&query)),
            bounded("weather", timeout, self.weather.weather_impact(&query)),
        );
        let joined = carbon.and_then(|carbon| {
            let weather = weather.and_then(checked_weather)?;
            Ok((carbon, weather))
        });
        let (carbon_footprint, weather_impact) = joined.inspect_err(|err| {
            error!(stage = "impact", policy_type = %query.policy_type, %err, "impact estimate failed");
        })?;

        let carbon_share = self.carbon_share(&carbon_footprint);
        let event_probability = weather_impact.extreme_event_probability.clamp(0.0, 1.0);
        let esg_score = round2(100.0 * (1.0 - 0.5 * carbon_share - 0.5 * event_probability));
        let sustainability_suggestions =
            self.suggestions(esg_score, carbon_share, event_probability, &weather_impact);

        debug!(esg_score, carbon_share, event_probability, "impact estimated");

        Ok(ImpactResult {
            esg_score,
            carbon_footprint,
            weather_impact,
            sustainability_suggestions,
        })
    }

    fn carbon_share(&self, footprint: &CarbonFootprint) -> f64 {
        if !footprint.co2e_kg.is_finite() || footprint.co2e_kg <= 0.0 {
            return 0.0;
        }
        (footprint.co2e_kg / self.config.carbon_ceiling_kg).min(1.0)
    }

    fn suggestions(
        &self,
        esg_score: f64,
        carbon_share: f64,
        event_probability: f64,
        weather: &WeatherImpact,
    ) -> Vec<String> {
        let mut suggestions = Vec::new();
        if carbon_share >= self.config.suggestion_threshold {
            suggestions.push(
                "Zmanjšajte ogljični odtis z energetsko učinkovitimi rešitvami".to_string(),
            );
        }
        if event_probability >= self.config.suggestion_threshold {
            let hazard = weather.dominant_hazard.as_deref().unwrap_or("vremenske ujme");
            suggestions.push(format!(
                "Vključite prilagoditve na podnebna tveganja ({hazard}) za lokacijo {}",
                weather.location
            ));
        }
        if esg_score < self.config.low_esg_score {
            suggestions.push("Preglejte trajnostno strategijo zavarovanca".to_string());
        }
        if suggestions.is_empty() {
            suggestions.push("Ohranjajte obstoječe trajnostne prakse".to_string());
        }
        suggestions
    }
}

fn checked_weather(weather: WeatherImpact) -> Result<WeatherImpact, ImpactError> {
    if weather.extreme_event_probability.is_finite() {
        return Ok(weather);
    }
    Err(ImpactError::Source {
        service: "weather",
        source: SourceError::InvalidResponse(format!(
            "extreme event probability for {} is not a finite number",
            weather.location
        )),
    })
}

async fn bounded<T, F>(service: &'static str, timeout: Duration, fetch: F) -> Result<T, ImpactError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(ImpactError::Source { service, source }),
        Err(_) => Err(ImpactError::Timeout {
            service,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
