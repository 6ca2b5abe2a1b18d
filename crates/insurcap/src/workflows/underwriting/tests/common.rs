use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::underwriting::{
    CarbonFootprint, CarbonFootprintSource, ClassificationResult, Classifier, ExposureAnalyzer,
    ImpactQuery, PolicyAssembler, PolicyType, RiskDetails, RiskEvaluation, SourceError,
    Underwriter, UnderwritingPipeline, UnderwritingTables, WeatherImpact, WeatherImpactSource,
};

pub(super) const FLOOD_REQUEST: &str =
    "Potrebujem zavarovanje za mojo hišo zaradi tveganja poplave";

pub(super) fn tables() -> UnderwritingTables {
    let mut tables = UnderwritingTables::standard();
    tables.impact.fetch_timeout = Duration::from_millis(200);
    tables
}

pub(super) fn classifier() -> Classifier {
    Classifier::new(tables().classifier).expect("standard classifier tables")
}

pub(super) fn underwriter() -> Underwriter {
    let tables = tables();
    Underwriter::new(tables.underwriter, &tables.catalog).expect("standard underwriter tables")
}

pub(super) fn assembler() -> PolicyAssembler {
    PolicyAssembler::new(tables().catalog).expect("standard catalog")
}

pub(super) fn analyzer() -> ExposureAnalyzer {
    ExposureAnalyzer::new(tables().exposure).expect("standard exposure tables")
}

pub(super) fn classification(category: &str, risks: &[&str]) -> ClassificationResult {
    ClassificationResult {
        category: category.to_string(),
        risks: risks.iter().map(|risk| risk.to_string()).collect(),
        recommendation: String::new(),
        timestamp: Utc::now(),
    }
}

pub(super) fn evaluation(policy: &str, risk_score: f64) -> RiskEvaluation {
    RiskEvaluation {
        risk_score,
        suggested_policy: PolicyType::new(policy),
        premium: 100.0,
        details: RiskDetails {
            category: policy.to_string(),
            raw_score: risk_score,
            components: Vec::new(),
        },
    }
}

pub(super) fn policy(name: &str) -> PolicyType {
    PolicyType::new(name)
}

pub(super) fn no_factors() -> BTreeMap<String, crate::workflows::underwriting::FactorInput> {
    BTreeMap::new()
}

/// Carbon source returning a fixed emission and counting calls.
pub(super) struct FixedCarbon {
    pub(super) co2e_kg: f64,
    pub(super) calls: AtomicUsize,
}

impl FixedCarbon {
    pub(super) fn new(co2e_kg: f64) -> Self {
        Self {
            co2e_kg,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CarbonFootprintSource for FixedCarbon {
    async fn carbon_footprint(&self, query: &ImpactQuery) -> Result<CarbonFootprint, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CarbonFootprint {
            activity: format!("zavarovanje:{}", query.policy_type),
            co2e_kg: self.co2e_kg,
            source: "fixed".to_string(),
        })
    }
}

pub(super) struct FixedWeather {
    pub(super) probability: f64,
}

#[async_trait]
impl WeatherImpactSource for FixedWeather {
    async fn weather_impact(&self, query: &ImpactQuery) -> Result<WeatherImpact, SourceError> {
        Ok(WeatherImpact {
            location: query.location.clone(),
            extreme_event_probability: self.probability,
            dominant_hazard: Some("poplava".to_string()),
            source: "fixed".to_string(),
        })
    }
}

pub(super) struct UnreachableWeather;

#[async_trait]
impl WeatherImpactSource for UnreachableWeather {
    async fn weather_impact(&self, _query: &ImpactQuery) -> Result<WeatherImpact, SourceError> {
        Err(SourceError::Unavailable("connection refused".to_string()))
    }
}

/// Weather source whose payload carries no usable probability.
pub(super) struct GarbledWeather;

#[async_trait]
impl WeatherImpactSource for GarbledWeather {
    async fn weather_impact(&self, query: &ImpactQuery) -> Result<WeatherImpact, SourceError> {
        Ok(WeatherImpact {
            location: query.location.clone(),
            extreme_event_probability: f64::NAN,
            dominant_hazard: None,
            source: "garbled".to_string(),
        })
    }
}

/// Sources that answer only after `delay`, for timing the joined lookups.
pub(super) struct SlowSources {
    pub(super) delay: Duration,
}

#[async_trait]
impl CarbonFootprintSource for SlowSources {
    async fn carbon_footprint(&self, query: &ImpactQuery) -> Result<CarbonFootprint, SourceError> {
        tokio::time::sleep(self.delay).await;
        Ok(CarbonFootprint {
            activity: format!("zavarovanje:{}", query.policy_type),
            co2e_kg: 1_000.0,
            source: "slow".to_string(),
        })
    }
}

#[async_trait]
impl WeatherImpactSource for SlowSources {
    async fn weather_impact(&self, query: &ImpactQuery) -> Result<WeatherImpact, SourceError> {
        tokio::time::sleep(self.delay).await;
        Ok(WeatherImpact {
            location: query.location.clone(),
            extreme_event_probability: 0.2,
            dominant_hazard: None,
            source: "slow".to_string(),
        })
    }
}

/// Carbon source that never answers within the test timeout.
pub(super) struct StalledCarbon;

#[async_trait]
impl CarbonFootprintSource for StalledCarbon {
    async fn carbon_footprint(&self, _query: &ImpactQuery) -> Result<CarbonFootprint, SourceError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(SourceError::Unavailable("stalled".to_string()))
    }
}

pub(super) fn pipeline_with<C, W>(carbon: Arc<C>, weather: Arc<W>) -> UnderwritingPipeline<C, W>
where
    C: CarbonFootprintSource + 'static,
    W: WeatherImpactSource + 'static,
{
    UnderwritingPipeline::new(tables(), carbon, weather).expect("standard tables build")
}

pub(super) fn pipeline() -> UnderwritingPipeline<FixedCarbon, FixedWeather> {
    pipeline_with(
        Arc::new(FixedCarbon::new(1_000.0)),
        Arc::new(FixedWeather { probability: 0.2 }),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
