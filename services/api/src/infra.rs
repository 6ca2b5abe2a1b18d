use insurcap::config::ImpactSettings;
use insurcap::error::AppError;
use insurcap::workflows::underwriting::{
    FactorInput, OfflineImpactSources, UnderwritingPipeline, UnderwritingTables,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type OfflinePipeline = UnderwritingPipeline<OfflineImpactSources, OfflineImpactSources>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Standard decision tables wired to the offline impact sources.
pub(crate) fn build_pipeline(settings: &ImpactSettings) -> Result<OfflinePipeline, AppError> {
    let mut tables = UnderwritingTables::standard();
    tables.impact.fetch_timeout = settings.fetch_timeout;

    let sources = Arc::new(OfflineImpactSources::standard());
    let pipeline = UnderwritingPipeline::new(tables, sources.clone(), sources)?
        .with_default_location(settings.default_location.clone());
    Ok(pipeline)
}

/// Parses `name=value`; numeric values become numeric factors, anything else a label.
pub(crate) fn parse_factor(raw: &str) -> Result<(String, FactorInput), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("factor name is missing in '{raw}'"));
    }

    let value = value.trim();
    let input = match value.parse::<f64>() {
        Ok(number) if number.is_finite() => FactorInput::Numeric(number),
        Ok(_) => return Err(format!("factor '{name}' must be a finite number")),
        Err(_) => FactorInput::Category(value.to_string()),
    };

    Ok((name.to_string(), input))
}
