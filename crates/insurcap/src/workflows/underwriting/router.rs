use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{FactorInput, PolicyType};
use super::error::UnderwritingError;
use super::impact::{CarbonFootprintSource, WeatherImpactSource};
use super::pipeline::{UnderwritingPipeline, UnderwritingRequest};

/// Body of a standalone exposure analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureRequest {
    pub policy_type: PolicyType,
    #[serde(default)]
    pub factors: BTreeMap<String, FactorInput>,
}

/// Router builder exposing the pipeline over HTTP.
pub fn underwriting_router<C, W>(pipeline: Arc<UnderwritingPipeline<C, W>>) -> Router
where
    C: CarbonFootprintSource + 'static,
    W: WeatherImpactSource + 'static,
{
    Router::new()
        .route(
            "/api/v1/underwriting/analyze",
            post(analyze_handler::<C, W>),
        )
        .route(
            "/api/v1/underwriting/exposure",
            post(exposure_handler::<C, W>),
        )
        .with_state(pipeline)
}

pub(crate) async fn analyze_handler<C, W>(
    State(pipeline): State<Arc<UnderwritingPipeline<C, W>>>,
    axum::Json(request): axum::Json<UnderwritingRequest>,
) -> Response
where
    C: CarbonFootprintSource + 'static,
    W: WeatherImpactSource + 'static,
{
    match pipeline.run(request).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn exposure_handler<C, W>(
    State(pipeline): State<Arc<UnderwritingPipeline<C, W>>>,
    axum::Json(request): axum::Json<ExposureRequest>,
) -> Response
where
    C: CarbonFootprintSource + 'static,
    W: WeatherImpactSource + 'static,
{
    match pipeline
        .exposure()
        .analyze(&request.policy_type, &request.factors)
    {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => error_response(UnderwritingError::from(err)),
    }
}

pub(crate) fn error_response(err: UnderwritingError) -> Response {
    let status = match err {
        UnderwritingError::Impact(_) => StatusCode::BAD_GATEWAY,
        UnderwritingError::Classification(_)
        | UnderwritingError::Scoring(_)
        | UnderwritingError::Assembly(_)
        | UnderwritingError::Exposure(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };

    let payload = json!({
        "error": err.to_string(),
        "stage": err.stage(),
    });
    (status, axum::Json(payload)).into_response()
}
