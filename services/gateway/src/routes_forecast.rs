use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiJson, ApiResult};
use crate::explain::explain;
use crate::forecast::{forecast, horizon_from_value, ForecastResponse};
use crate::provider::ExplainReply;
use crate::scenario::{evaluate, ScenarioResponse};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReq {
    pub dataset_id: Option<String>,
    pub model_id: Option<String>,
    pub horizon: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainReq {
    pub model_id: Option<String>,
    pub run_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReq {
    pub base_run_id: Option<String>,
    pub overrides: Option<Value>,
}

fn required(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

pub async fn post_forecast(
    State(st): State<SharedState>,
    ApiJson(req): ApiJson<ForecastReq>,
) -> ApiResult<Json<ForecastResponse>> {
    let (Some(dataset_id), Some(model_id), Some(horizon)) =
        (required(req.dataset_id), required(req.model_id), req.horizon)
    else {
        return Err(ApiError::validation("datasetId, modelId, and horizon required"));
    };

    let r = forecast(&st, &dataset_id, &model_id, horizon_from_value(&horizon)).await;
    debug!(model = %model_id, source = ?r.source, days = r.value.dates.len(), "forecast served");
    Ok(Json(r.value))
}

pub async fn post_explain(
    State(st): State<SharedState>,
    ApiJson(req): ApiJson<ExplainReq>,
) -> ApiResult<Json<ExplainReply>> {
    let Some(model_id) = required(req.model_id) else {
        return Err(ApiError::validation("modelId required"));
    };

    let r = explain(&st, &model_id, required(req.run_id)).await;
    debug!(model = %model_id, source = ?r.source, "explanation served");
    Ok(Json(r.value))
}

fn parse_overrides(raw: Value) -> ApiResult<HashMap<String, f64>> {
    let Value::Object(map) = raw else {
        return Err(ApiError::validation("overrides must be an object"));
    };
    map.into_iter()
        .map(|(k, v)| match v.as_f64() {
            Some(x) => Ok((k, x)),
            None => Err(ApiError::validation(format!("override {k:?} must be a number"))),
        })
        .collect()
}

pub async fn post_scenario(ApiJson(req): ApiJson<ScenarioReq>) -> ApiResult<Json<ScenarioResponse>> {
    let (Some(base_run_id), Some(overrides)) = (required(req.base_run_id), req.overrides) else {
        return Err(ApiError::validation("baseRunId and overrides required"));
    };
    let overrides = parse_overrides(overrides)?;
    Ok(Json(evaluate(&base_run_id, &overrides)))
}
