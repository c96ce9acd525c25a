use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use registry::{JobView, Model, ModelType, NewModel};

use crate::error::{path_id, ApiError, ApiJson, ApiResult};
use crate::state::SharedState;

/// Registers a model trained elsewhere whose artifacts the ML service can
/// load under `modelKey`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterModelReq {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub model_type: Option<String>,
    pub model_key: Option<String>,
    pub dataset_id: Option<String>,
    pub mae: Option<f64>,
    pub rmse: Option<f64>,
    pub mape: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainReq {
    pub dataset_id: Option<String>,
    #[serde(rename = "type")]
    pub model_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainResp {
    pub job_id: Uuid,
    pub model: Model,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn model_type(raw: &str) -> ApiResult<ModelType> {
    ModelType::parse(raw).ok_or_else(|| {
        ApiError::validation(format!("type must be one of: lstm, xgboost, ensemble (got {raw:?})"))
    })
}

fn metric(name: &str, v: Option<f64>) -> ApiResult<Option<f64>> {
    match v {
        Some(x) if !x.is_finite() || x < 0.0 => Err(ApiError::validation(format!("{name} must be a non-negative number"))),
        other => Ok(other),
    }
}

pub async fn list_models(State(st): State<SharedState>) -> Json<Vec<Model>> {
    Json(st.catalog.list_models())
}

pub async fn register_model(
    State(st): State<SharedState>,
    ApiJson(req): ApiJson<RegisterModelReq>,
) -> ApiResult<(StatusCode, Json<Model>)> {
    let (Some(name), Some(raw_type), Some(model_key)) =
        (non_empty(req.name), non_empty(req.model_type), non_empty(req.model_key))
    else {
        return Err(ApiError::validation("name, type, and modelKey required"));
    };

    let meta = NewModel {
        dataset_id: non_empty(req.dataset_id),
        model_key: Some(model_key),
        mae: metric("mae", req.mae)?,
        rmse: metric("rmse", req.rmse)?,
        mape: metric("mape", req.mape)?,
        ..NewModel::new(name, model_type(&raw_type)?)
    };

    let m = st.catalog.add_model(meta);
    tracing::info!(id = %m.id, kind = %m.model_type, "model registered");
    Ok((StatusCode::CREATED, Json(m)))
}

pub async fn train_model(
    State(st): State<SharedState>,
    ApiJson(req): ApiJson<TrainReq>,
) -> ApiResult<(StatusCode, Json<TrainResp>)> {
    let (Some(dataset_id), Some(raw_type)) = (non_empty(req.dataset_id), non_empty(req.model_type)) else {
        return Err(ApiError::validation("datasetId and type required"));
    };
    let kind = model_type(&raw_type)?;

    // Training needs a dataset this process actually holds.
    let id = path_id(&dataset_id, "Dataset")?;
    st.catalog.get_dataset(id)?;

    let (job_id, model) = st.jobs.start_job(&st.catalog, &dataset_id, kind);
    Ok((StatusCode::CREATED, Json(TrainResp { job_id, model })))
}

pub async fn get_job(State(st): State<SharedState>, Path(job_id): Path<String>) -> Json<JobView> {
    let view = match job_id.trim().parse::<Uuid>() {
        Ok(id) => st.jobs.job_status(&st.catalog, id),
        Err(_) => JobView::pending(),
    };
    Json(view)
}

pub async fn get_model(State(st): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<Model>> {
    let id = path_id(&id, "Model")?;
    Ok(Json(st.catalog.get_model(id)?))
}

pub async fn set_active_model(State(st): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = path_id(&id, "Model")?;
    st.catalog.set_active_model(Some(id))?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn clear_active_model(State(st): State<SharedState>) -> ApiResult<Json<Value>> {
    st.catalog.set_active_model(None)?;
    Ok(Json(json!({ "ok": true })))
}
