use std::path::Path as FsPath;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use registry::Dataset;

use crate::error::{path_id, ApiError, ApiResult};
use crate::ingest::store_upload;
use crate::state::SharedState;

pub async fn list_datasets(State(state): State<SharedState>) -> Json<Vec<Dataset>> {
    Json(state.catalog.list_datasets())
}

pub async fn upload_dataset(
    State(state): State<SharedState>,
    mut mp: Multipart,
) -> ApiResult<(StatusCode, Json<Dataset>)> {
    let mut upload: Option<(Option<String>, bytes::Bytes)> = None;

    while let Some(field) = mp.next_field().await.map_err(|e| ApiError::validation(e.to_string()))? {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| ApiError::validation(e.to_string()))?;
            upload = Some((file_name, bytes));
        }
    }

    let (file_name, bytes) = upload.ok_or_else(|| ApiError::validation("No file uploaded"))?;
    let meta = store_upload(FsPath::new(&state.config.upload_dir), file_name, &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to store uploaded file: {e}")))?;

    let d = state.catalog.add_dataset(meta);
    info!(id = %d.id, rows = d.rows, columns = d.columns.len(), "dataset uploaded");
    Ok((StatusCode::CREATED, Json(d)))
}

pub async fn get_dataset(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<Dataset>> {
    let id = path_id(&id, "Dataset")?;
    Ok(Json(state.catalog.get_dataset(id)?))
}

pub async fn set_active_dataset(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = path_id(&id, "Dataset")?;
    state.catalog.set_active_dataset(Some(id))?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn clear_active_dataset(State(state): State<SharedState>) -> ApiResult<Json<Value>> {
    state.catalog.set_active_dataset(None)?;
    Ok(Json(json!({ "ok": true })))
}
