mod config;
mod error;
mod state;
pub mod provider;
mod provider_ml;
pub mod resolve;
pub mod fallback;
pub mod forecast;
pub mod explain;
pub mod scenario;
pub mod ingest;
mod routes_data;
mod routes_models;
mod routes_forecast;
mod routes_health;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::provider::InferenceProvider;
use crate::provider_ml::MlServiceProvider;
use crate::state::{AppState, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env()?;

    let provider: Option<Arc<dyn InferenceProvider>> = match &cfg.ml_service_url {
        Some(url) => Some(Arc::new(
            MlServiceProvider::new(url.clone(), cfg.ml_timeout).context("Failed to build ML service client")?,
        )),
        None => None,
    };

    // The ML service is optional: report its state, never refuse to start.
    startup_checks(provider.as_deref()).await;

    tokio::fs::create_dir_all(&cfg.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", cfg.upload_dir))?;

    let app_state = Arc::new(AppState::new(cfg.clone(), provider));
    let app = router(app_state);

    let addr = &cfg.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("gateway listening on http://{addr}");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn router(state: SharedState) -> Router {
    let upload_limit = state.config.upload_max_bytes;

    Router::new()
        .route("/", get(routes_health::get_index))
        .route("/health", get(routes_health::get_health))
        .route("/data", get(routes_data::list_datasets))
        .route(
            "/data/upload",
            post(routes_data::upload_dataset).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/data/active", axum::routing::delete(routes_data::clear_active_dataset))
        .route("/data/:id", get(routes_data::get_dataset))
        .route("/data/:id/active", put(routes_data::set_active_dataset))
        .route("/models", get(routes_models::list_models))
        .route("/models/register", post(routes_models::register_model))
        .route("/models/train", post(routes_models::train_model))
        .route("/models/active", axum::routing::delete(routes_models::clear_active_model))
        .route("/models/job/:job_id", get(routes_models::get_job))
        .route("/models/:id", get(routes_models::get_model))
        .route("/models/:id/active", put(routes_models::set_active_model))
        .route("/forecast", post(routes_forecast::post_forecast))
        .route("/explain", post(routes_forecast::post_explain))
        .route("/scenario", post(routes_forecast::post_scenario))
        .fallback(routes_health::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn startup_checks(provider: Option<&dyn InferenceProvider>) {
    let Some(p) = provider else {
        info!("ml-service: disabled (no ML_SERVICE_URL); serving fallback results");
        return;
    };
    let base = p.info().base_url;
    if p.health().await {
        info!(%base, "ml-service: ok");
    } else {
        warn!(%base, "ml-service: unreachable; requests will fall back until it recovers");
    }
}
