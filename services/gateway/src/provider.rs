use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use registry::Metrics;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub base_url: String,
}

/// Reasons a delegated call did not produce a usable answer. None of these
/// reach clients; callers fall back to local generators.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("ML service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastCall {
    pub model_key: String,
    pub horizon: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastReply {
    pub dates: Vec<String>,
    pub forecast: Vec<f64>,
    #[serde(default)]
    pub actual: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainCall {
    pub model_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionWeight {
    pub step: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainReply {
    pub shap: Vec<FeatureImportance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attention: Option<Vec<AttentionWeight>>,
}

/// External inference backend that forecast and explain requests may delegate to.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn forecast(&self, call: &ForecastCall) -> Result<ForecastReply, ProviderError>;
    async fn explain(&self, call: &ExplainCall) -> Result<ExplainReply, ProviderError>;
    /// True only when the service answered its health probe with a 2xx.
    async fn health(&self) -> bool;
    fn info(&self) -> ProviderInfo;
}
