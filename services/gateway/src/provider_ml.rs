use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::provider::{
    ExplainCall, ExplainReply, ForecastCall, ForecastReply, InferenceProvider, ProviderError, ProviderInfo,
};

/// HTTP client for the Python ML inference service.
pub struct MlServiceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl MlServiceProvider {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            // Error bodies are `{ "error": "..." }` when the service is well behaved.
            let message = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["error"].as_str().map(str::to_string))
                .unwrap_or_else(|| format!("ML service error: {}", status.as_u16()));
            return Err(ProviderError::Status { status: status.as_u16(), message });
        }

        let bytes = resp.bytes().await.map_err(|e| ProviderError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl InferenceProvider for MlServiceProvider {
    async fn forecast(&self, call: &ForecastCall) -> Result<ForecastReply, ProviderError> {
        let reply: ForecastReply = self.post("/forecast", call).await?;
        if reply.dates.len() != reply.forecast.len() {
            return Err(ProviderError::Decode(format!(
                "dates/forecast length mismatch ({} vs {})",
                reply.dates.len(),
                reply.forecast.len()
            )));
        }
        Ok(reply)
    }

    async fn explain(&self, call: &ExplainCall) -> Result<ExplainReply, ProviderError> {
        self.post("/explain", call).await
    }

    async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "ml-service".to_string(),
            base_url: self.base_url.clone(),
        }
    }
}
