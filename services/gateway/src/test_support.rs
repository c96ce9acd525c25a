use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::AppConfig;
use crate::provider::{
    ExplainCall, ExplainReply, FeatureImportance, ForecastCall, ForecastReply, InferenceProvider, ProviderError,
    ProviderInfo,
};
use crate::state::AppState;

/// In-process provider that either answers every call or fails every call.
pub struct StubProvider {
    fail: bool,
    calls: AtomicUsize,
    last_forecast: Mutex<Option<ForecastCall>>,
    last_explain: Mutex<Option<ExplainCall>>,
}

impl StubProvider {
    fn build(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            calls: AtomicUsize::new(0),
            last_forecast: Mutex::new(None),
            last_explain: Mutex::new(None),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::build(false)
    }

    pub fn failing() -> Arc<Self> {
        Self::build(true)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_forecast(&self) -> Option<ForecastCall> {
        self.last_forecast.lock().clone()
    }

    pub fn last_explain(&self) -> Option<ExplainCall> {
        self.last_explain.lock().clone()
    }

    fn outage(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl InferenceProvider for StubProvider {
    async fn forecast(&self, call: &ForecastCall) -> Result<ForecastReply, ProviderError> {
        *self.last_forecast.lock() = Some(call.clone());
        self.outage()?;
        Ok(ForecastReply {
            dates: (1..=call.horizon).map(|i| format!("day-{i}")).collect(),
            forecast: (1..=call.horizon).map(|i| i as f64).collect(),
            actual: None,
            metrics: None,
        })
    }

    async fn explain(&self, call: &ExplainCall) -> Result<ExplainReply, ProviderError> {
        *self.last_explain.lock() = Some(call.clone());
        self.outage()?;
        Ok(ExplainReply {
            shap: vec![FeatureImportance { feature: "remote".into(), importance: 1.0 }],
            attention: None,
        })
    }

    async fn health(&self) -> bool {
        !self.fail
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo { name: "stub".into(), base_url: "http://stub".into() }
    }
}

pub fn state_with(provider: Option<Arc<StubProvider>>) -> AppState {
    let config = AppConfig { fallback_seed: Some(7), ..AppConfig::default() };
    AppState::new(config, provider.map(|p| p as Arc<dyn InferenceProvider>))
}
