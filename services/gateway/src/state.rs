use std::sync::Arc;

use registry::{Catalog, JobTracker, Model};

use crate::config::AppConfig;
use crate::fallback::FallbackRng;
use crate::provider::InferenceProvider;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub catalog: Catalog,
    pub jobs: JobTracker,
    /// Present only when an ML service URL is configured.
    pub provider: Option<Arc<dyn InferenceProvider>>,
    pub rng: FallbackRng,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, provider: Option<Arc<dyn InferenceProvider>>) -> Self {
        Self {
            catalog: Catalog::new(),
            jobs: JobTracker::new(),
            provider,
            rng: FallbackRng::new(config.fallback_seed),
            config,
        }
    }

    /// Looks up a model by its textual id; malformed ids resolve to nothing.
    pub fn resolve_model(&self, id: &str) -> Option<Model> {
        let id = id.trim().parse::<uuid::Uuid>().ok()?;
        self.catalog.get_model(id).ok()
    }
}
