//! Local stand-ins for ML service output.
//!
//! The forecast generator adds bounded noise; the noise source is injected
//! so runs can be made reproducible with `FALLBACK_SEED`.

use chrono::{Duration, NaiveDate};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use registry::{Metrics, ModelType};

use crate::forecast::ForecastResponse;
use crate::provider::{AttentionWeight, ExplainReply, FeatureImportance};

/// Days with a synthesized "actual" observation at the head of a fallback forecast.
pub const ACTUAL_DAYS: usize = 3;

pub const FALLBACK_METRICS: Metrics = Metrics { mae: 4.2, rmse: 5.1, mape: 3.8 };

const ATTENTION: [f64; 7] = [0.05, 0.08, 0.12, 0.15, 0.2, 0.22, 0.18];

const MODEL_SHAP: [(&str, f64); 5] = [
    ("lag_7", 0.28),
    ("lag_14", 0.22),
    ("rolling_mean_7", 0.18),
    ("seasonality", 0.14),
    ("trend", 0.1),
];

const GENERIC_SHAP: [(&str, f64); 5] = [
    ("price", 0.32),
    ("promotion", 0.28),
    ("seasonality", 0.18),
    ("lag_7", 0.12),
    ("lag_14", 0.06),
];

pub struct FallbackRng(Mutex<StdRng>);

impl FallbackRng {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self(Mutex::new(rng))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        f(&mut self.0.lock())
    }
}

pub fn forecast_series<R: Rng + ?Sized>(today: NaiveDate, horizon: usize, rng: &mut R) -> ForecastResponse {
    let mut dates = Vec::with_capacity(horizon);
    let mut actual = Vec::with_capacity(horizon);
    let mut forecast = Vec::with_capacity(horizon);

    for i in 0..horizon {
        let day = today + Duration::days(i as i64);
        dates.push(day.format("%Y-%m-%d").to_string());
        actual.push((i < ACTUAL_DAYS).then(|| 100.0 + rng.gen_range(0.0..20.0)));
        forecast.push(105.0 + (i as f64 * 0.3).sin() * 10.0 + rng.gen_range(0.0..5.0));
    }

    ForecastResponse { dates, actual, forecast, metrics: FALLBACK_METRICS }
}

/// Importances scaled per model type; attention only for sequence-aware kinds.
pub fn explain_for(model_type: ModelType) -> ExplainReply {
    let factor = match model_type {
        ModelType::Xgboost => 1.0,
        ModelType::Ensemble => 0.95,
        ModelType::Lstm => 1.05,
    };
    ExplainReply {
        shap: importances(&MODEL_SHAP, factor),
        attention: model_type.is_sequence_aware().then(attention),
    }
}

/// Used when the requested model is not in the catalog.
pub fn explain_generic() -> ExplainReply {
    ExplainReply {
        shap: importances(&GENERIC_SHAP, 1.0),
        attention: Some(attention()),
    }
}

fn importances(table: &[(&str, f64)], factor: f64) -> Vec<FeatureImportance> {
    table
        .iter()
        .map(|(feature, importance)| FeatureImportance {
            feature: feature.to_string(),
            importance: importance * factor,
        })
        .collect()
}

fn attention() -> Vec<AttentionWeight> {
    ATTENTION
        .iter()
        .enumerate()
        .map(|(step, &weight)| AttentionWeight { step: step as u32, weight })
        .collect()
}
