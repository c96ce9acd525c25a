use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use registry::{Metrics, Model};

use crate::fallback;
use crate::provider::{ForecastCall, ForecastReply};
use crate::resolve::{resolve_with_fallback, Resolved};
use crate::state::AppState;

pub const DEFAULT_HORIZON: usize = 7;
pub const MAX_HORIZON: usize = 90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub dates: Vec<String>,
    pub actual: Vec<Option<f64>>,
    pub forecast: Vec<f64>,
    pub metrics: Metrics,
}

impl From<ForecastReply> for ForecastResponse {
    fn from(r: ForecastReply) -> Self {
        let actual = r.actual.unwrap_or_else(|| vec![None; r.dates.len()]);
        Self {
            dates: r.dates,
            actual,
            forecast: r.forecast,
            metrics: r.metrics.unwrap_or_default(),
        }
    }
}

/// Clamps to `1..=MAX_HORIZON`. NaN and zero mean "use the default";
/// fractional values round up to a whole day.
pub fn clamp_horizon(h: f64) -> usize {
    if h.is_nan() || h == 0.0 {
        return DEFAULT_HORIZON;
    }
    h.ceil().clamp(1.0, MAX_HORIZON as f64) as usize
}

/// Reads a horizon from loosely typed JSON. Numeric strings are accepted;
/// anything else that is not a number falls back to the default.
pub fn horizon_from_value(raw: &Value) -> usize {
    let h = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    clamp_horizon(h.unwrap_or(f64::NAN))
}

fn dataset_path(state: &AppState, dataset_id: &str, model: &Model) -> Option<String> {
    let requested = dataset_id.parse::<uuid::Uuid>().ok().and_then(|id| state.catalog.get_dataset(id).ok());
    requested
        .or_else(|| state.catalog.dataset_of(model))
        .and_then(|d| d.file_path)
}

/// Produces a forecast of `horizon` days. Never fails: an unknown model or a
/// failed ML call yields the local fallback series.
pub async fn forecast(state: &AppState, dataset_id: &str, model_id: &str, horizon: usize) -> Resolved<ForecastResponse> {
    let horizon = horizon.clamp(1, MAX_HORIZON);
    let model = state.resolve_model(model_id);

    let delegate = match (state.provider.clone(), model.as_ref()) {
        (Some(provider), Some(m)) if m.model_key.is_some() => {
            let call = ForecastCall {
                model_key: m.model_key.clone().unwrap_or_default(),
                horizon,
                dataset_path: dataset_path(state, dataset_id, m),
            };
            Some(async move { provider.forecast(&call).await.map(ForecastResponse::from) })
        }
        _ => None,
    };

    let today = Utc::now().date_naive();
    resolve_with_fallback("forecast", delegate, || {
        state.rng.with(|rng| fallback::forecast_series(today, horizon, rng))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Source;
    use crate::test_support::{state_with, StubProvider};
    use registry::{ModelType, NewDataset, NewModel};
    use serde_json::json;

    fn keyed(state: &AppState, key: Option<&str>) -> Model {
        state.catalog.add_model(NewModel {
            model_key: key.map(str::to_string),
            ..NewModel::new("m", ModelType::Lstm)
        })
    }

    #[test]
    fn test_clamp_horizon() {
        assert_eq!(clamp_horizon(-5.0), 1);
        assert_eq!(clamp_horizon(200.0), 90);
        assert_eq!(clamp_horizon(f64::NAN), 7);
        assert_eq!(clamp_horizon(0.0), 7);
        assert_eq!(clamp_horizon(7.5), 8);
        assert_eq!(clamp_horizon(1.0), 1);
        assert_eq!(clamp_horizon(90.0), 90);
        assert_eq!(clamp_horizon(f64::INFINITY), 90);
    }

    #[test]
    fn test_horizon_from_value() {
        assert_eq!(horizon_from_value(&json!(14)), 14);
        assert_eq!(horizon_from_value(&json!("12")), 12);
        assert_eq!(horizon_from_value(&json!("soon")), 7);
        assert_eq!(horizon_from_value(&json!(true)), 7);
        assert_eq!(horizon_from_value(&json!([3])), 7);
        assert_eq!(horizon_from_value(&json!(-5)), 1);
        assert_eq!(horizon_from_value(&json!(200)), 90);
    }

    #[tokio::test]
    async fn test_length_matches_clamped_horizon() {
        let state = state_with(None);
        let m = keyed(&state, None);
        for (raw, want) in [(-5.0, 1), (200.0, 90), (f64::NAN, 7), (30.0, 30)] {
            let r = forecast(&state, "d", &m.id.to_string(), clamp_horizon(raw)).await;
            assert_eq!(r.value.forecast.len(), want);
            assert_eq!(r.value.dates.len(), want);
            assert_eq!(r.value.actual.len(), want);
        }
    }

    #[tokio::test]
    async fn test_unknown_model_uses_fallback_even_with_provider() {
        let stub = StubProvider::ok();
        let state = state_with(Some(stub.clone()));
        let r = forecast(&state, "d", "no-such-model", 5).await;
        assert_eq!(r.source, Source::Fallback);
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_model_without_key_is_not_delegated() {
        let stub = StubProvider::ok();
        let state = state_with(Some(stub.clone()));
        let m = keyed(&state, None);
        let r = forecast(&state, "d", &m.id.to_string(), 5).await;
        assert_eq!(r.source, Source::Fallback);
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_delegated_reply_fills_defaults() {
        let stub = StubProvider::ok();
        let state = state_with(Some(stub.clone()));
        let d = state.catalog.add_dataset(NewDataset {
            name: "d.csv".into(),
            rows: 1,
            columns: vec!["x".into()],
            file_path: Some("/data/d.csv".into()),
        });
        let m = keyed(&state, Some("lstm"));

        let r = forecast(&state, &d.id.to_string(), &m.id.to_string(), 2).await;
        assert_eq!(r.source, Source::Delegated);
        assert_eq!(r.value.forecast, vec![1.0, 2.0]);
        assert_eq!(r.value.actual, vec![None, None]);
        assert_eq!(r.value.metrics, Metrics::default());

        let call = stub.last_forecast().unwrap();
        assert_eq!(call.model_key, "lstm");
        assert_eq!(call.horizon, 2);
        assert_eq!(call.dataset_path.as_deref(), Some("/data/d.csv"));
    }

    #[tokio::test]
    async fn test_failed_delegation_matches_fallback_shape() {
        let stub = StubProvider::failing();
        let state = state_with(Some(stub.clone()));
        let m = keyed(&state, Some("lstm"));

        let r = forecast(&state, "d", &m.id.to_string(), 10).await;
        assert_eq!(stub.calls(), 1);
        assert_eq!(r.source, Source::Fallback);
        assert_eq!(r.value.forecast.len(), 10);
        assert_eq!(r.value.metrics, fallback::FALLBACK_METRICS);

        let v = serde_json::to_value(&r.value).unwrap();
        assert!(v.get("error").is_none());
    }
}
