use crate::fallback;
use crate::provider::{ExplainCall, ExplainReply};
use crate::resolve::{resolve_with_fallback, Resolved};
use crate::state::AppState;

/// Feature importances (and attention, for sequence-aware models) for a model.
pub async fn explain(state: &AppState, model_id: &str, run_id: Option<String>) -> Resolved<ExplainReply> {
    let model = state.resolve_model(model_id);

    let delegate = match (state.provider.clone(), model.as_ref().and_then(|m| m.model_key.clone())) {
        (Some(provider), Some(model_key)) => {
            let call = ExplainCall { model_key, run_id };
            Some(async move { provider.explain(&call).await })
        }
        _ => None,
    };

    resolve_with_fallback("explain", delegate, || match &model {
        Some(m) => fallback::explain_for(m.model_type),
        None => fallback::explain_generic(),
    })
    .await
}
