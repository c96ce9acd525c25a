use std::future::Future;

use tracing::{debug, warn};

use crate::provider::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Delegated,
    Fallback,
}

#[derive(Debug)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

/// Runs the delegated call when there is one, and the local generator when
/// there is not or when the call fails. Failures are logged and dropped.
pub async fn resolve_with_fallback<T, Fut, F>(op: &'static str, delegate: Option<Fut>, fallback: F) -> Resolved<T>
where
    Fut: Future<Output = Result<T, ProviderError>>,
    F: FnOnce() -> T,
{
    if let Some(call) = delegate {
        match call.await {
            Ok(value) => {
                debug!(op, "delegated to ML service");
                return Resolved { value, source: Source::Delegated };
            }
            Err(e) => warn!(op, error = %e, "ML service call failed; using fallback"),
        }
    }
    Resolved { value: fallback(), source: Source::Fallback }
}
