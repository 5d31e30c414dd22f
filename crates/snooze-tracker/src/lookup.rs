//! Point-lookup collaborator contract.

use std::future::Future;

use thiserror::Error;

use snooze_core::WatchRef;

/// Transient failure of a point lookup.
///
/// Distinct from a legitimate absent desired count (`Ok(None)`): on a
/// failed lookup the tracker keeps its previous observation, so the
/// error must never be conflated with "zero" or "non-zero".
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("object not found: {0}")]
    NotFound(WatchRef),

    #[error("fetch failed for {watch}: {reason}")]
    Fetch { watch: WatchRef, reason: String },
}

/// Supplies the desired replica count for a watched workload.
///
/// `Ok(Some(n))` is an observed desired count, `Ok(None)` means the
/// count is unspecified (which counts toward quiescence), `Err` is a
/// transient failure.
pub trait ReplicaLookup: Send + Sync {
    fn desired_replicas(
        &self,
        watch: &WatchRef,
    ) -> impl Future<Output = Result<Option<u32>, LookupError>> + Send;
}
