// ── Resource reconcilers ──
//
// One reconciler per host variant. Each owns a handle to the shared
// GraphQL client and maps declared state onto create / read / update /
// delete calls.

mod immutable;
mod shadow;
mod standard;

use std::future::Future;
use std::pin::Pin;

use tracing::{info, warn};

use ocp_api::GraphQlClient;
use ocp_api::types::{VirtualHostResizeInput, VirtualHostUpdateTierInput};

pub use immutable::ImmutableHostReconciler;
pub use shadow::ShadowHostReconciler;
pub use standard::VirtualHostReconciler;

use crate::change::PlannedChange;
use crate::error::CoreError;
use crate::model::{HostKind, RemoteId};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// CRUD contract of a managed host variant.
///
/// Methods return boxed futures for dyn compatibility.
pub trait Reconciler: Send + Sync {
    /// Declared configuration.
    type Desired: Send + Sync;
    /// Last-synchronized snapshot, including the remote id.
    type Observed: Send + Sync;

    fn kind(&self) -> HostKind;

    /// Remote id held by a snapshot.
    fn remote_id<'o>(&self, observed: &'o Self::Observed) -> &'o RemoteId;

    /// Create the host. On any failure no snapshot (and no id) exists.
    fn create<'a>(
        &'a self,
        desired: &'a Self::Desired,
    ) -> BoxFuture<'a, Result<Self::Observed, CoreError>>;

    /// Refresh a snapshot. `Ok(None)` means the host was deleted outside
    /// this engine and the id must be forgotten.
    fn read<'a>(
        &'a self,
        prior: &'a Self::Observed,
    ) -> BoxFuture<'a, Result<Option<Self::Observed>, CoreError>>;

    /// Converge an existing host in place, then read it back. A failure
    /// leaves `prior` as the current snapshot.
    fn update<'a>(
        &'a self,
        prior: &'a Self::Observed,
        desired: &'a Self::Desired,
    ) -> BoxFuture<'a, Result<Option<Self::Observed>, CoreError>>;

    fn delete<'a>(&'a self, prior: &'a Self::Observed) -> BoxFuture<'a, Result<(), CoreError>>;

    /// Adopt an existing host by id.
    fn import<'a>(&'a self, id: &'a RemoteId)
    -> BoxFuture<'a, Result<Self::Observed, CoreError>>;

    /// Identity fields that differ; any of these forces delete + create.
    fn replacement_fields(&self, prior: &Self::Observed, desired: &Self::Desired)
    -> Vec<&'static str>;

    /// Fields an update would change in place.
    fn changed_fields(&self, prior: &Self::Observed, desired: &Self::Desired) -> Vec<&'static str>;
}

/// Submit the single job a standard or immutable host update resolved to.
///
/// Success only means the portal accepted the job; the caller reads the
/// host back afterwards.
pub(crate) async fn submit_change(
    client: &GraphQlClient,
    id: &RemoteId,
    allow_restart: bool,
    change: PlannedChange,
) -> Result<(), CoreError> {
    let (operation, outcome) = match change {
        PlannedChange::Resize(sizing) => {
            let input = VirtualHostResizeInput {
                virtual_host: id.to_string(),
                allow_restart,
                cpu_count: sizing.cpu_count,
                cores_per_socket: sizing.cores_per_socket,
                memory_size_gb: sizing.memory_size_gb,
            };
            ("virtualHostResize", client.resize_virtual_host(&input).await?)
        }
        PlannedChange::Retier(tier) => {
            let input = VirtualHostUpdateTierInput {
                virtual_host: id.to_string(),
                tier,
            };
            (
                "virtualHostUpdateTier",
                client.update_virtual_host_tier(&input).await?,
            )
        }
    };

    let task = outcome.into_result(operation)?;
    info!(%id, operation, task = ?task.id, "job accepted");
    Ok(())
}

/// Warn about declared changes that have no in-place mutation. They stay
/// pending until the next read reports the backend's value again.
pub(crate) fn warn_unapplied(kind: HostKind, id: &RemoteId, fields: &[&'static str]) {
    if !fields.is_empty() {
        warn!(
            resource = kind.resource_name(),
            %id,
            ?fields,
            "fields cannot be changed in place and were not applied"
        );
    }
}

/// Names of the `(name, differs)` checks that came out true.
pub(crate) fn differing<const N: usize>(checks: [(&'static str, bool); N]) -> Vec<&'static str> {
    checks
        .into_iter()
        .filter_map(|(name, differs)| differs.then_some(name))
        .collect()
}

/// Reject a success payload that carries no id.
pub(crate) fn require_id(kind: HostKind, operation: &str, id: &RemoteId) -> Result<(), CoreError> {
    if id.as_str().is_empty() {
        return Err(CoreError::ProtocolViolation {
            message: format!(
                "{}: {operation} returned a host without id",
                kind.resource_name()
            ),
        });
    }
    Ok(())
}
