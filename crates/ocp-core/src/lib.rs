//! Reconciliation engine for OCP virtual hosts.
//!
//! Sits between `ocp-api` (raw GraphQL calls) and the `ocp` orchestrator:
//!
//! - **Domain model** ([`model`]) — declared (`*Spec`) and observed state for
//!   template-provisioned, ignition-configured and shadow hosts, with unit
//!   conversions and interface materialization.
//!
//! - **[`ChangeSet`]** — classifies an update into sizing and tier
//!   categories and rejects mixing them before any request is sent.
//!
//! - **[`Reconciler`]** — the create / read / update / delete / import
//!   contract, implemented by [`VirtualHostReconciler`],
//!   [`ImmutableHostReconciler`] and [`ShadowHostReconciler`].
//!
//! - **[`Lifecycle`]** — drives one resource instance through its states,
//!   replacing the host when identity fields change.

pub mod change;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod reconcile;

// ── Primary re-exports ──────────────────────────────────────────────
pub use change::{ChangeCategory, ChangeSet, PlannedChange, SizingChange};
pub use error::CoreError;
pub use lifecycle::{Action, Applied, Lifecycle, ResourceStatus};
pub use model::{
    HostKind, ImmutableHost, ImmutableHostSpec, InterfaceSpec, LocalDisk, RemoteId, ShadowHost,
    ShadowHostSpec, Sizing, StaticInterface, VirtualHost, VirtualHostSpec,
};
pub use reconcile::{
    ImmutableHostReconciler, Reconciler, ShadowHostReconciler, VirtualHostReconciler,
};
