// ── Domain model ──
//
// Declared (`*Spec`) and observed (`VirtualHost`, `ImmutableHost`,
// `ShadowHost`) state for the three host variants. Observed state wraps the
// spec as last reported by the backend, plus the remote id and computed
// fields.

pub mod host;
pub mod immutable;
pub mod interface;
pub mod remote_id;
pub mod shadow;
pub mod sizing;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

pub use host::{VirtualHost, VirtualHostSpec};
pub use immutable::{ImmutableHost, ImmutableHostSpec, LocalDisk};
pub use interface::{InterfaceSpec, StaticInterface};
pub use remote_id::RemoteId;
pub use shadow::{ShadowHost, ShadowHostSpec};
pub use sizing::{Sizing, mb_to_gb};

/// Which flavour of virtual host a declaration describes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HostKind {
    /// Cloned from a template, networked by the portal.
    Standard,
    /// Booted from ignition config.
    Immutable,
    /// Inventory record for an existing vCenter machine.
    Shadow,
}

impl HostKind {
    /// Name used as the subject of error messages.
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::Standard => "ocp_virtual_host",
            Self::Immutable => "ocp_virtual_host_immutable",
            Self::Shadow => "ocp_virtual_host_shadow",
        }
    }
}
