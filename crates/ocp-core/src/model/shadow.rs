// ── Shadow virtual host ──
//
// An inventory record for a machine that already runs in a customer vCenter.
// Everything but note and tier identifies the machine.

use serde::{Deserialize, Serialize};

use ocp_api::types::{ShadowHostCreateInput, ShadowHostNode, ref_id};

use super::remote_id::RemoteId;
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowHostSpec {
    pub region: String,
    pub vcenter_id: String,
    pub project_id: String,
    pub tier_id: String,
    pub hostname: String,
    /// vCenter UUID of the existing machine.
    pub uuid: String,
    #[serde(default)]
    pub note: String,
}

impl ShadowHostSpec {
    pub fn validate(&self) -> Result<(), CoreError> {
        let missing: Vec<&str> = [
            ("region", &self.region),
            ("vcenter_id", &self.vcenter_id),
            ("project_id", &self.project_id),
            ("tier_id", &self.tier_id),
            ("hostname", &self.hostname),
            ("uuid", &self.uuid),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| k)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidDesiredState {
                message: format!("missing {}", missing.join(", ")),
            })
        }
    }

    pub fn to_create_input(&self) -> ShadowHostCreateInput {
        ShadowHostCreateInput {
            vcenter: self.vcenter_id.clone(),
            hostname: self.hostname.clone(),
            uuid: self.uuid.clone(),
            note: self.note.clone(),
            tier: self.tier_id.clone(),
            project: self.project_id.clone(),
            region: self.region.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowHost {
    pub id: RemoteId,
    /// Owner of the project, reported by the backend.
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub status: String,
    pub spec: ShadowHostSpec,
}

impl ShadowHost {
    /// Every field of a shadow host is reported back, so create, read and
    /// import share one mapping.
    pub fn from_node(node: ShadowHostNode) -> Self {
        Self {
            id: RemoteId::from(node.id),
            customer_id: ref_id(node.customer.as_ref()),
            status: node.state,
            spec: ShadowHostSpec {
                region: node.region,
                vcenter_id: node.vcenter.map(|v| v.id).unwrap_or_default(),
                project_id: ref_id(node.project.as_ref()),
                tier_id: ref_id(node.tier.as_ref()),
                hostname: node.hostname,
                uuid: node.uuid,
                note: node.note,
            },
        }
    }
}
