// ── Template-provisioned virtual host ──

use serde::{Deserialize, Serialize};

use ocp_api::types::{VirtualHostCreateInput, VirtualHostNode, ref_id};

use super::interface::{InterfaceSpec, materialize};
use super::remote_id::RemoteId;
use super::sizing::{Sizing, default_cores_per_socket, default_true, mb_to_gb};
use crate::error::CoreError;

/// Declared configuration of a virtual host cloned from a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualHostSpec {
    pub region: String,
    pub customer_id: String,
    pub project_id: String,
    pub hostname: String,
    pub domain_id: String,
    pub template_id: String,
    pub tier_id: String,
    pub cpu_count: u32,
    #[serde(default = "default_cores_per_socket")]
    pub cores_per_socket: u32,
    pub memory_size_gb: u32,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub data_protection_policy: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceSpec>,
    /// Whether a resize may restart the guest. Local only: OCP does not
    /// store it.
    #[serde(default = "default_true")]
    pub allow_resize_restart: bool,
}

impl VirtualHostSpec {
    pub fn sizing(&self) -> Sizing {
        Sizing {
            cpu_count: self.cpu_count,
            cores_per_socket: self.cores_per_socket,
            memory_size_gb: self.memory_size_gb,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.interfaces.is_empty() {
            return Err(CoreError::InvalidDesiredState {
                message: "at least one interface is required".into(),
            });
        }
        if let Some(iface) = self.interfaces.iter().find(|i| i.network_id.is_empty()) {
            return Err(CoreError::InvalidDesiredState {
                message: format!("interface {iface:?} has no network_id"),
            });
        }
        validate_sizing(self.sizing())
    }

    pub fn to_create_input(&self) -> VirtualHostCreateInput {
        VirtualHostCreateInput {
            region: self.region.clone(),
            customer: self.customer_id.clone(),
            project: self.project_id.clone(),
            hostname: self.hostname.clone(),
            domain: self.domain_id.clone(),
            cpu_count: self.cpu_count,
            cores_per_socket: self.cores_per_socket,
            memory_size_gb: self.memory_size_gb,
            tier: self.tier_id.clone(),
            template: self.template_id.clone(),
            note: self.note.clone(),
            data_protection_policy: self.data_protection_policy.clone(),
            interface_list: self.interfaces.iter().map(InterfaceSpec::to_input).collect(),
        }
    }
}

pub(crate) fn validate_sizing(sizing: Sizing) -> Result<(), CoreError> {
    if sizing.cpu_count == 0 || sizing.cores_per_socket == 0 || sizing.memory_size_gb == 0 {
        return Err(CoreError::InvalidDesiredState {
            message: format!("cpu_count, cores_per_socket and memory_size_gb must be positive, got {sizing:?}"),
        });
    }
    Ok(())
}

/// Last-synchronized snapshot of a template-provisioned host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualHost {
    pub id: RemoteId,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub status: String,
    pub spec: VirtualHostSpec,
}

impl VirtualHost {
    /// State right after `virtualHostCreate`. The create payload does not
    /// select note, policy or interfaces, so those come from `desired`.
    pub fn from_created(node: VirtualHostNode, desired: &VirtualHostSpec) -> Self {
        Self {
            id: RemoteId::from(node.id),
            uuid: node.uuid,
            status: node.state,
            spec: VirtualHostSpec {
                region: node.region,
                customer_id: ref_id(node.customer.as_ref()),
                project_id: ref_id(node.project.as_ref()),
                hostname: node.hostname,
                domain_id: ref_id(node.domain.as_ref()),
                template_id: ref_id(node.template.as_ref()),
                tier_id: ref_id(node.tier.as_ref()),
                cpu_count: node.cpu_count,
                cores_per_socket: node.cores_per_socket,
                memory_size_gb: mb_to_gb(node.memory_size_mb),
                note: desired.note.clone(),
                data_protection_policy: desired.data_protection_policy.clone(),
                interfaces: desired.interfaces.clone(),
                allow_resize_restart: desired.allow_resize_restart,
            },
        }
    }

    /// State rebuilt from `GetVm`, keeping what only exists locally.
    pub fn refreshed(&self, node: VirtualHostNode) -> Self {
        Self::observe(
            node,
            self.spec.interfaces.clone(),
            self.spec.allow_resize_restart,
            &self.spec.data_protection_policy,
        )
    }

    /// State for a host adopted by id, with nothing held locally.
    pub fn imported(node: VirtualHostNode) -> Self {
        Self::observe(node, Vec::new(), default_true(), "")
    }

    fn observe(
        node: VirtualHostNode,
        mut interfaces: Vec<InterfaceSpec>,
        allow_resize_restart: bool,
        held_policy: &str,
    ) -> Self {
        materialize(
            &mut interfaces,
            &node.network_interface_list,
            InterfaceSpec::from_observed,
        );
        let data_protection_policy = node
            .data_protection_policy
            .map_or_else(|| held_policy.to_owned(), |p| p.id);

        Self {
            id: RemoteId::from(node.id),
            uuid: node.uuid,
            status: node.state,
            spec: VirtualHostSpec {
                region: node.region,
                customer_id: ref_id(node.customer.as_ref()),
                project_id: ref_id(node.project.as_ref()),
                hostname: node.hostname,
                domain_id: ref_id(node.domain.as_ref()),
                template_id: ref_id(node.template.as_ref()),
                tier_id: ref_id(node.tier.as_ref()),
                cpu_count: node.cpu_count,
                cores_per_socket: node.cores_per_socket,
                memory_size_gb: mb_to_gb(node.memory_size_mb),
                note: node.note.unwrap_or_default(),
                data_protection_policy,
                interfaces,
                allow_resize_restart,
            },
        }
    }
}
