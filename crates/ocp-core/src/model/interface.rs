// ── Network interfaces ──
//
// Two declaration shapes: template hosts pick a network and optionally one
// static IP; immutable hosts list every static IP explicitly.

use serde::{Deserialize, Serialize};

use ocp_api::types::{InterfaceInput, NetworkInterfaceNode};

use super::sizing::default_true;

/// Interface of a template-provisioned host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    pub network_id: String,
    #[serde(default = "default_true")]
    pub auto_assign_ip: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl InterfaceSpec {
    /// `TemplateInterfaceInput`: an explicit IP becomes a one-element list.
    pub fn to_input(&self) -> InterfaceInput {
        InterfaceInput {
            network: self.network_id.clone(),
            auto_assign_ip: Some(self.auto_assign_ip),
            ip_list: self
                .ip
                .iter()
                .filter(|ip| !ip.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Backend interface → declaration. A reported IPv4 address is taken
    /// as a manual assignment; none means DHCP.
    pub fn from_observed(node: &NetworkInterfaceNode) -> Self {
        match node.ipv4_addresses.first() {
            Some(addr) => Self {
                network_id: node.network.id.clone(),
                auto_assign_ip: false,
                ip: Some(addr.ip.clone()),
            },
            None => Self {
                network_id: node.network.id.clone(),
                auto_assign_ip: true,
                ip: None,
            },
        }
    }
}

/// Interface of an immutable host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticInterface {
    pub network_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_list: Vec<String>,
}

impl StaticInterface {
    pub fn to_input(&self) -> InterfaceInput {
        InterfaceInput {
            network: self.network_id.clone(),
            auto_assign_ip: None,
            ip_list: self.ip_list.clone(),
        }
    }

    /// Records every reported IPv4 address.
    pub fn from_observed(node: &NetworkInterfaceNode) -> Self {
        Self {
            network_id: node.network.id.clone(),
            ip_list: node.ipv4_addresses.iter().map(|a| a.ip.clone()).collect(),
        }
    }
}

/// Replace `current` with the backend's interfaces only when nothing is
/// declared yet. A non-empty list is operator-authored and never touched.
pub fn materialize<T>(
    current: &mut Vec<T>,
    observed: &[NetworkInterfaceNode],
    convert: impl Fn(&NetworkInterfaceNode) -> T,
) {
    if current.is_empty() {
        *current = observed.iter().map(convert).collect();
    }
}
