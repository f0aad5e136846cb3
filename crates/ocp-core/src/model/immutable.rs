// ── Immutable (ignition-configured) virtual host ──
//
// Most inputs are create-only: the backend never reports them back, so the
// snapshot carries them from the declaration that created the host.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use ocp_api::types::{LocalDiskInput, VirtualHostCreateImmutableInput, VirtualHostNode, ref_id};

use super::host::validate_sizing;
use super::interface::{StaticInterface, materialize};
use super::remote_id::RemoteId;
use super::sizing::{Sizing, default_cores_per_socket, default_true, mb_to_gb};
use crate::error::CoreError;

fn default_encoding() -> String {
    "BASE64".into()
}

fn default_os_disk_size_gb() -> u32 {
    20
}

fn default_cluster_type() -> String {
    "PRIMARY".into()
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDisk {
    pub size_gb: u32,
}

/// Declared configuration of an immutable host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImmutableHostSpec {
    pub region: String,
    pub customer_id: String,
    pub project_id: String,
    pub hostname: String,
    pub template_id: String,
    pub tier_id: String,
    pub cpu_count: u32,
    #[serde(default = "default_cores_per_socket")]
    pub cores_per_socket: u32,
    pub memory_size_gb: u32,
    #[serde(default)]
    pub note: String,
    #[serde(serialize_with = "expose")]
    pub ignition_config_data: SecretString,
    #[serde(default = "default_encoding")]
    pub ignition_config_data_encoding: String,
    #[serde(default = "default_os_disk_size_gb")]
    pub os_disk_size_gb: u32,
    #[serde(default)]
    pub notify_user: bool,
    #[serde(default = "default_cluster_type")]
    pub cluster_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_protection_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anti_affinity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_dr_cluster: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<StaticInterface>,
    #[serde(default)]
    pub local_disk_list: Vec<LocalDisk>,
    #[serde(default = "default_true")]
    pub allow_resize_restart: bool,
}

impl ImmutableHostSpec {
    pub fn sizing(&self) -> Sizing {
        Sizing {
            cpu_count: self.cpu_count,
            cores_per_socket: self.cores_per_socket,
            memory_size_gb: self.memory_size_gb,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.ignition_config_data.expose_secret().is_empty() {
            return Err(CoreError::InvalidDesiredState {
                message: "ignition_config_data must not be empty".into(),
            });
        }
        if self.local_disk_list.iter().any(|d| d.size_gb == 0) {
            return Err(CoreError::InvalidDesiredState {
                message: "local disks must have a positive size_gb".into(),
            });
        }
        validate_sizing(self.sizing())
    }

    pub fn to_create_input(&self) -> VirtualHostCreateImmutableInput {
        VirtualHostCreateImmutableInput {
            region: self.region.clone(),
            customer: self.customer_id.clone(),
            project: self.project_id.clone(),
            hostname: self.hostname.clone(),
            template: self.template_id.clone(),
            cpu_count: self.cpu_count,
            cores_per_socket: self.cores_per_socket,
            memory_size_gb: self.memory_size_gb,
            tier: self.tier_id.clone(),
            note: self.note.clone(),
            ignition_config_data: self.ignition_config_data.expose_secret().to_owned(),
            ignition_config_data_encoding: self.ignition_config_data_encoding.clone(),
            os_disk_size_gb: self.os_disk_size_gb,
            notify_user: self.notify_user,
            cluster_type: self.cluster_type.clone(),
            data_protection_policy: non_empty(self.data_protection_policy.as_ref()),
            anti_affinity: non_empty(self.anti_affinity.as_ref()),
            business_service: non_empty(self.business_service.as_ref()),
            dedicated_cluster: non_empty(self.dedicated_cluster.as_ref()),
            dedicated_dr_cluster: non_empty(self.dedicated_dr_cluster.as_ref()),
            version: non_empty(self.version.as_ref()),
            interface_list: self.interfaces.iter().map(StaticInterface::to_input).collect(),
            local_disk_list: self
                .local_disk_list
                .iter()
                .map(|d| LocalDiskInput { size_gb: d.size_gb })
                .collect(),
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// Last-synchronized snapshot of an immutable host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImmutableHost {
    pub id: RemoteId,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub status: String,
    pub spec: ImmutableHostSpec,
}

impl ImmutableHost {
    /// State right after `virtualHostCreateImmutable`.
    pub fn from_created(node: VirtualHostNode, desired: &ImmutableHostSpec) -> Self {
        let mut spec = desired.clone();
        apply_reported(&mut spec, &node);
        Self {
            id: RemoteId::from(node.id),
            uuid: node.uuid,
            status: node.state,
            spec,
        }
    }

    /// State rebuilt from `GetVm`. Create-only inputs stay as held.
    pub fn refreshed(&self, node: VirtualHostNode) -> Self {
        let mut spec = self.spec.clone();
        spec.note = node.note.clone().unwrap_or_default();
        if let Some(policy) = &node.data_protection_policy {
            spec.data_protection_policy = Some(policy.id.clone());
        }
        materialize(
            &mut spec.interfaces,
            &node.network_interface_list,
            StaticInterface::from_observed,
        );
        apply_reported(&mut spec, &node);
        Self {
            id: RemoteId::from(node.id),
            uuid: node.uuid,
            status: node.state,
            spec,
        }
    }

    /// State for a host adopted by id. Create-only inputs are unknown and
    /// take their defaults; the ignition data stays empty.
    pub fn imported(node: VirtualHostNode) -> Self {
        let blank = Self {
            id: RemoteId::from(node.id.clone()),
            uuid: String::new(),
            status: String::new(),
            spec: ImmutableHostSpec {
                region: String::new(),
                customer_id: String::new(),
                project_id: String::new(),
                hostname: String::new(),
                template_id: String::new(),
                tier_id: String::new(),
                cpu_count: 0,
                cores_per_socket: default_cores_per_socket(),
                memory_size_gb: 0,
                note: String::new(),
                ignition_config_data: SecretString::from(String::new()),
                ignition_config_data_encoding: default_encoding(),
                os_disk_size_gb: default_os_disk_size_gb(),
                notify_user: false,
                cluster_type: default_cluster_type(),
                data_protection_policy: None,
                version: None,
                anti_affinity: None,
                business_service: None,
                dedicated_cluster: None,
                dedicated_dr_cluster: None,
                interfaces: Vec::new(),
                local_disk_list: Vec::new(),
                allow_resize_restart: default_true(),
            },
        };
        blank.refreshed(node)
    }
}

/// Overwrite the fields the backend reports on every selection.
fn apply_reported(spec: &mut ImmutableHostSpec, node: &VirtualHostNode) {
    spec.region.clone_from(&node.region);
    spec.customer_id = ref_id(node.customer.as_ref());
    spec.project_id = ref_id(node.project.as_ref());
    spec.hostname.clone_from(&node.hostname);
    spec.template_id = ref_id(node.template.as_ref());
    spec.tier_id = ref_id(node.tier.as_ref());
    spec.cpu_count = node.cpu_count;
    spec.cores_per_socket = node.cores_per_socket;
    spec.memory_size_gb = mb_to_gb(node.memory_size_mb);
}
