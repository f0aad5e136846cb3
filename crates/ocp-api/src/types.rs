// Wire types for the OCP GraphQL schema.
//
// Inputs serialize to the camelCase input objects the mutations expect;
// nodes deserialize the selections made by the documents in `hosts` and
// `shadow`. Nodes are lenient because the same node type backs several
// selections of different width, and any field may come back `null`.

use serde::{Deserialize, Deserializer, Serialize};

/// Decode an explicit `null` as the type's default. `#[serde(default)]`
/// alone only covers a missing key.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Variables ───────────────────────────────────────────────────────

/// `{ "input": ... }` — the variables shape of every mutation.
#[derive(Debug, Serialize)]
pub struct InputVariables<'a, T: Serialize> {
    pub input: &'a T,
}

/// `{ "id": ... }` — the variables shape of single-object queries.
#[derive(Debug, Serialize)]
pub struct IdVariables<'a> {
    pub id: &'a str,
}

// ── Shared node fragments ───────────────────────────────────────────

/// `{ id }` selection of a related object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NodeRef {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
}

/// Id of an optional related object, empty when the backend returned `null`.
pub fn ref_id(node: Option<&NodeRef>) -> String {
    node.map(|n| n.id.clone()).unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DataProtectionPolicyRef {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IpAddressNode {
    #[serde(default, deserialize_with = "nullable")]
    pub ip: String,
    #[serde(default)]
    pub prefixlen: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceNode {
    #[serde(default, deserialize_with = "nullable")]
    pub network: NodeRef,
    #[serde(default, deserialize_with = "nullable")]
    pub ipv4_addresses: Vec<IpAddressNode>,
    #[serde(default, deserialize_with = "nullable")]
    pub ipv6_addresses: Vec<IpAddressNode>,
    #[serde(default)]
    pub start_connected: Option<bool>,
}

// ── Virtual host (provisioned by OCP) ───────────────────────────────

/// `VirtualHostNode` as selected by the create payloads and `GetVm`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHostNode {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uuid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub hostname: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub cpu_count: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub cores_per_socket: u32,
    #[serde(default, deserialize_with = "nullable", rename = "memorySizeMB")]
    pub memory_size_mb: u64,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub data_protection_policy: Option<DataProtectionPolicyRef>,
    #[serde(default, deserialize_with = "nullable")]
    pub network_interface_list: Vec<NetworkInterfaceNode>,
    #[serde(default)]
    pub tier: Option<NodeRef>,
    #[serde(default)]
    pub domain: Option<NodeRef>,
    #[serde(default)]
    pub template: Option<NodeRef>,
    #[serde(default)]
    pub project: Option<NodeRef>,
    #[serde(default)]
    pub customer: Option<NodeRef>,
    #[serde(default, deserialize_with = "nullable")]
    pub region: String,
}

/// `TaskExecutionNode`: an accepted asynchronous job, nothing more.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskExecution {
    #[serde(default)]
    pub id: Option<String>,
}

/// `TemplateInterfaceInput`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceInput {
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_assign_ip: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_list: Vec<String>,
}

/// `VirtualHostCreateInput`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHostCreateInput {
    pub region: String,
    pub customer: String,
    pub project: String,
    pub hostname: String,
    pub domain: String,
    pub cpu_count: u32,
    pub cores_per_socket: u32,
    #[serde(rename = "memorySizeGB")]
    pub memory_size_gb: u32,
    pub tier: String,
    pub template: String,
    pub note: String,
    pub data_protection_policy: String,
    pub interface_list: Vec<InterfaceInput>,
}

/// `LocalDiskInput`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalDiskInput {
    #[serde(rename = "sizeGB")]
    pub size_gb: u32,
}

/// `VirtualHostCreateImmutableInput`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHostCreateImmutableInput {
    pub region: String,
    pub customer: String,
    pub project: String,
    pub hostname: String,
    pub template: String,
    pub cpu_count: u32,
    pub cores_per_socket: u32,
    #[serde(rename = "memorySizeGB")]
    pub memory_size_gb: u32,
    pub tier: String,
    pub note: String,
    pub ignition_config_data: String,
    pub ignition_config_data_encoding: String,
    #[serde(rename = "osDiskSizeGB")]
    pub os_disk_size_gb: u32,
    pub notify_user: bool,
    pub cluster_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_protection_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_affinity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedicated_cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedicated_dr_cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interface_list: Vec<InterfaceInput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub local_disk_list: Vec<LocalDiskInput>,
}

/// `VirtualHostResizeInput`. Only changed sizing fields are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHostResizeInput {
    pub virtual_host: String,
    pub allow_restart: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores_per_socket: Option<u32>,
    #[serde(rename = "memorySizeGB", skip_serializing_if = "Option::is_none")]
    pub memory_size_gb: Option<u32>,
}

/// `VirtualHostUpdateTierInput`. `isExtended` / `targetIops` stay at API defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHostUpdateTierInput {
    pub virtual_host: String,
    pub tier: String,
}

/// `VirtualHostDeleteInput` and `VirtualHostDeleteCaasInput`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHostDeleteInput {
    pub virtual_host: String,
}

// ── Shadow virtual host (inventory only) ────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VcenterRef {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `VirtualHostNode` as selected by the CAAS documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShadowHostNode {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uuid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub hostname: String,
    #[serde(default, deserialize_with = "nullable")]
    pub note: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub region: String,
    #[serde(default)]
    pub tier: Option<NodeRef>,
    #[serde(default)]
    pub project: Option<NodeRef>,
    #[serde(default)]
    pub customer: Option<NodeRef>,
    #[serde(default)]
    pub vcenter: Option<VcenterRef>,
}

/// `VirtualHostCreateCaasInput`.
#[derive(Debug, Clone, Serialize)]
pub struct ShadowHostCreateInput {
    pub vcenter: String,
    pub hostname: String,
    pub uuid: String,
    pub note: String,
    pub tier: String,
    pub project: String,
    pub region: String,
}

/// `VirtualHostUpdateCaasInput`. Only changed fields are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowHostUpdateInput {
    pub virtual_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}
