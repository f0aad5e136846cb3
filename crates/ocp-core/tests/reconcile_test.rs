#![allow(clippy::unwrap_used)]
// Reconciler tests against a mocked OCP GraphQL endpoint.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ocp_api::GraphQlClient;
use ocp_core::{
    Action, CoreError, ImmutableHost, ImmutableHostReconciler, ImmutableHostSpec, InterfaceSpec,
    Lifecycle, Reconciler, RemoteId, ShadowHostReconciler, ShadowHostSpec, VirtualHost,
    VirtualHostReconciler, VirtualHostSpec,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Arc<GraphQlClient>) {
    let server = MockServer::start().await;
    let client = GraphQlClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, Arc::new(client))
}

fn data(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": value }))
}

fn desired() -> VirtualHostSpec {
    VirtualHostSpec {
        region: "FI".into(),
        customer_id: "cust-1".into(),
        project_id: "proj-1".into(),
        hostname: "web01".into(),
        domain_id: "dom-1".into(),
        template_id: "tmpl-1".into(),
        tier_id: "tier-1".into(),
        cpu_count: 2,
        cores_per_socket: 1,
        memory_size_gb: 8,
        note: String::new(),
        data_protection_policy: String::new(),
        interfaces: vec![InterfaceSpec {
            network_id: "net-1".into(),
            auto_assign_ip: true,
            ip: None,
        }],
        allow_resize_restart: true,
    }
}

fn held() -> VirtualHost {
    VirtualHost {
        id: RemoteId::from("vh-1"),
        uuid: "4201-aa".into(),
        status: "RUNNING".into(),
        spec: desired(),
    }
}

/// `virtualHost` node as `GetVm` reports it.
fn vm_node(cpu: u32, memory_mb: u64, tier: &str, addresses: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "vh-1",
        "uuid": "4201-aa",
        "hostname": "web01",
        "state": "RUNNING",
        "cpuCount": cpu,
        "coresPerSocket": 1,
        "memorySizeMB": memory_mb,
        "note": null,
        "dataProtectionPolicy": null,
        "networkInterfaceList": [{
            "network": { "id": "net-1" },
            "ipv4Addresses": addresses,
            "ipv6Addresses": [],
            "startConnected": true
        }],
        "tier": { "id": tier },
        "domain": { "id": "dom-1" },
        "template": { "id": "tmpl-1" },
        "project": { "id": "proj-1" },
        "customer": { "id": "cust-1" },
        "region": "FI"
    })
}

async fn mount_get_vm(server: &MockServer, node: serde_json::Value, times: u64) {
    Mock::given(method("POST"))
        .and(body_string_contains("query GetVm"))
        .respond_with(data(json!({ "virtualHost": node })))
        .expect(times)
        .mount(server)
        .await;
}

// ── Create ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_adopts_id_and_converts_memory() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("mutation CreateVm"))
        .and(body_partial_json(json!({
            "variables": { "input": { "hostname": "web01", "memorySizeGB": 8 } }
        })))
        .respond_with(data(json!({
            "virtualHostCreate": {
                "__typename": "VirtualHostCreated",
                "virtualHost": vm_node(2, 8192, "tier-1", json!([]))
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let host = VirtualHostReconciler::new(client)
        .create(&desired())
        .await
        .unwrap();

    assert_eq!(host.id.as_str(), "vh-1");
    assert_eq!(host.uuid, "4201-aa");
    assert_eq!(host.spec.memory_size_gb, 8);
    assert_eq!(host.spec.interfaces, desired().interfaces);
}

#[tokio::test]
async fn test_create_validation_failure_yields_no_state() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(data(json!({
            "virtualHostCreate": {
                "__typename": "ValidationErrors",
                "message": "Invalid input",
                "errors": [{ "field": "hostname", "messages": ["already taken"] }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = VirtualHostReconciler::new(client)
        .create(&desired())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ValidationFailed { .. }));
    assert!(err.to_string().contains("hostname: [already taken]"));
}

#[tokio::test]
async fn test_create_unknown_payload_is_fatal() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(data(json!({
            "virtualHostCreate": { "__typename": "SomeNewType" }
        })))
        .mount(&server)
        .await;

    let err = VirtualHostReconciler::new(client)
        .create(&desired())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ProtocolViolation { .. }));
    assert!(err.to_string().contains("SomeNewType"));
}

#[tokio::test]
async fn test_create_without_interfaces_sends_nothing() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(data(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut spec = desired();
    spec.interfaces.clear();
    let err = VirtualHostReconciler::new(client)
        .create(&spec)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidDesiredState { .. }));
}

// ── Read ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_read_of_deleted_host_clears_state() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "id": "vh-1" } })))
        .respond_with(data(json!({ "virtualHost": null })))
        .expect(1)
        .mount(&server)
        .await;

    let current = VirtualHostReconciler::new(client)
        .read(&held())
        .await
        .unwrap();
    assert_eq!(current, None);
}

#[tokio::test]
async fn test_read_materializes_interfaces_when_none_are_held() {
    let (server, client) = setup().await;
    mount_get_vm(
        &server,
        vm_node(2, 8192, "tier-1", json!([{ "ip": "192.0.2.10", "prefixlen": 24 }])),
        1,
    )
    .await;

    let mut prior = held();
    prior.spec.interfaces.clear();
    prior.spec.allow_resize_restart = false;

    let current = VirtualHostReconciler::new(client)
        .read(&prior)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        current.spec.interfaces,
        vec![InterfaceSpec {
            network_id: "net-1".into(),
            auto_assign_ip: false,
            ip: Some("192.0.2.10".into()),
        }]
    );
    assert!(!current.spec.allow_resize_restart);
}

#[tokio::test]
async fn test_read_keeps_declared_interfaces() {
    let (server, client) = setup().await;
    mount_get_vm(
        &server,
        vm_node(2, 8192, "tier-1", json!([{ "ip": "192.0.2.10", "prefixlen": 24 }])),
        1,
    )
    .await;

    let current = VirtualHostReconciler::new(client)
        .read(&held())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(current.spec.interfaces, desired().interfaces);
}

#[tokio::test]
async fn test_read_accepts_null_interface_list() {
    let (server, client) = setup().await;
    let mut node = vm_node(2, 8192, "tier-1", json!([]));
    node["networkInterfaceList"] = json!(null);
    node["state"] = json!(null);
    mount_get_vm(&server, node, 1).await;

    let mut prior = held();
    prior.spec.interfaces.clear();

    let current = VirtualHostReconciler::new(client)
        .read(&prior)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(current.id.as_str(), "vh-1");
    assert_eq!(current.status, "");
    assert!(current.spec.interfaces.is_empty());
}

// ── Update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sizing_and_tier_together_are_rejected_locally() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(data(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut next = desired();
    next.cpu_count = 4;
    next.tier_id = "tier-2".into();

    let err = VirtualHostReconciler::new(client)
        .update(&held(), &next)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ConstraintRejected { .. }));
    assert!(err.is_local_rejection());
}

#[tokio::test]
async fn test_resize_sends_changed_fields_then_reads_once() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("mutation ResizeVm"))
        .and(body_partial_json(json!({
            "variables": {
                "input": { "virtualHost": "vh-1", "allowRestart": true, "cpuCount": 4 }
            }
        })))
        .respond_with(data(json!({
            "virtualHostResize": { "__typename": "TaskExecutionNode", "id": "task-1" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_get_vm(&server, vm_node(4, 8192, "tier-1", json!([])), 1).await;

    let mut next = desired();
    next.cpu_count = 4;

    let current = VirtualHostReconciler::new(client)
        .update(&held(), &next)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(current.spec.cpu_count, 4);
    assert_eq!(current.spec.memory_size_gb, 8);

    let requests = server.received_requests().await.unwrap();
    let resize: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let input = &resize["variables"]["input"];
    assert!(input.get("memorySizeGB").is_none());
    assert!(input.get("coresPerSocket").is_none());
}

#[tokio::test]
async fn test_retier_sends_only_the_tier() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("mutation UpdateVmTier"))
        .and(body_partial_json(json!({
            "variables": { "input": { "virtualHost": "vh-1", "tier": "tier-2" } }
        })))
        .respond_with(data(json!({
            "virtualHostUpdateTier": { "__typename": "TaskExecutionNode", "id": "task-2" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_get_vm(&server, vm_node(2, 8192, "tier-2", json!([])), 1).await;

    let mut next = desired();
    next.tier_id = "tier-2".into();

    let current = VirtualHostReconciler::new(client)
        .update(&held(), &next)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(current.spec.tier_id, "tier-2");
}

#[tokio::test]
async fn test_unavailable_resize_keeps_prior_state() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("mutation ResizeVm"))
        .respond_with(data(json!({
            "virtualHostResize": {
                "__typename": "OperationUnavailable",
                "message": "Host is locked",
                "reasons": ["MAINTENANCE"]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_get_vm(&server, vm_node(4, 8192, "tier-1", json!([])), 0).await;

    let mut next = desired();
    next.memory_size_gb = 16;

    let err = VirtualHostReconciler::new(client)
        .update(&held(), &next)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "virtualHostResize: Host is locked (reasons=MAINTENANCE)"
    );
}

#[tokio::test]
async fn test_identity_change_requires_replacement() {
    let (_server, client) = setup().await;

    let mut next = desired();
    next.template_id = "tmpl-2".into();

    let err = VirtualHostReconciler::new(client)
        .update(&held(), &next)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ReplacementRequired { .. }));
}

#[tokio::test]
async fn test_region_change_requires_replacement() {
    let (server, client) = setup().await;
    Mock::given(method("POST")).respond_with(data(json!({}))).expect(0).mount(&server).await;

    let mut next = desired();
    next.region = "SE".into();

    let err = VirtualHostReconciler::new(client)
        .update(&held(), &next)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "ocp_virtual_host: changing region requires replacing the host"
    );
}

// ── Delete / import ─────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_unauthorized_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("mutation DeleteVm"))
        .respond_with(data(json!({
            "virtualHostDelete": {
                "__typename": "Unauthorized",
                "message": "Not allowed"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = VirtualHostReconciler::new(client)
        .delete(&held())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_import_missing_host_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(data(json!({ "virtualHost": null })))
        .mount(&server)
        .await;

    let err = VirtualHostReconciler::new(client)
        .import(&RemoteId::from("vh-404"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "ocp_virtual_host vh-404 does not exist");
}

// ── Immutable hosts ─────────────────────────────────────────────────

#[tokio::test]
async fn test_immutable_import_records_every_address() {
    let (server, client) = setup().await;
    mount_get_vm(
        &server,
        vm_node(
            2,
            4096,
            "tier-1",
            json!([
                { "ip": "192.0.2.10", "prefixlen": 24 },
                { "ip": "192.0.2.11", "prefixlen": 24 }
            ]),
        ),
        1,
    )
    .await;

    let host: ImmutableHost = ImmutableHostReconciler::new(client)
        .import(&RemoteId::from("vh-1"))
        .await
        .unwrap();

    assert_eq!(host.spec.memory_size_gb, 4);
    assert_eq!(host.spec.interfaces.len(), 1);
    assert_eq!(host.spec.interfaces[0].ip_list, vec!["192.0.2.10", "192.0.2.11"]);
    assert_eq!(host.spec.ignition_config_data_encoding, "BASE64");
    assert!(host.spec.allow_resize_restart);
}

#[tokio::test]
async fn test_immutable_create_sends_ignition_data() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("mutation CreateVmImmutable"))
        .and(body_partial_json(json!({
            "variables": {
                "input": {
                    "ignitionConfigData": "eyJpZ25pdGlvbiI6e319",
                    "ignitionConfigDataEncoding": "BASE64",
                    "osDiskSizeGB": 20
                }
            }
        })))
        .respond_with(data(json!({
            "virtualHostCreateImmutable": {
                "__typename": "VirtualHostCreated",
                "virtualHost": vm_node(2, 4096, "tier-1", json!([]))
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let spec: ImmutableHostSpec = serde_json::from_value(json!({
        "region": "FI",
        "customer_id": "cust-1",
        "project_id": "proj-1",
        "hostname": "web01",
        "template_id": "tmpl-1",
        "tier_id": "tier-1",
        "cpu_count": 2,
        "memory_size_gb": 4,
        "ignition_config_data": "eyJpZ25pdGlvbiI6e319"
    }))
    .unwrap();

    let host = ImmutableHostReconciler::new(client)
        .create(&spec)
        .await
        .unwrap();
    assert_eq!(host.id.as_str(), "vh-1");
    assert_eq!(host.spec.os_disk_size_gb, 20);
}

// ── Shadow hosts ────────────────────────────────────────────────────

fn shadow_node(note: &str, tier: &str) -> serde_json::Value {
    json!({
        "__typename": "VirtualHostNode",
        "id": "vh-3",
        "uuid": "4203-bb",
        "hostname": "legacy-db",
        "note": note,
        "state": "RUNNING",
        "region": "SE",
        "tier": { "id": tier },
        "project": { "id": "proj-2" },
        "customer": { "id": "cust-2" },
        "vcenter": { "id": "vc-1", "name": "vc-prod" }
    })
}

fn shadow_desired() -> ShadowHostSpec {
    ShadowHostSpec {
        region: "SE".into(),
        vcenter_id: "vc-1".into(),
        project_id: "proj-2".into(),
        tier_id: "tier-2".into(),
        hostname: "legacy-db".into(),
        uuid: "4203-bb".into(),
        note: "db primary".into(),
    }
}

#[tokio::test]
async fn test_shadow_update_sends_note_and_tier_together() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("virtualHostCreateCaas"))
        .respond_with(data(json!({
            "virtualHostCreateCaas": shadow_node("db primary", "tier-2")
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("mutation UpdateVirtualHostCaas"))
        .and(body_partial_json(json!({
            "variables": {
                "input": { "virtualHost": "vh-3", "note": "db replica", "tier": "tier-3" }
            }
        })))
        .respond_with(data(json!({
            "virtualHostUpdateCaas": shadow_node("db replica", "tier-3")
        })))
        .expect(1)
        .mount(&server)
        .await;
    let mut read_back = shadow_node("db replica", "tier-3");
    read_back.as_object_mut().unwrap().remove("__typename");
    Mock::given(method("POST"))
        .and(body_string_contains("query GetVirtualHostCaas"))
        .respond_with(data(json!({ "virtualHost": read_back })))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = ShadowHostReconciler::new(client);
    let host = reconciler.create(&shadow_desired()).await.unwrap();
    assert_eq!(host.customer_id, "cust-2");

    let mut next = shadow_desired();
    next.note = "db replica".into();
    next.tier_id = "tier-3".into();
    let current = reconciler.update(&host, &next).await.unwrap().unwrap();

    assert_eq!(current.spec, next);
}

#[tokio::test]
async fn test_shadow_create_without_id_is_a_protocol_violation() {
    let (server, client) = setup().await;

    let mut node = shadow_node("db primary", "tier-2");
    node["id"] = json!("");
    Mock::given(method("POST"))
        .respond_with(data(json!({ "virtualHostCreateCaas": node })))
        .mount(&server)
        .await;

    let err = ShadowHostReconciler::new(client)
        .create(&shadow_desired())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ProtocolViolation { .. }));
}

#[tokio::test]
async fn test_shadow_import_accepts_null_note() {
    let (server, client) = setup().await;

    let mut node = shadow_node("", "tier-2");
    node.as_object_mut().unwrap().remove("__typename");
    node["note"] = json!(null);
    node["uuid"] = json!(null);
    Mock::given(method("POST"))
        .and(body_string_contains("query GetVirtualHostCaas"))
        .respond_with(data(json!({ "virtualHost": node })))
        .expect(1)
        .mount(&server)
        .await;

    let host = ShadowHostReconciler::new(client)
        .import(&RemoteId::from("vh-3"))
        .await
        .unwrap();

    assert_eq!(host.id.as_str(), "vh-3");
    assert_eq!(host.spec.note, "");
    assert_eq!(host.spec.uuid, "");
    assert_eq!(host.spec.tier_id, "tier-2");
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_lifecycle_replaces_on_template_change() {
    let (server, client) = setup().await;

    mount_get_vm(&server, vm_node(2, 8192, "tier-1", json!([])), 1).await;
    Mock::given(method("POST"))
        .and(body_string_contains("mutation DeleteVm"))
        .and(body_partial_json(json!({ "variables": { "input": { "virtualHost": "vh-1" } } })))
        .respond_with(data(json!({
            "virtualHostDelete": { "__typename": "TaskExecutionNode", "id": "task-9" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut created = vm_node(2, 8192, "tier-1", json!([]));
    created["id"] = json!("vh-2");
    created["template"] = json!({ "id": "tmpl-2" });
    Mock::given(method("POST"))
        .and(body_string_contains("mutation CreateVm"))
        .and(body_partial_json(json!({ "variables": { "input": { "template": "tmpl-2" } } })))
        .respond_with(data(json!({
            "virtualHostCreate": { "__typename": "VirtualHostCreated", "virtualHost": created }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let lifecycle = Lifecycle::new(VirtualHostReconciler::new(client));
    let mut next = desired();
    next.template_id = "tmpl-2".into();

    let applied = lifecycle.apply(Some(&held()), &next).await.unwrap();
    assert_eq!(applied.action, Action::Replaced);
    assert_eq!(applied.state.unwrap().id.as_str(), "vh-2");
}
