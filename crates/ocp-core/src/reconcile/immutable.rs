use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::info;

use ocp_api::GraphQlClient;

use super::{
    BoxFuture, Reconciler, differing, require_id, submit_change, warn_unapplied,
};
use crate::change::ChangeSet;
use crate::error::CoreError;
use crate::model::{HostKind, ImmutableHost, ImmutableHostSpec, RemoteId};

const KIND: HostKind = HostKind::Immutable;

/// Reconciler for ignition-configured hosts. Shares read, resize, retier and
/// delete with template hosts; only creation differs.
#[derive(Debug, Clone)]
pub struct ImmutableHostReconciler {
    client: Arc<GraphQlClient>,
}

impl ImmutableHostReconciler {
    pub fn new(client: Arc<GraphQlClient>) -> Self {
        Self { client }
    }

    fn changes(prior: &ImmutableHost, desired: &ImmutableHostSpec) -> ChangeSet {
        ChangeSet::compute(
            prior.spec.sizing(),
            &prior.spec.tier_id,
            desired.sizing(),
            &desired.tier_id,
        )
    }

    fn unapplied_fields(prior: &ImmutableHost, desired: &ImmutableHostSpec) -> Vec<&'static str> {
        let held = &prior.spec;
        differing([
            ("hostname", held.hostname != desired.hostname),
            ("note", held.note != desired.note),
            (
                "data_protection_policy",
                desired.data_protection_policy.is_some()
                    && held.data_protection_policy != desired.data_protection_policy,
            ),
            (
                "ignition_config_data",
                held.ignition_config_data.expose_secret()
                    != desired.ignition_config_data.expose_secret(),
            ),
            (
                "ignition_config_data_encoding",
                held.ignition_config_data_encoding != desired.ignition_config_data_encoding,
            ),
            ("os_disk_size_gb", held.os_disk_size_gb != desired.os_disk_size_gb),
            ("notify_user", held.notify_user != desired.notify_user),
            ("cluster_type", held.cluster_type != desired.cluster_type),
            ("version", held.version != desired.version),
            ("anti_affinity", held.anti_affinity != desired.anti_affinity),
            ("business_service", held.business_service != desired.business_service),
            ("dedicated_cluster", held.dedicated_cluster != desired.dedicated_cluster),
            (
                "dedicated_dr_cluster",
                held.dedicated_dr_cluster != desired.dedicated_dr_cluster,
            ),
            (
                "interfaces",
                !desired.interfaces.is_empty() && held.interfaces != desired.interfaces,
            ),
            ("local_disk_list", held.local_disk_list != desired.local_disk_list),
        ])
    }
}

impl Reconciler for ImmutableHostReconciler {
    type Desired = ImmutableHostSpec;
    type Observed = ImmutableHost;

    fn kind(&self) -> HostKind {
        KIND
    }

    fn remote_id<'o>(&self, observed: &'o ImmutableHost) -> &'o RemoteId {
        &observed.id
    }

    fn create<'a>(
        &'a self,
        desired: &'a ImmutableHostSpec,
    ) -> BoxFuture<'a, Result<ImmutableHost, CoreError>> {
        Box::pin(async move {
            desired.validate()?;
            let node = self
                .client
                .create_immutable_virtual_host(&desired.to_create_input())
                .await?
                .into_result("virtualHostCreateImmutable")?;

            let host = ImmutableHost::from_created(node, desired);
            require_id(KIND, "virtualHostCreateImmutable", &host.id)?;
            info!(
                id = %host.id,
                hostname = %host.spec.hostname,
                status = %host.status,
                "immutable virtual host created"
            );
            Ok(host)
        })
    }

    fn read<'a>(
        &'a self,
        prior: &'a ImmutableHost,
    ) -> BoxFuture<'a, Result<Option<ImmutableHost>, CoreError>> {
        Box::pin(async move {
            match self.client.get_virtual_host(prior.id.as_str()).await? {
                Some(node) => Ok(Some(prior.refreshed(node))),
                None => {
                    info!(id = %prior.id, "immutable virtual host no longer exists, forgetting it");
                    Ok(None)
                }
            }
        })
    }

    fn update<'a>(
        &'a self,
        prior: &'a ImmutableHost,
        desired: &'a ImmutableHostSpec,
    ) -> BoxFuture<'a, Result<Option<ImmutableHost>, CoreError>> {
        Box::pin(async move {
            let replace = self.replacement_fields(prior, desired);
            if !replace.is_empty() {
                return Err(CoreError::ReplacementRequired {
                    resource: KIND.resource_name(),
                    fields: replace,
                });
            }
            desired.validate()?;
            let planned = Self::changes(prior, desired).plan(KIND.resource_name())?;
            warn_unapplied(KIND, &prior.id, &Self::unapplied_fields(prior, desired));

            if let Some(change) = planned {
                submit_change(&self.client, &prior.id, desired.allow_resize_restart, change)
                    .await?;
            }

            let mut held = prior.clone();
            held.spec.allow_resize_restart = desired.allow_resize_restart;
            self.read(&held).await
        })
    }

    fn delete<'a>(&'a self, prior: &'a ImmutableHost) -> BoxFuture<'a, Result<(), CoreError>> {
        Box::pin(async move {
            self.client
                .delete_virtual_host(prior.id.as_str())
                .await?
                .into_result("virtualHostDelete")?;
            info!(id = %prior.id, "immutable virtual host deleted");
            Ok(())
        })
    }

    fn import<'a>(&'a self, id: &'a RemoteId) -> BoxFuture<'a, Result<ImmutableHost, CoreError>> {
        Box::pin(async move {
            let node = self
                .client
                .get_virtual_host(id.as_str())
                .await?
                .ok_or_else(|| CoreError::NotFound {
                    resource: KIND.resource_name(),
                    id: id.to_string(),
                })?;
            info!(%id, "immutable virtual host imported");
            Ok(ImmutableHost::imported(node))
        })
    }

    fn replacement_fields(
        &self,
        prior: &ImmutableHost,
        desired: &ImmutableHostSpec,
    ) -> Vec<&'static str> {
        differing([
            ("region", prior.spec.region != desired.region),
            ("customer_id", prior.spec.customer_id != desired.customer_id),
            ("project_id", prior.spec.project_id != desired.project_id),
            ("template_id", prior.spec.template_id != desired.template_id),
        ])
    }

    fn changed_fields(&self, prior: &ImmutableHost, desired: &ImmutableHostSpec) -> Vec<&'static str> {
        Self::changes(prior, desired).fields()
    }
}
