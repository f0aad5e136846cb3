use std::sync::Arc;

use tracing::info;

use ocp_api::GraphQlClient;

use super::{
    BoxFuture, Reconciler, differing, require_id, submit_change, warn_unapplied,
};
use crate::change::ChangeSet;
use crate::error::CoreError;
use crate::model::{HostKind, RemoteId, VirtualHost, VirtualHostSpec};

const KIND: HostKind = HostKind::Standard;

/// Reconciler for template-provisioned hosts.
#[derive(Debug, Clone)]
pub struct VirtualHostReconciler {
    client: Arc<GraphQlClient>,
}

impl VirtualHostReconciler {
    pub fn new(client: Arc<GraphQlClient>) -> Self {
        Self { client }
    }

    fn changes(prior: &VirtualHost, desired: &VirtualHostSpec) -> ChangeSet {
        ChangeSet::compute(
            prior.spec.sizing(),
            &prior.spec.tier_id,
            desired.sizing(),
            &desired.tier_id,
        )
    }

    /// Declared differences with no mutation behind them.
    fn unapplied_fields(prior: &VirtualHost, desired: &VirtualHostSpec) -> Vec<&'static str> {
        let held = &prior.spec;
        differing([
            ("hostname", held.hostname != desired.hostname),
            ("domain_id", held.domain_id != desired.domain_id),
            ("note", held.note != desired.note),
            (
                "data_protection_policy",
                held.data_protection_policy != desired.data_protection_policy,
            ),
            (
                "interfaces",
                !desired.interfaces.is_empty() && held.interfaces != desired.interfaces,
            ),
        ])
    }
}

impl Reconciler for VirtualHostReconciler {
    type Desired = VirtualHostSpec;
    type Observed = VirtualHost;

    fn kind(&self) -> HostKind {
        KIND
    }

    fn remote_id<'o>(&self, observed: &'o VirtualHost) -> &'o RemoteId {
        &observed.id
    }

    fn create<'a>(
        &'a self,
        desired: &'a VirtualHostSpec,
    ) -> BoxFuture<'a, Result<VirtualHost, CoreError>> {
        Box::pin(async move {
            desired.validate()?;
            let node = self
                .client
                .create_virtual_host(&desired.to_create_input())
                .await?
                .into_result("virtualHostCreate")?;

            let host = VirtualHost::from_created(node, desired);
            require_id(KIND, "virtualHostCreate", &host.id)?;
            info!(
                id = %host.id,
                hostname = %host.spec.hostname,
                status = %host.status,
                "virtual host created"
            );
            Ok(host)
        })
    }

    fn read<'a>(
        &'a self,
        prior: &'a VirtualHost,
    ) -> BoxFuture<'a, Result<Option<VirtualHost>, CoreError>> {
        Box::pin(async move {
            match self.client.get_virtual_host(prior.id.as_str()).await? {
                Some(node) => Ok(Some(prior.refreshed(node))),
                None => {
                    info!(id = %prior.id, "virtual host no longer exists, forgetting it");
                    Ok(None)
                }
            }
        })
    }

    fn update<'a>(
        &'a self,
        prior: &'a VirtualHost,
        desired: &'a VirtualHostSpec,
    ) -> BoxFuture<'a, Result<Option<VirtualHost>, CoreError>> {
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

    fn delete<'a>(&'a self, prior: &'a VirtualHost) -> BoxFuture<'a, Result<(), CoreError>> {
        Box::pin(async move {
            self.client
                .delete_virtual_host(prior.id.as_str())
                .await?
                .into_result("virtualHostDelete")?;
            info!(id = %prior.id, "virtual host deleted");
            Ok(())
        })
    }

    fn import<'a>(&'a self, id: &'a RemoteId) -> BoxFuture<'a, Result<VirtualHost, CoreError>> {
        Box::pin(async move {
            let node = self
                .client
                .get_virtual_host(id.as_str())
                .await?
                .ok_or_else(|| CoreError::NotFound {
                    resource: KIND.resource_name(),
                    id: id.to_string(),
                })?;
            info!(%id, "virtual host imported");
            Ok(VirtualHost::imported(node))
        })
    }

    fn replacement_fields(&self, prior: &VirtualHost, desired: &VirtualHostSpec) -> Vec<&'static str> {
        differing([
            ("region", prior.spec.region != desired.region),
            ("customer_id", prior.spec.customer_id != desired.customer_id),
            ("project_id", prior.spec.project_id != desired.project_id),
            ("template_id", prior.spec.template_id != desired.template_id),
        ])
    }

    fn changed_fields(&self, prior: &VirtualHost, desired: &VirtualHostSpec) -> Vec<&'static str> {
        Self::changes(prior, desired).fields()
    }
}
