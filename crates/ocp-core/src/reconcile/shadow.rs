use std::sync::Arc;

use tracing::info;

use ocp_api::GraphQlClient;
use ocp_api::types::ShadowHostUpdateInput;

use super::{BoxFuture, Reconciler, differing, require_id};
use crate::error::CoreError;
use crate::model::{HostKind, RemoteId, ShadowHost, ShadowHostSpec};

const KIND: HostKind = HostKind::Shadow;

/// Reconciler for shadow (inventory-only) hosts.
///
/// Note and tier change together in one `virtualHostUpdateCaas` call; the
/// sizing/tier guard does not apply because nothing is resized.
#[derive(Debug, Clone)]
pub struct ShadowHostReconciler {
    client: Arc<GraphQlClient>,
}

impl ShadowHostReconciler {
    pub fn new(client: Arc<GraphQlClient>) -> Self {
        Self { client }
    }

    fn update_input(prior: &ShadowHost, desired: &ShadowHostSpec) -> ShadowHostUpdateInput {
        ShadowHostUpdateInput {
            virtual_host: prior.id.to_string(),
            note: (prior.spec.note != desired.note).then(|| desired.note.clone()),
            tier: (prior.spec.tier_id != desired.tier_id).then(|| desired.tier_id.clone()),
        }
    }
}

impl Reconciler for ShadowHostReconciler {
    type Desired = ShadowHostSpec;
    type Observed = ShadowHost;

    fn kind(&self) -> HostKind {
        KIND
    }

    fn remote_id<'o>(&self, observed: &'o ShadowHost) -> &'o RemoteId {
        &observed.id
    }

    fn create<'a>(
        &'a self,
        desired: &'a ShadowHostSpec,
    ) -> BoxFuture<'a, Result<ShadowHost, CoreError>> {
        Box::pin(async move {
            desired.validate()?;
            let node = self
                .client
                .create_shadow_host(&desired.to_create_input())
                .await?
                .into_result("virtualHostCreateCaas")?;

            let host = ShadowHost::from_node(node);
            require_id(KIND, "virtualHostCreateCaas", &host.id)?;
            info!(
                id = %host.id,
                hostname = %host.spec.hostname,
                vcenter = %host.spec.vcenter_id,
                "shadow host registered"
            );
            Ok(host)
        })
    }

    fn read<'a>(
        &'a self,
        prior: &'a ShadowHost,
    ) -> BoxFuture<'a, Result<Option<ShadowHost>, CoreError>> {
        Box::pin(async move {
            match self.client.get_shadow_host(prior.id.as_str()).await? {
                Some(node) => Ok(Some(ShadowHost::from_node(node))),
                None => {
                    info!(id = %prior.id, "shadow host no longer exists, forgetting it");
                    Ok(None)
                }
            }
        })
    }

    fn update<'a>(
        &'a self,
        prior: &'a ShadowHost,
        desired: &'a ShadowHostSpec,
    ) -> BoxFuture<'a, Result<Option<ShadowHost>, CoreError>> {
        Box::pin(async move {
            let replace = self.replacement_fields(prior, desired);
            if !replace.is_empty() {
                return Err(CoreError::ReplacementRequired {
                    resource: KIND.resource_name(),
                    fields: replace,
                });
            }
            desired.validate()?;

            let input = Self::update_input(prior, desired);
            if input.note.is_some() || input.tier.is_some() {
                self.client
                    .update_shadow_host(&input)
                    .await?
                    .into_result("virtualHostUpdateCaas")?;
                info!(id = %prior.id, fields = ?self.changed_fields(prior, desired), "shadow host updated");
            }

            self.read(prior).await
        })
    }

    fn delete<'a>(&'a self, prior: &'a ShadowHost) -> BoxFuture<'a, Result<(), CoreError>> {
        Box::pin(async move {
            self.client
                .delete_shadow_host(prior.id.as_str())
                .await?
                .into_result("virtualHostDeleteCaas")?;
            info!(id = %prior.id, "shadow host removed");
            Ok(())
        })
    }

    fn import<'a>(&'a self, id: &'a RemoteId) -> BoxFuture<'a, Result<ShadowHost, CoreError>> {
        Box::pin(async move {
            let node = self
                .client
                .get_shadow_host(id.as_str())
                .await?
                .ok_or_else(|| CoreError::NotFound {
                    resource: KIND.resource_name(),
                    id: id.to_string(),
                })?;
            info!(%id, "shadow host imported");
            Ok(ShadowHost::from_node(node))
        })
    }

    fn replacement_fields(&self, prior: &ShadowHost, desired: &ShadowHostSpec) -> Vec<&'static str> {
        let held = &prior.spec;
        differing([
            ("region", held.region != desired.region),
            ("vcenter_id", held.vcenter_id != desired.vcenter_id),
            ("project_id", held.project_id != desired.project_id),
            ("hostname", held.hostname != desired.hostname),
            ("uuid", held.uuid != desired.uuid),
        ])
    }

    fn changed_fields(&self, prior: &ShadowHost, desired: &ShadowHostSpec) -> Vec<&'static str> {
        differing([
            ("note", prior.spec.note != desired.note),
            ("tier_id", prior.spec.tier_id != desired.tier_id),
        ])
    }
}
