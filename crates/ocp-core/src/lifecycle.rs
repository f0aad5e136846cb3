// ── Lifecycle driver ──
//
// Sequences reconciler calls for one resource instance: create when nothing
// is held, refresh before converging, replace when identity fields moved.
// Operations on one instance never overlap; the driver awaits each step.

use serde::Serialize;
use strum::Display;
use tracing::info;

use crate::error::CoreError;
use crate::model::RemoteId;
use crate::reconcile::Reconciler;

/// Where a resource instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ResourceStatus {
    Absent,
    Creating,
    Present,
    Updating,
    Deleting,
}

/// What an apply run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    /// Nothing was held, or the held host had vanished.
    Created,
    Updated,
    Unchanged,
    /// Identity fields changed: deleted and created again.
    Replaced,
    /// The host disappeared while converging.
    Forgotten,
}

/// Result of [`Lifecycle::apply`]. `state` is `None` only for
/// [`Action::Forgotten`].
#[derive(Debug, Clone)]
pub struct Applied<O> {
    pub action: Action,
    pub state: Option<O>,
}

pub struct Lifecycle<R> {
    reconciler: R,
}

impl<R: Reconciler> Lifecycle<R> {
    pub fn new(reconciler: R) -> Self {
        Self { reconciler }
    }

    pub fn reconciler(&self) -> &R {
        &self.reconciler
    }

    fn transition(&self, id: Option<&RemoteId>, from: ResourceStatus, to: ResourceStatus) {
        let resource = self.reconciler.kind().resource_name();
        match id {
            Some(id) => info!(resource, %id, %from, %to, "lifecycle transition"),
            None => info!(resource, %from, %to, "lifecycle transition"),
        }
    }

    async fn create(&self, desired: &R::Desired) -> Result<R::Observed, CoreError> {
        self.transition(None, ResourceStatus::Absent, ResourceStatus::Creating);
        let created = self.reconciler.create(desired).await?;
        self.transition(
            Some(self.reconciler.remote_id(&created)),
            ResourceStatus::Creating,
            ResourceStatus::Present,
        );
        Ok(created)
    }

    /// Converge toward `desired`.
    ///
    /// On error the caller keeps `prior`. During a replacement the old host
    /// may already be gone when creation fails; the next refresh reports it
    /// absent.
    pub async fn apply(
        &self,
        prior: Option<&R::Observed>,
        desired: &R::Desired,
    ) -> Result<Applied<R::Observed>, CoreError> {
        let Some(prior) = prior else {
            let state = self.create(desired).await?;
            return Ok(Applied {
                action: Action::Created,
                state: Some(state),
            });
        };

        let Some(current) = self.refresh(prior).await? else {
            let state = self.create(desired).await?;
            return Ok(Applied {
                action: Action::Created,
                state: Some(state),
            });
        };

        let replace = self.reconciler.replacement_fields(&current, desired);
        if !replace.is_empty() {
            info!(
                resource = self.reconciler.kind().resource_name(),
                id = %self.reconciler.remote_id(&current),
                fields = ?replace,
                "replacing host"
            );
            self.destroy(&current).await?;
            let state = self.create(desired).await?;
            return Ok(Applied {
                action: Action::Replaced,
                state: Some(state),
            });
        }

        let changed = self.reconciler.changed_fields(&current, desired);
        let id = self.reconciler.remote_id(&current);
        if !changed.is_empty() {
            self.transition(Some(id), ResourceStatus::Present, ResourceStatus::Updating);
        }

        let action = if changed.is_empty() {
            Action::Unchanged
        } else {
            Action::Updated
        };
        match self.reconciler.update(&current, desired).await? {
            Some(state) => {
                if action == Action::Updated {
                    self.transition(
                        Some(self.reconciler.remote_id(&state)),
                        ResourceStatus::Updating,
                        ResourceStatus::Present,
                    );
                }
                Ok(Applied {
                    action,
                    state: Some(state),
                })
            }
            None => Ok(Applied {
                action: Action::Forgotten,
                state: None,
            }),
        }
    }

    /// Read the host back. `None` means it was deleted outside this engine.
    pub async fn refresh(&self, prior: &R::Observed) -> Result<Option<R::Observed>, CoreError> {
        let current = self.reconciler.read(prior).await?;
        if current.is_none() {
            self.transition(
                Some(self.reconciler.remote_id(prior)),
                ResourceStatus::Present,
                ResourceStatus::Absent,
            );
        }
        Ok(current)
    }

    pub async fn destroy(&self, prior: &R::Observed) -> Result<(), CoreError> {
        let id = self.reconciler.remote_id(prior);
        self.transition(Some(id), ResourceStatus::Present, ResourceStatus::Deleting);
        self.reconciler.delete(prior).await?;
        self.transition(Some(id), ResourceStatus::Deleting, ResourceStatus::Absent);
        Ok(())
    }

    pub async fn import(&self, id: &RemoteId) -> Result<R::Observed, CoreError> {
        let state = self.reconciler.import(id).await?;
        self.transition(Some(id), ResourceStatus::Absent, ResourceStatus::Present);
        Ok(state)
    }
}
