// ── Change sets and the update constraint guard ──
//
// An in-place update of an OCP host is one asynchronous job: either a resize
// or a tier migration. A change touching both is refused before any request
// is sent.

use strum::{Display, IntoStaticStr};
use tracing::debug;

use crate::error::CoreError;
use crate::model::Sizing;

/// Sizing fields that differ from the last observed state. Unchanged fields
/// stay `None` and are not resent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizingChange {
    pub cpu_count: Option<u32>,
    pub cores_per_socket: Option<u32>,
    pub memory_size_gb: Option<u32>,
}

impl SizingChange {
    pub fn between(prior: Sizing, desired: Sizing) -> Self {
        let changed = |from: u32, to: u32| (from != to).then_some(to);
        Self {
            cpu_count: changed(prior.cpu_count, desired.cpu_count),
            cores_per_socket: changed(prior.cores_per_socket, desired.cores_per_socket),
            memory_size_gb: changed(prior.memory_size_gb, desired.memory_size_gb),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cpu_count.is_none() && self.cores_per_socket.is_none() && self.memory_size_gb.is_none()
    }

    /// Names of the changed fields.
    pub fn fields(&self) -> Vec<&'static str> {
        [
            ("cpu_count", self.cpu_count),
            ("cores_per_socket", self.cores_per_socket),
            ("memory_size_gb", self.memory_size_gb),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|_| name))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ChangeCategory {
    Sizing,
    Tier,
}

/// Categorized difference between the last observed and the desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub sizing: SizingChange,
    /// New tier id, when it differs.
    pub tier: Option<String>,
}

/// The single job an update will submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedChange {
    Resize(SizingChange),
    Retier(String),
}

impl ChangeSet {
    pub fn compute(prior: Sizing, prior_tier: &str, desired: Sizing, desired_tier: &str) -> Self {
        Self {
            sizing: SizingChange::between(prior, desired),
            tier: (prior_tier != desired_tier).then(|| desired_tier.to_owned()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories().is_empty()
    }

    pub fn categories(&self) -> Vec<ChangeCategory> {
        let mut categories = Vec::with_capacity(2);
        if !self.sizing.is_empty() {
            categories.push(ChangeCategory::Sizing);
        }
        if self.tier.is_some() {
            categories.push(ChangeCategory::Tier);
        }
        categories
    }

    /// Changed field names across all categories.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = self.sizing.fields();
        if self.tier.is_some() {
            fields.push("tier_id");
        }
        fields
    }

    /// Apply the guard: `None` for no change, the one job to run, or a
    /// rejection when more than one category changed.
    pub fn plan(self, resource: &'static str) -> Result<Option<PlannedChange>, CoreError> {
        let categories = self.categories();
        debug!(resource, ?categories, "planning update");

        match (self.sizing.is_empty(), self.tier) {
            (true, None) => Ok(None),
            (false, None) => Ok(Some(PlannedChange::Resize(self.sizing))),
            (true, Some(tier)) => Ok(Some(PlannedChange::Retier(tier))),
            (false, Some(_)) => Err(CoreError::ConstraintRejected {
                resource,
                message: "simultaneous change of sizing (cpu_count/cores_per_socket/memory_size_gb) \
                          and tier_id in a single apply is not supported. Apply the sizing change \
                          first, wait for the job to finish, then apply the tier change in a \
                          separate run."
                    .into(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const BASE: Sizing = Sizing {
        cpu_count: 2,
        cores_per_socket: 1,
        memory_size_gb: 8,
    };

    #[test]
    fn no_difference_plans_nothing() {
        let changes = ChangeSet::compute(BASE, "tier-1", BASE, "tier-1");
        assert!(changes.is_empty());
        assert_eq!(changes.plan("ocp_virtual_host").unwrap(), None);
    }

    #[test]
    fn only_changed_sizing_fields_are_planned() {
        let desired = Sizing {
            memory_size_gb: 16,
            ..BASE
        };
        let planned = ChangeSet::compute(BASE, "tier-1", desired, "tier-1")
            .plan("ocp_virtual_host")
            .unwrap();
        assert_eq!(
            planned,
            Some(PlannedChange::Resize(SizingChange {
                memory_size_gb: Some(16),
                ..Default::default()
            }))
        );
    }

    #[test]
    fn tier_only_plans_retier() {
        let planned = ChangeSet::compute(BASE, "tier-1", BASE, "tier-2")
            .plan("ocp_virtual_host")
            .unwrap();
        assert_eq!(planned, Some(PlannedChange::Retier("tier-2".into())));
    }

    #[test]
    fn sizing_and_tier_together_are_rejected() {
        let desired = Sizing {
            cpu_count: 4,
            ..BASE
        };
        let changes = ChangeSet::compute(BASE, "tier-1", desired, "tier-2");
        assert_eq!(
            changes.categories(),
            vec![ChangeCategory::Sizing, ChangeCategory::Tier]
        );
        assert_eq!(changes.fields(), vec!["cpu_count", "tier_id"]);

        let err = changes.plan("ocp_virtual_host").unwrap_err();
        assert!(matches!(err, CoreError::ConstraintRejected { .. }), "got {err:?}");
        assert!(err.to_string().contains("separate run"));
    }

    #[test]
    fn category_names_are_snake_case() {
        assert_eq!(ChangeCategory::Sizing.to_string(), "sizing");
        let name: &'static str = ChangeCategory::Tier.into();
        assert_eq!(name, "tier");
    }
}
