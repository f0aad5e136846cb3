// Lookup resolvers
//
// Name → id resolution for the objects a host declaration references.
// Every resolver filters on exact matches and insists on exactly one result.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::GraphQlClient;
use crate::error::Error;
use crate::types::NodeRef;

/// Solution type used when the caller does not name one.
pub const DEFAULT_SOLUTION_TYPE: &str = "OCP";

const CUSTOMER_BY_NAME: &str = r"
query CustomerByName($name: StrFilterLookup) {
  customerList(filters: { name: $name }) {
    edges { node { id name } }
  }
}
";

const PROJECT_BY_NAME: &str = r"
query ProjectByNameAndCustomer($name: StrFilterLookup, $customer: CustomerFilter) {
  projectList(filters: { name: $name, customer: $customer }) {
    edges { node { id name customer { id name } } }
  }
}
";

const DOMAIN_BY_FILTERS: &str = r"
query DomainByFilters($filters: DomainFilter) {
  domainList(filters: $filters, first: 100) {
    edges { node { id name } }
  }
}
";

const NETWORK_BY_NAME: &str = r"
query NetworkByName($name: StrFilterLookup, $customer: CustomerFilter) {
  networkList(filters: { name: $name, customer: $customer }) {
    edges { node { id name customer { id } } }
  }
}
";

const TIER_BY_NAME: &str = r"
query TierByName($name: StrFilterLookup, $solutionType: SolutionTypeEnumFilterLookup) {
  tierList(filters: { name: $name, solutionType: $solutionType }) {
    edges { node { id name } }
  }
}
";

const TEMPLATE_BY_NAME: &str = r"
query TemplateByName($filters: TemplateFilter) {
  templateList(filters: $filters) {
    edges { node { id name } }
  }
}
";

const DATA_PROTECTION_POLICY_BY_FILTERS: &str = r"
query DataProtectionPolicyByFilters($filters: DataProtectionPolicyFilter) {
  dataProtectionPolicyList(filters: $filters, first: 100) {
    edges { node { id note customer { id name } } }
  }
}
";

const VCENTER_BY_NAME: &str = r"
query VcenterByNameAndCustomer($name: StrFilterLookup, $customer: CustomerFilter) {
  vcenterList(filters: { name: $name, customer: $customer, DISTINCT: true }) {
    edges { node { id name customer { id name } } }
  }
}
";

#[derive(Debug, Default, Deserialize)]
struct Connection {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: NodeRef,
}

impl Connection {
    /// The id of the only node, or a not-found / ambiguous error.
    fn single(self, kind: &'static str, criteria: String) -> Result<String, Error> {
        let mut edges = self.edges;
        match edges.len() {
            0 => Err(Error::LookupNotFound { kind, criteria }),
            1 => Ok(edges.remove(0).node.id),
            count => Err(Error::LookupAmbiguous {
                kind,
                criteria,
                count,
            }),
        }
    }
}

fn exact(value: &str) -> Value {
    json!({ "exact": value })
}

fn customer_filter(customer_id: &str) -> Value {
    json!({ "id": exact(customer_id) })
}

fn solution_type(solution_type: Option<&str>) -> String {
    solution_type.map_or_else(|| DEFAULT_SOLUTION_TYPE.to_owned(), str::to_uppercase)
}

impl GraphQlClient {
    async fn lookup(&self, document: &str, variables: &Value, field: &str) -> Result<Connection, Error> {
        let conn: Option<Connection> = self.query(document, variables, field).await?;
        Ok(conn.unwrap_or_default())
    }

    pub async fn find_customer(&self, name: &str) -> Result<String, Error> {
        debug!(name, "looking up customer");
        self.lookup(CUSTOMER_BY_NAME, &json!({ "name": exact(name) }), "customerList")
            .await?
            .single("customer", format!("with name {name:?}"))
    }

    pub async fn find_project(&self, name: &str, customer_id: &str) -> Result<String, Error> {
        debug!(name, customer_id, "looking up project");
        let vars = json!({ "name": exact(name), "customer": customer_filter(customer_id) });
        self.lookup(PROJECT_BY_NAME, &vars, "projectList")
            .await?
            .single(
                "project",
                format!("with name {name:?} for customer {customer_id:?}"),
            )
    }

    /// Domains are paged; only the first 100 matches are considered.
    pub async fn find_domain(&self, name: &str, customer_id: &str) -> Result<String, Error> {
        debug!(name, customer_id, "looking up domain");
        let vars = json!({
            "filters": { "customer": customer_filter(customer_id), "name": exact(name) }
        });
        self.lookup(DOMAIN_BY_FILTERS, &vars, "domainList")
            .await?
            .single(
                "domain",
                format!("for customer {customer_id:?} with name {name:?}"),
            )
    }

    pub async fn find_network(&self, name: &str, customer_id: &str) -> Result<String, Error> {
        debug!(name, customer_id, "looking up network");
        let vars = json!({ "name": exact(name), "customer": customer_filter(customer_id) });
        self.lookup(NETWORK_BY_NAME, &vars, "networkList")
            .await?
            .single(
                "network",
                format!("with name {name:?} for customer {customer_id:?}"),
            )
    }

    /// Storage tier by name. The solution type defaults to `OCP` and is
    /// upper-cased.
    pub async fn find_tier(&self, name: &str, solution: Option<&str>) -> Result<String, Error> {
        let solution = solution_type(solution);
        debug!(name, solution, "looking up tier");
        let vars = json!({ "name": exact(name), "solutionType": exact(&solution) });
        self.lookup(TIER_BY_NAME, &vars, "tierList")
            .await?
            .single(
                "tier",
                format!("with name {name:?} for solution type {solution:?}"),
            )
    }

    /// OS template by name. Region and solution type are upper-cased.
    pub async fn find_template(
        &self,
        name: &str,
        customer_id: &str,
        region: &str,
        solution: Option<&str>,
    ) -> Result<String, Error> {
        let solution = solution_type(solution);
        let region = region.to_uppercase();
        debug!(name, customer_id, region, solution, "looking up template");
        let vars = json!({
            "filters": {
                "name": exact(name),
                "customer": customer_filter(customer_id),
                "solutionType": exact(&solution),
                "region": exact(&region),
            }
        });
        self.lookup(TEMPLATE_BY_NAME, &vars, "templateList")
            .await?
            .single(
                "template",
                format!(
                    "with name {name:?} for customer {customer_id:?}, region {region:?}, solution type {solution:?}"
                ),
            )
    }

    /// Shared (non-dedicated) data protection policy by note, scoped to a
    /// customer project and solution type.
    pub async fn find_data_protection_policy(
        &self,
        note: &str,
        customer_id: &str,
        project_id: &str,
        solution: Option<&str>,
    ) -> Result<String, Error> {
        let solution = solution_type(solution);
        debug!(note, customer_id, project_id, solution, "looking up data protection policy");
        let vars = json!({
            "filters": {
                "customer": {
                    "id": exact(customer_id),
                    "projectList": { "id": exact(project_id) },
                },
                "separationPodList": { "solutionType": exact(&solution) },
                "dedicatedCluster": { "id": { "isNull": true } },
                "note": exact(note),
                "DISTINCT": true,
            }
        });
        self.lookup(DATA_PROTECTION_POLICY_BY_FILTERS, &vars, "dataProtectionPolicyList")
            .await?
            .single(
                "data protection policy",
                format!(
                    "for customer {customer_id:?}, project {project_id:?}, solution type {solution:?}, note {note:?}"
                ),
            )
    }

    pub async fn find_vcenter(&self, name: &str, customer_id: &str) -> Result<String, Error> {
        debug!(name, customer_id, "looking up vcenter");
        let vars = json!({ "name": exact(name), "customer": customer_filter(customer_id) });
        self.lookup(VCENTER_BY_NAME, &vars, "vcenterList")
            .await?
            .single(
                "vcenter",
                format!("with name {name:?} for customer {customer_id:?}"),
            )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn conn(ids: &[&str]) -> Connection {
        Connection {
            edges: ids
                .iter()
                .map(|id| Edge {
                    node: NodeRef { id: (*id).to_owned() },
                })
                .collect(),
        }
    }

    #[test]
    fn single_match_yields_id() {
        assert_eq!(conn(&["c-1"]).single("customer", String::new()).unwrap(), "c-1");
    }

    #[test]
    fn no_match_is_not_found() {
        let err = conn(&[]).single("customer", "with name \"acme\"".into()).unwrap_err();
        assert_eq!(err.to_string(), "no customer found with name \"acme\"");
    }

    #[test]
    fn several_matches_are_ambiguous() {
        let err = conn(&["a", "b"]).single("tier", String::new()).unwrap_err();
        assert!(matches!(err, Error::LookupAmbiguous { count: 2, .. }), "got {err:?}");
    }

    #[test]
    fn solution_type_defaults_and_uppercases() {
        assert_eq!(solution_type(None), "OCP");
        assert_eq!(solution_type(Some("caas")), "CAAS");
    }
}
