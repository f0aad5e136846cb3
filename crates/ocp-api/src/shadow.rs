// Shadow (CAAS) virtual host endpoints
//
// Shadow hosts are inventory records for machines that already exist in a
// customer's vCenter. The backend returns the node itself as the success arm.

use tracing::debug;

use crate::client::GraphQlClient;
use crate::error::Error;
use crate::hosts::failure_arms;
use crate::outcome::{Outcome, SuccessArm};
use crate::types::{
    IdVariables, ShadowHostCreateInput, ShadowHostNode, ShadowHostUpdateInput,
    VirtualHostDeleteInput,
};

pub const VIRTUAL_HOST_NODE: SuccessArm = SuccessArm::inline("VirtualHostNode");

const CREATE_CAAS: &str = concat!(
    r"
mutation CreateVirtualHostCaas($input: VirtualHostCreateCaasInput!) {
  virtualHostCreateCaas(input: $input) {
    __typename
    ... on VirtualHostNode {
      id
      uuid
      hostname
      note
      state
      region
      tier { id }
      project { id }
      customer { id }
      vcenter { id name }
    }",
    failure_arms!(),
    r"
  }
}
"
);

const UPDATE_CAAS: &str = concat!(
    r"
mutation UpdateVirtualHostCaas($input: VirtualHostUpdateCaasInput!) {
  virtualHostUpdateCaas(input: $input) {
    __typename
    ... on VirtualHostNode {
      id
      uuid
      hostname
      note
      state
      region
      tier { id }
      project { id }
      customer { id }
      vcenter { id name }
    }",
    failure_arms!(),
    r"
  }
}
"
);

const DELETE_CAAS: &str = concat!(
    r"
mutation DeleteVirtualHostCaas($input: VirtualHostDeleteCaasInput!) {
  virtualHostDeleteCaas(input: $input) {
    __typename
    ... on VirtualHostNode { id }",
    failure_arms!(),
    r"
  }
}
"
);

const GET_CAAS: &str = r"
query GetVirtualHostCaas($id: GlobalID!) {
  virtualHost(id: $id) {
    id
    uuid
    hostname
    note
    state
    region
    tier { id }
    project { id }
    customer { id }
    vcenter { id name }
  }
}
";

impl GraphQlClient {
    /// Register an existing vCenter machine. `virtualHostCreateCaas`.
    pub async fn create_shadow_host(
        &self,
        input: &ShadowHostCreateInput,
    ) -> Result<Outcome<ShadowHostNode>, Error> {
        debug!(hostname = %input.hostname, uuid = %input.uuid, "creating shadow host");
        self.mutation("virtualHostCreateCaas", CREATE_CAAS, input, VIRTUAL_HOST_NODE)
            .await
    }

    pub async fn get_shadow_host(&self, id: &str) -> Result<Option<ShadowHostNode>, Error> {
        debug!(id, "reading shadow host");
        self.query(GET_CAAS, &IdVariables { id }, "virtualHost").await
    }

    /// Change note and/or tier in one call. `virtualHostUpdateCaas`.
    pub async fn update_shadow_host(
        &self,
        input: &ShadowHostUpdateInput,
    ) -> Result<Outcome<ShadowHostNode>, Error> {
        debug!(id = %input.virtual_host, "updating shadow host");
        self.mutation("virtualHostUpdateCaas", UPDATE_CAAS, input, VIRTUAL_HOST_NODE)
            .await
    }

    pub async fn delete_shadow_host(&self, id: &str) -> Result<Outcome<ShadowHostNode>, Error> {
        debug!(id, "deleting shadow host");
        let input = VirtualHostDeleteInput {
            virtual_host: id.to_owned(),
        };
        self.mutation("virtualHostDeleteCaas", DELETE_CAAS, &input, VIRTUAL_HOST_NODE)
            .await
    }
}
