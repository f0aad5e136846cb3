// Virtual host endpoints
//
// Standard and immutable hosts share the `virtualHost` read and the
// `virtualHostDelete` mutation; they differ only in the create mutation.
// Every mutation selects the three shared failure arms.

use tracing::debug;

use crate::client::GraphQlClient;
use crate::error::Error;
use crate::outcome::{Outcome, Payload, SuccessArm};
use crate::types::{
    IdVariables, InputVariables, TaskExecution, VirtualHostCreateImmutableInput,
    VirtualHostCreateInput, VirtualHostDeleteInput, VirtualHostNode, VirtualHostResizeInput,
    VirtualHostUpdateTierInput,
};

/// Selection of the shared failure arms, spliced into every mutation document.
macro_rules! failure_arms {
    () => {
        r"
    ... on ValidationErrors {
      message
      errors { field messages }
    }
    ... on Unauthorized {
      message
    }
    ... on OperationUnavailable {
      message
      reasons
    }"
    };
}
pub(crate) use failure_arms;

pub const VIRTUAL_HOST_CREATED: SuccessArm = SuccessArm::nested("VirtualHostCreated", "virtualHost");
pub const TASK_EXECUTION: SuccessArm = SuccessArm::inline("TaskExecutionNode");

const CREATE_VM: &str = concat!(
    r"
mutation CreateVm($input: VirtualHostCreateInput!) {
  virtualHostCreate(input: $input) {
    __typename
    ... on VirtualHostCreated {
      virtualHost {
        id
        uuid
        hostname
        state
        cpuCount
        coresPerSocket
        memorySizeMB
        tier { id }
        domain { id }
        template { id }
        project { id }
        customer { id }
        region
      }
    }",
    failure_arms!(),
    r"
  }
}
"
);

const CREATE_VM_IMMUTABLE: &str = concat!(
    r"
mutation CreateVmImmutable($input: VirtualHostCreateImmutableInput!) {
  virtualHostCreateImmutable(input: $input) {
    __typename
    ... on VirtualHostCreated {
      virtualHost {
        id
        uuid
        hostname
        state
        cpuCount
        coresPerSocket
        memorySizeMB
        tier { id }
        template { id }
        project { id }
        customer { id }
        region
      }
    }",
    failure_arms!(),
    r"
  }
}
"
);

const GET_VM: &str = r"
query GetVm($id: GlobalID!) {
  virtualHost(id: $id) {
    id
    uuid
    hostname
    state
    cpuCount
    coresPerSocket
    memorySizeMB
    note
    dataProtectionPolicy { id note }
    networkInterfaceList {
      network { id }
      ipv4Addresses { ip prefixlen }
      ipv6Addresses { ip prefixlen }
      startConnected
    }
    tier { id }
    domain { id }
    template { id }
    project { id }
    customer { id }
    region
  }
}
";

const RESIZE_VM: &str = concat!(
    r"
mutation ResizeVm($input: VirtualHostResizeInput!) {
  virtualHostResize(input: $input) {
    __typename
    ... on TaskExecutionNode {
      id
    }",
    failure_arms!(),
    r"
  }
}
"
);

const UPDATE_VM_TIER: &str = concat!(
    r"
mutation UpdateVmTier($input: VirtualHostUpdateTierInput!) {
  virtualHostUpdateTier(input: $input) {
    __typename
    ... on TaskExecutionNode {
      id
    }",
    failure_arms!(),
    r"
  }
}
"
);

const DELETE_VM: &str = concat!(
    r"
mutation DeleteVm($input: VirtualHostDeleteInput!) {
  virtualHostDelete(input: $input) {
    __typename
    ... on TaskExecutionNode {
      id
    }",
    failure_arms!(),
    r"
  }
}
"
);

impl GraphQlClient {
    /// Provision a host from a template.
    ///
    /// `virtualHostCreate`, success arm `VirtualHostCreated { virtualHost }`.
    pub async fn create_virtual_host(
        &self,
        input: &VirtualHostCreateInput,
    ) -> Result<Outcome<VirtualHostNode>, Error> {
        debug!(hostname = %input.hostname, "creating virtual host");
        self.mutation("virtualHostCreate", CREATE_VM, input, VIRTUAL_HOST_CREATED)
            .await
    }

    /// Provision an immutable (ignition-configured) host.
    ///
    /// `virtualHostCreateImmutable`, same success arm as the standard create.
    pub async fn create_immutable_virtual_host(
        &self,
        input: &VirtualHostCreateImmutableInput,
    ) -> Result<Outcome<VirtualHostNode>, Error> {
        debug!(hostname = %input.hostname, "creating immutable virtual host");
        self.mutation(
            "virtualHostCreateImmutable",
            CREATE_VM_IMMUTABLE,
            input,
            VIRTUAL_HOST_CREATED,
        )
        .await
    }

    /// Fetch a host by id. `None` means the backend has no such object.
    pub async fn get_virtual_host(&self, id: &str) -> Result<Option<VirtualHostNode>, Error> {
        debug!(id, "reading virtual host");
        self.query(GET_VM, &IdVariables { id }, "virtualHost").await
    }

    /// Start a resize job. Success only means the job was accepted.
    pub async fn resize_virtual_host(
        &self,
        input: &VirtualHostResizeInput,
    ) -> Result<Outcome<TaskExecution>, Error> {
        debug!(id = %input.virtual_host, "resizing virtual host");
        self.mutation("virtualHostResize", RESIZE_VM, input, TASK_EXECUTION)
            .await
    }

    /// Start a tier migration job.
    pub async fn update_virtual_host_tier(
        &self,
        input: &VirtualHostUpdateTierInput,
    ) -> Result<Outcome<TaskExecution>, Error> {
        debug!(id = %input.virtual_host, tier = %input.tier, "changing virtual host tier");
        self.mutation("virtualHostUpdateTier", UPDATE_VM_TIER, input, TASK_EXECUTION)
            .await
    }

    /// Start a delete job.
    pub async fn delete_virtual_host(&self, id: &str) -> Result<Outcome<TaskExecution>, Error> {
        debug!(id, "deleting virtual host");
        let input = VirtualHostDeleteInput {
            virtual_host: id.to_owned(),
        };
        self.mutation("virtualHostDelete", DELETE_VM, &input, TASK_EXECUTION)
            .await
    }

    /// Run a mutation taking `{input}` and classify its payload.
    pub(crate) async fn mutation<I, T>(
        &self,
        field: &str,
        document: &str,
        input: &I,
        arm: SuccessArm,
    ) -> Result<Outcome<T>, Error>
    where
        I: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let payload: Payload = self
            .query(document, &InputVariables { input }, field)
            .await?;
        payload.classify(arm, field)
    }
}
