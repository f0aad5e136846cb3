//! Lookup command handlers.

use serde::Serialize;

use ocp_api::GraphQlClient;

use crate::cli::{LookupArgs, LookupCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct Resolved {
    kind: &'static str,
    id: String,
}

pub async fn handle(
    client: &GraphQlClient,
    args: LookupArgs,
    format: OutputFormat,
) -> Result<(), CliError> {
    let kind = args.command.kind();
    let id = match args.command {
        LookupCommand::Customer { name } => client.find_customer(&name).await?,
        LookupCommand::Project { name, customer } => client.find_project(&name, &customer).await?,
        LookupCommand::Domain { name, customer } => client.find_domain(&name, &customer).await?,
        LookupCommand::Network { name, customer } => client.find_network(&name, &customer).await?,
        LookupCommand::Tier {
            name,
            solution_type,
        } => client.find_tier(&name, solution_type.as_deref()).await?,
        LookupCommand::Template {
            name,
            customer,
            region,
            solution_type,
        } => {
            client
                .find_template(&name, &customer, &region, solution_type.as_deref())
                .await?
        }
        LookupCommand::Vcenter { name, customer } => client.find_vcenter(&name, &customer).await?,
        LookupCommand::DataProtectionPolicy {
            note,
            customer,
            project,
            solution_type,
        } => {
            client
                .find_data_protection_policy(&note, &customer, &project, solution_type.as_deref())
                .await?
        }
    };

    let rendered = output::render(format, &Resolved { kind, id }, |r| r.id.clone())?;
    output::print_output(&rendered)
}
