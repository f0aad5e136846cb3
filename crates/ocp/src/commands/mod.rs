//! Command dispatch: bridges CLI args -> reconcilers / lookups -> output.

pub mod host;
pub mod lookup;

use std::sync::Arc;

use ocp_api::GraphQlClient;

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Dispatch a portal-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: Arc<GraphQlClient>,
    format: OutputFormat,
) -> Result<(), CliError> {
    match cmd {
        Command::Host(args) => host::handle(client, args, format).await,
        Command::Lookup(args) => lookup::handle(&client, args, format).await,
    }
}
