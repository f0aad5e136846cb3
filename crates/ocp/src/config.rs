//! CLI configuration: a thin layer over `ocp_config` that applies the
//! `GlobalOpts` flag overrides (--endpoint, --token, --insecure, --timeout).

use std::sync::Arc;

use ocp_api::GraphQlClient;
use ocp_config::{Config, ConnectionSettings, Profile};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Apply flag overrides on top of a profile. Flags win over the file.
fn with_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref endpoint) = global.endpoint {
        profile.endpoint = Some(endpoint.clone());
    }
    if let Some(ref token) = global.token {
        profile.token = Some(token.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile
}

/// Resolve connection settings from the config file, profile and flags.
pub fn resolve_connection(
    global: &GlobalOpts,
    config: &Config,
) -> Result<ConnectionSettings, CliError> {
    let (name, profile) = config.profile(global.profile.as_deref())?;
    let profile = with_overrides(profile, global);
    tracing::debug!(profile = %name, "resolved profile");
    Ok(ocp_config::profile_to_connection(
        &profile,
        &name,
        &config.defaults,
    )?)
}

/// Build the shared GraphQL client for one run.
pub fn build_client(global: &GlobalOpts, config: &Config) -> Result<Arc<GraphQlClient>, CliError> {
    let conn = resolve_connection(global, config)?;
    let client = GraphQlClient::new(conn.endpoint.as_str(), &conn.token, &conn.transport)?;
    Ok(Arc::new(client))
}

/// Output format: flag, then `defaults.output`, then JSON.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    use clap::ValueEnum;

    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Json)
    })
}
