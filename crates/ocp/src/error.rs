//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use ocp_config::ConfigError;
use ocp_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to OCP at {url}")]
    #[diagnostic(
        code(ocp::connection_failed),
        help(
            "{reason}\n\
             Check the endpoint, or use --insecure (-k) for an untrusted certificate."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to OCP timed out")]
    #[diagnostic(
        code(ocp::timeout),
        help("Increase the timeout with --timeout or check portal responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ocp::auth_failed),
        help("Verify the API token in your profile or the OCP_TOKEN environment variable.")
    )]
    AuthFailed { message: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(ocp::no_token),
        help("Either set the profile token or the OCP_TOKEN environment variable.")
    )]
    NoToken { profile: String },

    // ── Backend answers ──────────────────────────────────────────────
    #[error("{operation} was rejected: {message}")]
    #[diagnostic(code(ocp::validation_failed))]
    Rejected { operation: String, message: String },

    #[error("{operation} is not permitted: {message}")]
    #[diagnostic(
        code(ocp::unauthorized),
        help("The token's user lacks permission on this customer or project.")
    )]
    Unauthorized { operation: String, message: String },

    #[error("{operation} is unavailable: {message}")]
    #[diagnostic(
        code(ocp::unavailable),
        help("The host is busy or in a state that forbids this operation. Retry later.")
    )]
    Unavailable { operation: String, message: String },

    #[error("OCP reported an error: {message}")]
    #[diagnostic(code(ocp::remote))]
    Remote { message: String },

    #[error("Unexpected response from OCP: {message}")]
    #[diagnostic(
        code(ocp::protocol),
        help("The portal answered outside its documented schema. Check for an API upgrade.")
    )]
    Protocol { message: String },

    #[error("{message}")]
    #[diagnostic(code(ocp::lookup))]
    Lookup { message: String },

    #[error("{resource} '{id}' not found")]
    #[diagnostic(code(ocp::not_found))]
    NotFound { resource: String, id: String },

    // ── Local rejections ─────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(ocp::constraint),
        help("Fix the declared state; no request was sent.")
    )]
    Constraint { message: String },

    #[error("{message}")]
    #[diagnostic(code(ocp::replacement_required))]
    ReplacementRequired { message: String },

    // ── Files ────────────────────────────────────────────────────────
    #[error("Cannot read declared state from {path}: {reason}")]
    #[diagnostic(code(ocp::desired_state))]
    Desired { path: String, reason: String },

    #[error("No state file at {path}")]
    #[diagnostic(
        code(ocp::no_state),
        help("Run `ocp host apply` or `ocp host import` first.")
    )]
    NoState { path: String },

    #[error("State file {path} already tracks host {id}")]
    #[diagnostic(
        code(ocp::state_conflict),
        help("Destroy the tracked host or choose another --state path.")
    )]
    StateConflict { path: String, id: String },

    #[error("State file {path} holds a {found} host, not {expected}")]
    #[diagnostic(code(ocp::state_kind), help("Pass the matching --kind."))]
    StateKindMismatch {
        path: String,
        expected: String,
        found: String,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ocp::validation))]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found")]
    #[diagnostic(code(ocp::profile_not_found), help("Expected in: {path}"))]
    ProfileNotFound { name: String, path: String },

    #[error(transparent)]
    #[diagnostic(code(ocp::config))]
    Config(ConfigError),

    #[error("Internal error: {0}")]
    #[diagnostic(code(ocp::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(ocp::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(ocp::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoToken { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::Lookup { .. } | Self::NoState { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Unauthorized { .. } => exit_code::PERMISSION,
            Self::Unavailable { .. }
            | Self::StateConflict { .. }
            | Self::ReplacementRequired { .. } => exit_code::CONFLICT,
            Self::Constraint { .. }
            | Self::Desired { .. }
            | Self::StateKindMismatch { .. }
            | Self::Validation { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoToken { profile } => CliError::NoToken { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name, path } => CliError::ProfileNotFound {
                name,
                path: path.display().to_string(),
            },
            other @ ConfigError::Figment(_) => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Remote { message } => CliError::Remote { message },
            CoreError::ValidationFailed { operation, message } => {
                CliError::Rejected { operation, message }
            }
            CoreError::Unauthorized { operation, message } => {
                CliError::Unauthorized { operation, message }
            }
            CoreError::Unavailable {
                operation,
                message,
                reasons: _,
            } => CliError::Unavailable { operation, message },
            CoreError::ProtocolViolation { message } => CliError::Protocol { message },
            CoreError::LookupFailed { message } => CliError::Lookup { message },
            CoreError::NotFound { resource, id } => CliError::NotFound {
                resource: resource.into(),
                id,
            },
            err @ (CoreError::ConstraintRejected { .. } | CoreError::InvalidDesiredState { .. }) => {
                CliError::Constraint {
                    message: err.to_string(),
                }
            }
            err @ CoreError::ReplacementRequired { .. } => CliError::ReplacementRequired {
                message: err.to_string(),
            },
            CoreError::Config { message } => CliError::Validation {
                field: "endpoint".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ocp_api::Error> for CliError {
    fn from(err: ocp_api::Error) -> Self {
        CoreError::from(err).into()
    }
}
