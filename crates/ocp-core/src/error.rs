// ── Core error types ──
//
// User-facing errors from ocp-core. Consumers never see HTTP status codes
// or raw payload typenames directly: the `From<ocp_api::Error>` impl
// translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to OCP at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request to OCP timed out")]
    Timeout,

    // ── Backend answers ──────────────────────────────────────────────
    /// First entry of the GraphQL `errors` array.
    #[error("OCP reported an error: {message}")]
    Remote { message: String },

    #[error("{operation}: {message}")]
    ValidationFailed { operation: String, message: String },

    #[error("{operation}: {message}")]
    Unauthorized { operation: String, message: String },

    #[error("{operation}: {message}")]
    Unavailable {
        operation: String,
        message: String,
        reasons: Vec<String>,
    },

    /// The backend answered outside its documented contract.
    #[error("Protocol violation: {message}")]
    ProtocolViolation { message: String },

    #[error("Lookup failed: {message}")]
    LookupFailed { message: String },

    #[error("{resource} {id} does not exist")]
    NotFound { resource: &'static str, id: String },

    // ── Local rejections (no request was sent) ───────────────────────
    #[error("{resource}: {message}")]
    ConstraintRejected {
        resource: &'static str,
        message: String,
    },

    #[error("{resource}: changing {} requires replacing the host", .fields.join(", "))]
    ReplacementRequired {
        resource: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("Invalid desired state: {message}")]
    InvalidDesiredState { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` for failures raised before any request was sent.
    pub fn is_local_rejection(&self) -> bool {
        matches!(
            self,
            Self::ConstraintRejected { .. }
                | Self::ReplacementRequired { .. }
                | Self::InvalidDesiredState { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ocp_api::Error> for CoreError {
    fn from(err: ocp_api::Error) -> Self {
        match err {
            ocp_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            ocp_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ocp_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ocp_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            ocp_api::Error::Http { status, message } => CoreError::Remote {
                message: format!("HTTP {status}: {message}"),
            },
            ocp_api::Error::Remote { message } => CoreError::Remote { message },
            ocp_api::Error::Deserialization { message, body: _ } => CoreError::ProtocolViolation {
                message: format!("Deserialization error: {message}"),
            },
            ocp_api::Error::ValidationFailed { operation, message } => {
                CoreError::ValidationFailed { operation, message }
            }
            ocp_api::Error::Unauthorized { operation, message } => {
                CoreError::Unauthorized { operation, message }
            }
            ocp_api::Error::Unavailable {
                operation,
                message,
                reasons,
            } => CoreError::Unavailable {
                operation,
                message,
                reasons,
            },
            err @ (ocp_api::Error::ProtocolViolation { .. }
            | ocp_api::Error::UnexpectedPayload { .. }) => CoreError::ProtocolViolation {
                message: err.to_string(),
            },
            err @ (ocp_api::Error::LookupNotFound { .. }
            | ocp_api::Error::LookupAmbiguous { .. }) => CoreError::LookupFailed {
                message: err.to_string(),
            },
        }
    }
}
