use thiserror::Error;

/// Top-level error type for the `ocp-api` crate.
///
/// Covers every failure mode of talking to the GraphQL endpoint: transport,
/// the response envelope, and the polymorphic mutation payloads.
/// `ocp-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The token could not be used as a header value.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Non-success HTTP status without a GraphQL error list.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Envelope ────────────────────────────────────────────────────
    /// First entry of the `errors` array of the response envelope.
    #[error("graphql error: {message}")]
    Remote { message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Mutation payloads ───────────────────────────────────────────
    /// `ValidationErrors` arm of a mutation payload.
    #[error("{operation}: {message}")]
    ValidationFailed { operation: String, message: String },

    /// `Unauthorized` arm of a mutation payload.
    #[error("{operation}: {message}")]
    Unauthorized { operation: String, message: String },

    /// `OperationUnavailable` arm of a mutation payload.
    #[error("{operation}: {message}")]
    Unavailable {
        operation: String,
        message: String,
        reasons: Vec<String>,
    },

    /// The success arm arrived without the object it must carry.
    #[error("{operation}: {message}")]
    ProtocolViolation { operation: String, message: String },

    /// A `__typename` outside the documented set.
    #[error("{operation}: unexpected payload type {typename:?}")]
    UnexpectedPayload { operation: String, typename: String },

    // ── Lookups ─────────────────────────────────────────────────────
    #[error("no {kind} found {criteria}")]
    LookupNotFound { kind: &'static str, criteria: String },

    #[error("{count} {kind} records found {criteria}, refine the filters")]
    LookupAmbiguous {
        kind: &'static str,
        criteria: String,
        count: usize,
    },
}

impl Error {
    /// Returns `true` if the error came from the network layer rather than
    /// from the backend's answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Tls(_) | Self::InvalidUrl(_))
    }

    /// Returns `true` if the backend answered but the answer did not match
    /// the documented contract.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::ProtocolViolation { .. } | Self::UnexpectedPayload { .. }
        )
    }

    /// The mutation name the error belongs to, for payload errors.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { operation, .. }
            | Self::Unauthorized { operation, .. }
            | Self::Unavailable { operation, .. }
            | Self::ProtocolViolation { operation, .. }
            | Self::UnexpectedPayload { operation, .. } => Some(operation),
            _ => None,
        }
    }
}
