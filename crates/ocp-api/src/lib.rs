//! Async Rust client for the OCP portal GraphQL API.
//!
//! - **[`GraphQlClient`]** — Typed request executor: `{query, variables}` in,
//!   `{data, errors}` out, with the first remote error surfaced as
//!   [`Error::Remote`]. Endpoint methods live in [`hosts`], [`shadow`] and
//!   [`lookup`].
//!
//! - **[`Outcome`]** — Closed classification of the polymorphic mutation
//!   payloads (`__typename` plus arm fields). Unknown discriminants are
//!   never success.
//!
//! - **[`TransportConfig`]** — TLS mode and timeout for the underlying
//!   `reqwest::Client`.

pub mod client;
pub mod error;
pub mod hosts;
pub mod lookup;
pub mod outcome;
pub mod shadow;
pub mod transport;
pub mod types;

pub use client::{AUTH_HEADER, GraphQlClient};
pub use error::Error;
pub use outcome::{FieldError, Outcome, Payload, SuccessArm};
pub use transport::{TlsMode, TransportConfig};
