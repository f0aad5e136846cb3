// GraphQL request executor
//
// Wraps `reqwest::Client` with the `{query, variables}` request envelope and
// `{data, errors}` response envelope. Endpoint modules (hosts, shadow hosts,
// lookups) are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Header carrying the API token on every request.
pub const AUTH_HEADER: &str = "X-Auth-Token";

#[derive(Serialize)]
struct Request<'a, V: Serialize> {
    query: &'a str,
    variables: &'a V,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<RemoteError>>,
}

#[derive(Deserialize)]
struct RemoteError {
    #[serde(default)]
    message: String,
}

impl Envelope {
    /// Only the first reported error is surfaced; the rest are dropped.
    fn first_error(&self) -> Option<Error> {
        self.errors
            .as_deref()
            .and_then(<[RemoteError]>::first)
            .map(|e| Error::Remote {
                message: e.message.clone(),
            })
    }
}

/// Async executor for the OCP GraphQL endpoint.
///
/// Holds no per-call state, so one instance can be shared (behind an `Arc`)
/// by every reconciler in a run. Requests are never retried.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GraphQlClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an endpoint, API token, and transport config.
    ///
    /// Injects `X-Auth-Token` as a sensitive default header on every request.
    pub fn new(
        endpoint: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value =
            HeaderValue::from_str(token.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        value.set_sensitive(true);
        headers.insert(AUTH_HEADER, value);

        let http = transport.build_client(headers)?;
        let endpoint = Url::parse(endpoint)?;

        Ok(Self { http, endpoint })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(endpoint: &str, http: reqwest::Client) -> Result<Self, Error> {
        let endpoint = Url::parse(endpoint)?;
        Ok(Self { http, endpoint })
    }

    /// The GraphQL endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Send a document with variables and return the raw `data` member.
    ///
    /// A non-empty `errors` array wins over `data`: the first message is
    /// returned as [`Error::Remote`].
    pub async fn execute<V: Serialize + Sync>(
        &self,
        document: &str,
        variables: &V,
    ) -> Result<Option<Value>, Error> {
        let operation = operation_name(document);
        debug!(operation, "POST {}", self.endpoint);

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&Request {
                query: document,
                variables,
            })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        trace!(operation, %status, bytes = body.len(), "response received");

        let parsed = serde_json::from_str::<Envelope>(&body);

        if !status.is_success() {
            if let Some(err) = parsed.as_ref().ok().and_then(Envelope::first_error) {
                return Err(err);
            }
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(Error::Authentication {
                    message: format!("token rejected (HTTP {})", status.as_u16()),
                });
            }
            return Err(Error::Http {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    preview(&body).to_owned()
                },
            });
        }

        let envelope = parsed.map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

        if let Some(err) = envelope.first_error() {
            return Err(err);
        }

        Ok(envelope.data)
    }

    /// Execute and decode the named top-level `data` field into `T`.
    ///
    /// A missing or `null` field decodes as JSON `null`, so `Option<T>`
    /// destinations see `None`.
    pub async fn query<T, V>(&self, document: &str, variables: &V, field: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
        V: Serialize + Sync,
    {
        let data = self.execute(document, variables).await?;
        decode_field(data, field)
    }

    /// Execute a mutation whose result is not needed beyond the absence of
    /// errors.
    pub async fn mutate<V: Serialize + Sync>(
        &self,
        document: &str,
        variables: &V,
    ) -> Result<(), Error> {
        self.execute(document, variables).await.map(|_| ())
    }
}

/// Pull `field` out of the `data` object and decode it.
pub(crate) fn decode_field<T: DeserializeOwned>(
    data: Option<Value>,
    field: &str,
) -> Result<T, Error> {
    let value = match data {
        Some(Value::Object(mut map)) => map.remove(field).unwrap_or(Value::Null),
        _ => Value::Null,
    };

    serde_json::from_value(value.clone()).map_err(|e| {
        let body = value.to_string();
        Error::Deserialization {
            message: format!("{field}: {e} (body preview: {:?})", preview(&body)),
            body,
        }
    })
}

/// The operation name of a document (`mutation CreateVm(...)` → `CreateVm`),
/// used for logging only.
pub(crate) fn operation_name(document: &str) -> &str {
    let mut tokens = document
        .split(|c: char| c.is_whitespace() || c == '(' || c == '{')
        .filter(|t| !t.is_empty());

    match (tokens.next(), tokens.next()) {
        (Some("query" | "mutation"), Some(name)) => name,
        _ => "anonymous",
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
