// ── Polymorphic mutation payloads ──
//
// Every OCP mutation answers with a union: one success arm plus the shared
// `ValidationErrors`, `Unauthorized` and `OperationUnavailable` failure arms.
// `Payload` is the undecoded union, `Outcome` the classified one.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;

pub const VALIDATION_ERRORS: &str = "ValidationErrors";
pub const UNAUTHORIZED: &str = "Unauthorized";
pub const OPERATION_UNAVAILABLE: &str = "OperationUnavailable";

/// Shown when a `ValidationErrors` arm carries neither a message nor field errors.
pub const VALIDATION_PLACEHOLDER: &str = "validation failed without message";

/// One `{field, messages}` entry of a `ValidationErrors` arm.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: String,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Which `__typename` means success for a given mutation, and where the
/// success object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessArm {
    pub typename: &'static str,
    /// `Some(field)` when the object is nested (`VirtualHostCreated { virtualHost }`),
    /// `None` when the arm itself is the object (`VirtualHostNode`, `TaskExecutionNode`).
    pub object: Option<&'static str>,
}

impl SuccessArm {
    pub const fn nested(typename: &'static str, field: &'static str) -> Self {
        Self {
            typename,
            object: Some(field),
        }
    }

    pub const fn inline(typename: &'static str) -> Self {
        Self {
            typename,
            object: None,
        }
    }
}

/// A mutation payload as it came off the wire: the discriminant plus every
/// other field of whichever arm was populated.
#[derive(Debug, Clone, Deserialize)]
pub struct Payload {
    #[serde(rename = "__typename")]
    pub typename: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Default, Deserialize)]
struct FailureDetails {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Vec<FieldError>>,
    #[serde(default)]
    reasons: Option<Vec<String>>,
}

/// Classified mutation outcome. Closed: anything the backend adds later
/// lands in `Unknown`, which is never treated as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    ValidationFailed {
        message: String,
        field_errors: Vec<FieldError>,
    },
    Unauthorized {
        message: String,
    },
    Unavailable {
        message: String,
        reasons: Vec<String>,
    },
    Unknown {
        typename: String,
    },
}

impl Payload {
    /// Map the payload onto exactly one [`Outcome`].
    ///
    /// A success discriminant whose nested object is absent or `null` is a
    /// protocol violation and is returned as an error, not as an outcome.
    pub fn classify<T: DeserializeOwned>(
        self,
        arm: SuccessArm,
        operation: &str,
    ) -> Result<Outcome<T>, Error> {
        let Self {
            typename,
            mut fields,
        } = self;
        debug!(operation, typename = %typename, "classifying payload");

        if typename == arm.typename {
            let object = match arm.object {
                Some(field) => match fields.remove(field) {
                    Some(Value::Null) | None => {
                        return Err(Error::ProtocolViolation {
                            operation: operation.to_owned(),
                            message: format!("backend returned {typename} without {field}"),
                        });
                    }
                    Some(value) => value,
                },
                None => Value::Object(fields),
            };
            return decode_object(object, operation).map(Outcome::Success);
        }

        let outcome = match typename.as_str() {
            VALIDATION_ERRORS => {
                let details = failure_details(fields);
                Outcome::ValidationFailed {
                    message: details.message.unwrap_or_default(),
                    field_errors: details.errors.unwrap_or_default(),
                }
            }
            UNAUTHORIZED => Outcome::Unauthorized {
                message: failure_details(fields).message.unwrap_or_default(),
            },
            OPERATION_UNAVAILABLE => {
                let details = failure_details(fields);
                Outcome::Unavailable {
                    message: details.message.unwrap_or_default(),
                    reasons: details.reasons.unwrap_or_default(),
                }
            }
            _ => Outcome::Unknown { typename },
        };
        Ok(outcome)
    }
}

impl<T> Outcome<T> {
    /// Convert to a `Result`, rendering the user-facing failure message.
    pub fn into_result(self, operation: &str) -> Result<T, Error> {
        let operation = operation.to_owned();
        match self {
            Self::Success(object) => Ok(object),
            Self::ValidationFailed {
                message,
                field_errors,
            } => Err(Error::ValidationFailed {
                operation,
                message: validation_message(&message, &field_errors),
            }),
            Self::Unauthorized { message } => Err(Error::Unauthorized {
                operation,
                message: refusal_message(UNAUTHORIZED, &message, &[]),
            }),
            Self::Unavailable { message, reasons } => Err(Error::Unavailable {
                operation,
                message: refusal_message(OPERATION_UNAVAILABLE, &message, &reasons),
                reasons,
            }),
            Self::Unknown { typename } => Err(Error::UnexpectedPayload {
                operation,
                typename,
            }),
        }
    }
}

fn failure_details(fields: Map<String, Value>) -> FailureDetails {
    // Failure arms are read leniently: a malformed detail must not hide the
    // failure itself.
    serde_json::from_value(Value::Object(fields)).unwrap_or_default()
}

fn decode_object<T: DeserializeOwned>(object: Value, operation: &str) -> Result<T, Error> {
    serde_json::from_value(object.clone()).map_err(|e| Error::Deserialization {
        message: format!("{operation}: {e}"),
        body: object.to_string(),
    })
}

/// Top-level message followed by every `field: [messages]` pair.
pub fn validation_message(message: &str, field_errors: &[FieldError]) -> String {
    let details = field_errors
        .iter()
        .map(|e| format!("{}: [{}]", e.field, e.messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");
    let message = message.trim();

    match (message.is_empty(), details.is_empty()) {
        (true, true) => VALIDATION_PLACEHOLDER.to_owned(),
        (false, true) => message.to_owned(),
        (true, false) => details,
        (false, false) => format!("{message} ({details})"),
    }
}

/// Message with parenthesized reason codes; falls back to the discriminant.
fn refusal_message(typename: &str, message: &str, reasons: &[String]) -> String {
    let message = message.trim();
    match (message.is_empty(), reasons.is_empty()) {
        (true, true) => typename.to_owned(),
        (false, true) => message.to_owned(),
        (true, false) => format!("{typename} (reasons={})", reasons.join(", ")),
        (false, false) => format!("{message} (reasons={})", reasons.join(", ")),
    }
}
