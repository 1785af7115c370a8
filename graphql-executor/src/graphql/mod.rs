//! Types related to GraphQL responses and errors.

mod response;

use std::fmt;
use std::sync::Arc;

use derivative::Derivative;
pub use response::Response;
use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::Value;

use crate::error::BoxError;
use crate::error::INTERNAL_SERVER_ERROR;
use crate::error::PanicPayload;
use crate::json_ext::Object;
use crate::json_ext::Path;

/// A [GraphQL error](https://spec.graphql.org/October2021/#sec-Errors)
/// as may be found in the `errors` field of a GraphQL [`Response`].
///
/// The original cause and the panic payload stay in-process: they are skipped by serde and
/// ignored by equality.
#[derive(Clone, Derivative, Serialize, Deserialize)]
#[derivative(Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
#[non_exhaustive]
pub struct Error {
    /// The error message.
    pub message: String,

    /// If this is a field error, the JSON path to that field in [`Response::data`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,

    /// The optional GraphQL extensions for this error.
    #[serde(skip_serializing_if = "Object::is_empty")]
    pub extensions: Object,

    #[serde(skip)]
    #[derivative(PartialEq = "ignore")]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,

    #[serde(skip)]
    #[derivative(PartialEq = "ignore")]
    panic_payload: Option<PanicPayload>,
}

impl Default for Error {
    fn default() -> Self {
        Self {
            message: String::new(),
            path: None,
            extensions: Object::new(),
            source: None,
            panic_payload: None,
        }
    }
}

impl Error {
    /// Creates an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Wraps an original cause, using its display as the message.
    pub(crate) fn from_source(source: BoxError) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Arc::from(source)),
            ..Default::default()
        }
    }

    /// The generic error reported for panics and broken type invariants.
    pub(crate) fn internal(payload: PanicPayload) -> Self {
        Self {
            message: INTERNAL_SERVER_ERROR.to_owned(),
            panic_payload: Some(payload),
            ..Default::default()
        }
    }

    pub(crate) fn with_path(mut self, path: Option<Path>) -> Self {
        self.path = path;
        self
    }

    pub(crate) fn with_source(mut self, source: Arc<dyn std::error::Error + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the "code" in the extension map. Ignored if the extension already has this key set.
    pub fn with_extension_code(mut self, code: impl Into<String>) -> Self {
        let code: String = code.into();
        self.extensions
            .entry("code")
            .or_insert(Value::String(code.into()));
        self
    }

    /// Extract the error code from [`Error::extensions`] as a String if it is set.
    pub fn extension_code(&self) -> Option<String> {
        self.extensions.get("code").and_then(|c| match c {
            Value::String(s) => Some(s.as_str().to_owned()),
            Value::Number(n) => Some(n.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Bool(_) => None,
        })
    }

    /// The value a panic carried, when this error was produced by one.
    pub fn panic_payload(&self) -> Option<&PanicPayload> {
        self.panic_payload.as_ref()
    }
}

/// Displays (only) the error message.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}
