//! Execution errors.
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use displaydoc::Display;
use thiserror::Error;

pub use crate::configuration::ConfigurationError;
pub use crate::graphql::Error;
use crate::json_ext::Path;

/// Error type returned by resolver methods.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Message handed to clients for every failure that is not the resolver's own error.
pub(crate) const INTERNAL_SERVER_ERROR: &str = "internal server error";

/// Why an execution context stopped accepting work.
#[derive(Error, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancelled {
    /// context canceled
    Canceled,
    /// context deadline exceeded
    DeadlineExceeded,
}

/// Diagnostic value captured from a panic.
///
/// Only ever logged or inspected in-process, it is never serialized into a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanicPayload(String);

impl PanicPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<Box<dyn Any + Send>> for PanicPayload {
    fn from(payload: Box<dyn Any + Send>) -> Self {
        if let Some(message) = payload.downcast_ref::<&'static str>() {
            Self((*message).to_owned())
        } else if let Some(message) = payload.downcast_ref::<String>() {
            Self(message.clone())
        } else {
            Self("Box<dyn Any>".to_owned())
        }
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error types for execution.
///
/// Note that these are not returned to the client as is, but are instead converted to
/// [`struct@Error`] with [`ExecutionError::to_graphql_error`].
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub(crate) enum ExecutionError {
    /// {0}
    Resolver(BoxError),

    /// panic: {0}
    Panic(PanicPayload),

    /// got null for non-null {type_name}
    NullValue { type_name: String },

    /// could not encode value of {type_name}: {reason}
    Encoding { type_name: String, reason: String },

    /// expected a value of {expected} but the resolver returned {actual}
    UnexpectedValue {
        expected: String,
        actual: &'static str,
    },

    /// {0}
    Cancelled(Cancelled),
}

impl ExecutionError {
    /// Convert the execution error to a GraphQL error located at `path`.
    pub(crate) fn to_graphql_error(self, path: Option<Path>) -> Error {
        match self {
            ExecutionError::Resolver(source) => {
                let error = match source.downcast::<Error>() {
                    // resolvers may return a complete GraphQL error
                    Ok(error) => *error,
                    Err(source) => Error::from_source(source),
                };
                error.with_path(path)
            }
            ExecutionError::Cancelled(cause) => Error::new(cause.to_string())
                .with_source(Arc::new(cause))
                .with_path(path),
            ExecutionError::Panic(payload) => Error::internal(payload).with_path(path),
            violation @ (ExecutionError::NullValue { .. }
            | ExecutionError::Encoding { .. }
            | ExecutionError::UnexpectedValue { .. }) => {
                Error::internal(PanicPayload::new(violation.to_string())).with_path(path)
            }
        }
    }
}
