//! Resolver capability tables and the values they return.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::context::Context;
use crate::error::BoxError;
use crate::json_ext::Object;
use crate::spec::SelectedField;

/// Shared handle on a resolver value.
pub type ResolverHandle = Arc<dyn Resolver>;

/// A value exposing callable methods, addressed by the index recorded in the schema
/// ([`FieldDefinition::method_index`](crate::spec::FieldDefinition::method_index)).
///
/// Each concrete GraphQL object type provides one implementation, typically a `match` over the
/// method index. Interfaces and unions additionally answer narrowing predicates.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Invokes the method at `method`.
    ///
    /// An error is reported on the field's path and the field completes as null.
    async fn call(&self, method: usize, call: FieldCall<'_>) -> Result<ResolvedValue, BoxError>;

    /// Narrowing predicate at `method`: returns the concrete variant when this value is one.
    fn narrow(&self, method: usize) -> Option<ResolverHandle> {
        let _ = method;
        None
    }
}

/// What a resolver method asked for, as recorded in its field definition.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct FieldCall<'a> {
    /// Set when the field definition has `has_context`.
    pub context: Option<&'a Context>,
    /// Packed arguments of the field, if it has any.
    pub arguments: Option<&'a Object>,
    /// Set when the field definition has `has_selected`.
    pub selected: Option<Vec<SelectedField>>,
}

impl FieldCall<'_> {
    /// Deserializes the packed arguments into `T`.
    pub fn arguments<T: serde::de::DeserializeOwned>(&self) -> Result<T, BoxError> {
        let arguments = self.arguments.cloned().unwrap_or_default();
        Ok(serde_json_bytes::from_value(serde_json_bytes::Value::Object(
            arguments,
        ))?)
    }
}

/// A leaf value with a structural JSON encoding.
pub trait ScalarValue: fmt::Debug + Send + Sync {
    fn write_json(&self, out: &mut Vec<u8>) -> Result<(), serde_json::Error>;
}

impl<T> ScalarValue for T
where
    T: Serialize + fmt::Debug + Send + Sync + ?Sized,
{
    fn write_json(&self, out: &mut Vec<u8>) -> Result<(), serde_json::Error> {
        serde_json::to_writer(out, self)
    }
}

/// The runtime value returned by a resolver method.
#[derive(Clone, Default)]
pub enum ResolvedValue {
    /// Absent value.
    #[default]
    Null,
    Scalar(Arc<dyn ScalarValue>),
    /// Canonical name of an enum value.
    Enum(String),
    Object(ResolverHandle),
    List(Vec<ResolvedValue>),
}

impl ResolvedValue {
    pub fn scalar<T>(value: T) -> Self
    where
        T: Serialize + fmt::Debug + Send + Sync + 'static,
    {
        ResolvedValue::Scalar(Arc::new(value))
    }

    pub fn enum_value(name: impl Into<String>) -> Self {
        ResolvedValue::Enum(name.into())
    }

    pub fn object<R: Resolver + 'static>(resolver: R) -> Self {
        ResolvedValue::Object(Arc::new(resolver))
    }

    pub fn list(values: impl IntoIterator<Item = ResolvedValue>) -> Self {
        ResolvedValue::List(values.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ResolvedValue::Null)
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            ResolvedValue::Null => "null",
            ResolvedValue::Scalar(_) => "a scalar",
            ResolvedValue::Enum(_) => "an enum value",
            ResolvedValue::Object(_) => "an object",
            ResolvedValue::List(_) => "a list",
        }
    }
}

impl<T: Into<ResolvedValue>> From<Option<T>> for ResolvedValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<ResolverHandle> for ResolvedValue {
    fn from(resolver: ResolverHandle) -> Self {
        ResolvedValue::Object(resolver)
    }
}

impl fmt::Debug for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Null => f.write_str("Null"),
            ResolvedValue::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            ResolvedValue::Enum(name) => f.debug_tuple("Enum").field(name).finish(),
            ResolvedValue::Object(_) => f.write_str("Object(..)"),
            ResolvedValue::List(values) => f.debug_tuple("List").field(values).finish(),
        }
    }
}
