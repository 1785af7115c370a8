use serde::Deserialize;
use serde::Serialize;

/// The static type of a field, as built by the schema.
///
/// Drives how a resolved value is serialized. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Object type {0}
    Object(String),
    /// Interface type {0}
    Interface(String),
    /// Union type {0}
    Union(String),
    /// List type {0}
    List(Box<FieldType>),
    /// Non null type {0}
    NonNull(Box<FieldType>),
    /// Scalar type {0}
    Scalar(String),
    /// Enum type {0}
    Enum(String),
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Object(ty)
            | FieldType::Interface(ty)
            | FieldType::Union(ty)
            | FieldType::Scalar(ty)
            | FieldType::Enum(ty) => write!(f, "{ty}"),
            FieldType::List(ty) => write!(f, "[{ty}]"),
            FieldType::NonNull(ty) => write!(f, "{ty}!"),
        }
    }
}

impl FieldType {
    pub fn object(name: impl Into<String>) -> Self {
        FieldType::Object(name.into())
    }

    pub fn interface(name: impl Into<String>) -> Self {
        FieldType::Interface(name.into())
    }

    pub fn union(name: impl Into<String>) -> Self {
        FieldType::Union(name.into())
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        FieldType::Scalar(name.into())
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        FieldType::Enum(name.into())
    }

    pub fn list(of: FieldType) -> Self {
        FieldType::List(Box::new(of))
    }

    /// Wraps the type in a non-null marker. Wrapping twice is a no-op.
    pub fn non_null(self) -> Self {
        match self {
            FieldType::NonNull(_) => self,
            ty => FieldType::NonNull(Box::new(ty)),
        }
    }

    /// Splits off the non-null marker, returning the bare type and whether it was present.
    pub(crate) fn unwrap_non_null(&self) -> (&FieldType, bool) {
        match self {
            FieldType::NonNull(inner) => (inner, true),
            ty => (ty, false),
        }
    }

    /// return the name of the type on which selections happen
    ///
    /// Example if we get the field `list: [User!]!`, it will return "User"
    pub fn inner_type_name(&self) -> &str {
        match self {
            FieldType::Object(name)
            | FieldType::Interface(name)
            | FieldType::Union(name)
            | FieldType::Scalar(name)
            | FieldType::Enum(name) => name.as_str(),
            FieldType::List(inner) | FieldType::NonNull(inner) => inner.inner_type_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, FieldType::NonNull(_))
    }

    /// Object, interface and union types are completed by executing a selection set.
    pub(crate) fn is_composite(&self) -> bool {
        matches!(
            self,
            FieldType::Object(_) | FieldType::Interface(_) | FieldType::Union(_)
        )
    }
}
