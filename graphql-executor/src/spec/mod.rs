//! Executable view of a schema and an operation.
//!
//! Everything here is produced upstream (parsing, validation, selection building) and only read
//! by execution.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

mod field_type;
mod operation;
mod schema;
mod selection;

pub use field_type::FieldType;
pub use operation::Operation;
pub use operation::OperationKind;
pub use schema::Schema;
pub use selection::FieldDefinition;
pub use selection::SchemaField;
pub use selection::SelectedField;
pub use selection::Selection;
pub use selection::TypeAssertion;
pub use selection::TypeCondition;
pub use selection::TypenameField;

pub const TYPENAME: &str = "__typename";
