use std::fmt;
use std::sync::Arc;
use std::sync::LazyLock;

use serde::Deserialize;
use serde::Serialize;

use crate::json_ext::Object;
use crate::resolver::ResolvedValue;
use crate::spec::FieldType;
use crate::spec::TYPENAME;

/// Static metadata of a schema field: where its resolver method lives and how to call it.
///
/// Built once with the schema and shared by every selection of that field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Field name in the schema.
    pub name: String,
    /// Name of the type declaring the field.
    pub type_name: String,
    pub field_type: FieldType,
    /// Index of the resolver method in the declaring type's capability table.
    pub method_index: usize,
    /// The method takes the request [`Context`](crate::Context).
    pub has_context: bool,
    /// The method takes a descriptor of the sub-fields requested below it.
    pub has_selected: bool,
    /// The method may suspend, so sibling fields are worth running concurrently.
    pub is_async: bool,
    pub trace_label: String,
}

impl FieldDefinition {
    pub fn new(
        type_name: impl Into<String>,
        name: impl Into<String>,
        field_type: FieldType,
        method_index: usize,
    ) -> Self {
        let type_name = type_name.into();
        let name = name.into();
        Self {
            trace_label: format!("GraphQL field: {type_name}.{name}"),
            name,
            type_name,
            field_type,
            method_index,
            has_context: false,
            has_selected: false,
            is_async: false,
        }
    }

    pub fn with_context(mut self) -> Self {
        self.has_context = true;
        self
    }

    pub fn with_selected(mut self) -> Self {
        self.has_selected = true;
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }
}

static TYPENAME_FIELD: LazyLock<Arc<FieldDefinition>> = LazyLock::new(|| {
    Arc::new(FieldDefinition::new(
        "",
        TYPENAME,
        FieldType::scalar("String").non_null(),
        0,
    ))
});

/// One node of the selection tree handed to execution.
#[derive(Debug, Clone)]
pub enum Selection {
    Field(SchemaField),
    Typename(TypenameField),
    TypeAssertion(TypeAssertion),
}

/// A selected schema field.
#[derive(Debug, Clone)]
pub struct SchemaField {
    pub field: Arc<FieldDefinition>,
    /// Output key of the field.
    pub alias: String,
    /// Arguments, already coerced and packed for the resolver method.
    pub arguments: Option<Object>,
    pub selections: Vec<Selection>,
    /// When set, the resolver is not called and this value is serialized instead.
    pub fixed_result: Option<ResolvedValue>,
}

impl SchemaField {
    pub fn new(field: Arc<FieldDefinition>) -> Self {
        Self {
            alias: field.name.clone(),
            field,
            arguments: None,
            selections: Vec::new(),
            fixed_result: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn arguments(mut self, arguments: Object) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn selections(mut self, selections: Vec<Selection>) -> Self {
        self.selections = selections;
        self
    }

    pub(crate) fn typename(alias: &str, type_name: String) -> Self {
        Self {
            field: TYPENAME_FIELD.clone(),
            alias: alias.to_owned(),
            arguments: None,
            selections: Vec::new(),
            fixed_result: Some(ResolvedValue::scalar(type_name)),
        }
    }
}

impl From<SchemaField> for Selection {
    fn from(field: SchemaField) -> Self {
        Selection::Field(field)
    }
}

/// A `__typename` selection.
#[derive(Debug, Clone)]
pub struct TypenameField {
    pub alias: String,
    /// Static type name, used as is when there are no type conditions.
    pub type_name: String,
    /// Possible concrete types of an interface or union, in declaration order.
    pub type_conditions: Vec<TypeCondition>,
}

impl TypenameField {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            alias: TYPENAME.to_owned(),
            type_name: type_name.into(),
            type_conditions: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn type_condition(mut self, type_name: impl Into<String>, method_index: usize) -> Self {
        self.type_conditions.push(TypeCondition {
            type_name: type_name.into(),
            method_index,
        });
        self
    }
}

impl From<TypenameField> for Selection {
    fn from(field: TypenameField) -> Self {
        Selection::Typename(field)
    }
}

/// A concrete type an abstract value may narrow to, and the predicate method testing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCondition {
    pub type_name: String,
    pub method_index: usize,
}

/// Selections that only apply when the current value narrows to a concrete type.
#[derive(Debug, Clone)]
pub struct TypeAssertion {
    pub type_name: String,
    pub method_index: usize,
    pub selections: Vec<Selection>,
}

impl TypeAssertion {
    pub fn new(
        type_name: impl Into<String>,
        method_index: usize,
        selections: Vec<Selection>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            method_index,
            selections,
        }
    }
}

impl From<TypeAssertion> for Selection {
    fn from(assertion: TypeAssertion) -> Self {
        Selection::TypeAssertion(assertion)
    }
}

impl Selection {
    /// Whether a field of this selection set is flagged asynchronous.
    ///
    /// Type assertions are transparent, nested field selections are not looked at.
    pub(crate) fn has_async<'a>(selections: impl IntoIterator<Item = &'a Selection>) -> bool {
        selections.into_iter().any(|selection| match selection {
            Selection::Field(field) => field.field.is_async,
            Selection::TypeAssertion(assertion) => Selection::has_async(&assertion.selections),
            Selection::Typename(_) => false,
        })
    }

    /// Whether any selection at any depth below is flagged asynchronous.
    pub(crate) fn has_async_descendant<'a>(
        selections: impl IntoIterator<Item = &'a Selection>,
    ) -> bool {
        selections.into_iter().any(|selection| match selection {
            Selection::Field(field) => {
                field.field.is_async || Selection::has_async_descendant(&field.selections)
            }
            Selection::TypeAssertion(assertion) => {
                Selection::has_async_descendant(&assertion.selections)
            }
            Selection::Typename(_) => false,
        })
    }
}

/// Descriptor of a requested sub-field, handed to resolver methods that ask for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedField {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub selected: Vec<SelectedField>,
}

impl SelectedField {
    /// Lists the schema fields of a selection set, flattening type assertions.
    pub(crate) fn from_selections<'a>(
        selections: impl IntoIterator<Item = &'a Selection>,
    ) -> Vec<SelectedField> {
        let mut fields = Vec::new();
        for selection in selections {
            match selection {
                Selection::Field(field) => fields.push(SelectedField {
                    name: field.field.name.clone(),
                    selected: SelectedField::from_selections(&field.selections),
                }),
                Selection::TypeAssertion(assertion) => {
                    fields.extend(SelectedField::from_selections(&assertion.selections))
                }
                Selection::Typename(_) => {}
            }
        }
        fields
    }
}

impl fmt::Display for SelectedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.selected.is_empty() {
            write!(f, " {{")?;
            for field in &self.selected {
                write!(f, " {field}")?;
            }
            write!(f, " }}")?;
        }
        Ok(())
    }
}
