//! Flattening of a selection set into the fields to execute for one value.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::resolver::ResolverHandle;
use crate::spec::SchemaField;
use crate::spec::Selection;
use crate::spec::TypenameField;

/// A field ready to execute: one per output key of a selection set.
pub(crate) struct FieldToExecute<'a> {
    pub(crate) field: Cow<'a, SchemaField>,
    /// Sub-selections of every occurrence of the output key, in document order.
    pub(crate) selections: Vec<&'a Selection>,
    /// The value the field is resolved on, narrowed when the field sits in a type assertion.
    pub(crate) resolver: ResolverHandle,
}

impl FieldToExecute<'_> {
    pub(crate) fn alias(&self) -> &str {
        &self.field.alias
    }
}

/// Appends the fields of `selections` to `fields`, merging occurrences of the same output key.
///
/// Output keys keep the order in which they were first seen. The first occurrence decides which
/// schema field and resolver are used. Type assertions that do not hold for `resolver` are
/// skipped, the others contribute their fields resolved on the narrowed value.
pub(crate) fn collect_fields<'a>(
    selections: impl IntoIterator<Item = &'a Selection>,
    resolver: &ResolverHandle,
    fields: &mut Vec<FieldToExecute<'a>>,
    by_alias: &mut HashMap<&'a str, usize>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => match by_alias.entry(field.alias.as_str()) {
                Entry::Occupied(entry) => {
                    fields[*entry.get()]
                        .selections
                        .extend(field.selections.iter());
                }
                Entry::Vacant(entry) => {
                    entry.insert(fields.len());
                    fields.push(FieldToExecute {
                        field: Cow::Borrowed(field),
                        selections: field.selections.iter().collect(),
                        resolver: resolver.clone(),
                    });
                }
            },
            Selection::Typename(typename) => {
                if let Entry::Vacant(entry) = by_alias.entry(typename.alias.as_str()) {
                    entry.insert(fields.len());
                    fields.push(FieldToExecute {
                        field: Cow::Owned(SchemaField::typename(
                            &typename.alias,
                            type_name_of(typename, resolver),
                        )),
                        selections: Vec::new(),
                        resolver: resolver.clone(),
                    });
                }
            }
            Selection::TypeAssertion(assertion) => {
                if let Some(narrowed) = resolver.narrow(assertion.method_index) {
                    collect_fields(&assertion.selections, &narrowed, fields, by_alias);
                }
            }
        }
    }
}

/// Dynamic type name of `resolver`: the first type condition that holds, in declaration order.
///
/// Empty if none does.
pub(crate) fn type_name_of(typename: &TypenameField, resolver: &ResolverHandle) -> String {
    if typename.type_conditions.is_empty() {
        return typename.type_name.clone();
    }
    typename
        .type_conditions
        .iter()
        .find(|condition| resolver.narrow(condition.method_index).is_some())
        .map(|condition| condition.type_name.clone())
        .unwrap_or_default()
}
