use serde::Deserialize;
use serde::Serialize;

use crate::spec::Selection;

/// The kind of a GraphQL operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    #[default]
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }

    /// Root fields of mutations run one after the other, in document order.
    pub const fn is_serial(&self) -> bool {
        matches!(self, OperationKind::Mutation)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated operation with its root selection set already built.
#[derive(Debug, Clone, Default)]
pub struct Operation {
    pub kind: OperationKind,
    pub name: Option<String>,
    pub selection_set: Vec<Selection>,
}

impl Operation {
    pub fn new(kind: OperationKind, selection_set: Vec<Selection>) -> Self {
        Self {
            kind,
            name: None,
            selection_set,
        }
    }

    pub fn query(selection_set: Vec<Selection>) -> Self {
        Self::new(OperationKind::Query, selection_set)
    }

    pub fn mutation(selection_set: Vec<Selection>) -> Self {
        Self::new(OperationKind::Mutation, selection_set)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
