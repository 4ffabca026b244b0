mod bind;
mod error;

pub(crate) use bind::bind_operation;
pub(crate) use error::location;

use async_graphql_parser::types::OperationType;
use async_graphql_value::{ConstValue, Name};
use engine_error::Location;
use indexmap::IndexMap;

/// An operation validated against the request's schema view, with
/// fragments flattened, arguments coerced and variables substituted.
pub(crate) struct BoundOperation {
    pub ty: OperationType,
    pub root_type: String,
    pub selection: Vec<BoundField>,
}

pub(crate) struct BoundField {
    pub response_key: String,
    pub name: String,
    pub kind: BoundFieldKind,
    pub arguments: IndexMap<Name, ConstValue>,
    pub location: Location,
    pub selection: Vec<BoundField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundFieldKind {
    /// A field defined by the schema, fully validated.
    Normal,
    /// The `__typename` meta field, valid in any selection set.
    TypeName,
    /// `__schema` or `__type` on the query root.
    Introspection,
    /// A descendant of an introspection field: resolved by key lookup in
    /// the introspection value, not validated against the schema.
    Loose,
}
