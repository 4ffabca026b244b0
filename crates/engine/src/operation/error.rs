use async_graphql_parser::Pos;
use engine_error::{ErrorCode, GraphqlError, Location};

/// Everything that can go wrong between a parsed document and a bound,
/// executable operation. Masked schema elements fail here with the exact
/// errors undefined elements produce, because binding only ever consults
/// the request's schema view.
#[derive(thiserror::Error, Debug)]
pub(crate) enum BindError {
    #[error("{container} does not have a field named '{name}'")]
    UnknownField { container: String, name: String, pos: Pos },
    #[error("The field `{field_name}` does not have an argument named `{argument_name}`")]
    UnknownArgument {
        field_name: String,
        argument_name: String,
        pos: Pos,
    },
    #[error("Unknown type named '{name}'")]
    UnknownType { name: String, pos: Pos },
    #[error("Unknown fragment named '{name}'")]
    UnknownFragment { name: String, pos: Pos },
    #[error("Fragment '{name}' cannot reference itself")]
    FragmentCycle { name: String, pos: Pos },
    #[error("Type condition on '{name}' cannot be used in a '{parent}' selection set")]
    DisjointTypeCondition { parent: String, name: String, pos: Pos },
    #[error("Field '{name}' cannot have a selection set, it's a {ty}. Only objects can.")]
    CannotHaveSelectionSet { name: String, ty: String, pos: Pos },
    #[error("Field '{name}' of type {ty} must have a selection of subfields")]
    MustHaveSelectionSet { name: String, ty: String, pos: Pos },
    #[error("Missing argument named '{name}' for field '{field}'")]
    MissingArgument { field: String, name: String, pos: Pos },
    #[error("Variable '${name}' is not defined")]
    UndefinedVariable { name: String, pos: Pos },
    #[error("Variable '${name}' is missing")]
    MissingVariable { name: String, pos: Pos },
    #[error("Query root type is not defined on this schema.")]
    NoQueryDefined,
    #[error("Mutations are not defined on this schema.")]
    NoMutationDefined,
    #[error("Subscriptions are not supported by this engine.")]
    NoSubscriptionDefined,
    #[error("Unknown operation named '{name}'.")]
    UnknownOperation { name: String },
    #[error("Missing operation name.")]
    MissingOperationName,
}

impl BindError {
    fn pos(&self) -> Option<Pos> {
        match self {
            BindError::UnknownField { pos, .. }
            | BindError::UnknownArgument { pos, .. }
            | BindError::UnknownType { pos, .. }
            | BindError::UnknownFragment { pos, .. }
            | BindError::FragmentCycle { pos, .. }
            | BindError::DisjointTypeCondition { pos, .. }
            | BindError::CannotHaveSelectionSet { pos, .. }
            | BindError::MustHaveSelectionSet { pos, .. }
            | BindError::MissingArgument { pos, .. }
            | BindError::UndefinedVariable { pos, .. }
            | BindError::MissingVariable { pos, .. } => Some(*pos),
            BindError::NoQueryDefined
            | BindError::NoMutationDefined
            | BindError::NoSubscriptionDefined
            | BindError::UnknownOperation { .. }
            | BindError::MissingOperationName => None,
        }
    }
}

pub(crate) fn location(pos: Pos) -> Location {
    Location::new(
        u16::try_from(pos.line).unwrap_or(u16::MAX),
        u16::try_from(pos.column).unwrap_or(u16::MAX),
    )
}

impl From<BindError> for GraphqlError {
    fn from(error: BindError) -> Self {
        let code = match &error {
            BindError::MissingVariable { .. } | BindError::UndefinedVariable { .. } => ErrorCode::VariableError,
            _ => ErrorCode::OperationValidationError,
        };
        GraphqlError::new(error.to_string(), code).with_maybe_location(error.pos().map(location))
    }
}
