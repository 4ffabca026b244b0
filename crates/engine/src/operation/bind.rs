use async_graphql_parser::{
    types::{
        DocumentOperations, ExecutableDocument, Field, OperationDefinition, OperationType, Selection, SelectionSet,
    },
    Positioned,
};
use async_graphql_value::{ConstValue, Name, Value};
use indexmap::IndexMap;

use super::{
    error::{location, BindError},
    BoundField, BoundFieldKind, BoundOperation,
};
use crate::registry::{MetaType, ObjectType, SchemaView};

/// Walks the parsed document against the schema view, producing a bound
/// operation or the first validation error encountered.
pub(crate) fn bind_operation(
    view: SchemaView<'_>,
    document: &ExecutableDocument,
    operation_name: Option<&str>,
    variables: &IndexMap<Name, ConstValue>,
) -> Result<BoundOperation, BindError> {
    let operation = select_operation(document, operation_name)?;

    let root_type = match operation.node.ty {
        OperationType::Query => view.registry().query_type.clone(),
        OperationType::Mutation => view
            .registry()
            .mutation_type
            .clone()
            .ok_or(BindError::NoMutationDefined)?,
        OperationType::Subscription => return Err(BindError::NoSubscriptionDefined),
    };
    let root_object = view.object(&root_type).ok_or(BindError::NoQueryDefined)?;

    let variables = coerce_variables(&operation.node, variables)?;

    let binder = Binder {
        view,
        document,
        variables,
    };
    let selection = binder.bind_selection_set(
        root_object,
        &operation.node.selection_set.node,
        &mut Vec::new(),
        operation.node.ty == OperationType::Query,
    )?;

    Ok(BoundOperation {
        ty: operation.node.ty,
        root_type,
        selection,
    })
}

fn select_operation<'d>(
    document: &'d ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<&'d Positioned<OperationDefinition>, BindError> {
    match (&document.operations, operation_name) {
        (DocumentOperations::Single(operation), _) => Ok(operation),
        (DocumentOperations::Multiple(operations), Some(name)) => operations
            .iter()
            .find_map(|(candidate, operation)| (candidate.as_str() == name).then_some(operation))
            .ok_or_else(|| BindError::UnknownOperation { name: name.to_string() }),
        (DocumentOperations::Multiple(operations), None) => {
            let mut operations = operations.values();
            match (operations.next(), operations.next()) {
                (Some(operation), None) => Ok(operation),
                _ => Err(BindError::MissingOperationName),
            }
        }
    }
}

/// The variables an operation actually executes with: provided values win,
/// then declared defaults; a missing non-null variable is an error.
fn coerce_variables(
    operation: &OperationDefinition,
    provided: &IndexMap<Name, ConstValue>,
) -> Result<IndexMap<Name, ConstValue>, BindError> {
    let mut variables = IndexMap::new();
    for definition in &operation.variable_definitions {
        let name = &definition.node.name.node;
        let value = provided
            .iter()
            .find_map(|(provided_name, value)| (provided_name == name).then_some(value));
        if let Some(value) = value {
            variables.insert(name.clone(), value.clone());
        } else if let Some(default) = &definition.node.default_value {
            variables.insert(name.clone(), default.node.clone());
        } else if !definition.node.var_type.node.nullable {
            return Err(BindError::MissingVariable {
                name: name.to_string(),
                pos: definition.node.name.pos,
            });
        }
    }
    Ok(variables)
}

struct Binder<'a> {
    view: SchemaView<'a>,
    document: &'a ExecutableDocument,
    variables: IndexMap<Name, ConstValue>,
}

impl<'a> Binder<'a> {
    fn bind_selection_set(
        &self,
        parent: &ObjectType,
        selection_set: &SelectionSet,
        fragment_stack: &mut Vec<String>,
        is_root: bool,
    ) -> Result<Vec<BoundField>, BindError> {
        let mut fields = Vec::with_capacity(selection_set.items.len());
        for item in &selection_set.items {
            match &item.node {
                Selection::Field(field) => {
                    fields.push(self.bind_field(parent, field, fragment_stack, is_root)?);
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    let fragment = self
                        .document
                        .fragments
                        .iter()
                        .find_map(|(candidate, fragment)| (candidate.as_str() == name).then_some(fragment))
                        .ok_or_else(|| BindError::UnknownFragment {
                            name: name.to_string(),
                            pos: spread.node.fragment_name.pos,
                        })?;
                    if fragment_stack.iter().any(|visited| visited == name) {
                        return Err(BindError::FragmentCycle {
                            name: name.to_string(),
                            pos: spread.node.fragment_name.pos,
                        });
                    }
                    let condition = fragment.node.type_condition.node.on.node.as_str();
                    if condition != parent.name {
                        return Err(BindError::DisjointTypeCondition {
                            parent: parent.name.clone(),
                            name: condition.to_string(),
                            pos: fragment.node.type_condition.pos,
                        });
                    }
                    fragment_stack.push(name.to_string());
                    fields.extend(self.bind_selection_set(
                        parent,
                        &fragment.node.selection_set.node,
                        fragment_stack,
                        is_root,
                    )?);
                    fragment_stack.pop();
                }
                Selection::InlineFragment(fragment) => {
                    if let Some(condition) = &fragment.node.type_condition {
                        let on = condition.node.on.node.as_str();
                        if on != parent.name {
                            return Err(BindError::DisjointTypeCondition {
                                parent: parent.name.clone(),
                                name: on.to_string(),
                                pos: condition.pos,
                            });
                        }
                    }
                    fields.extend(self.bind_selection_set(
                        parent,
                        &fragment.node.selection_set.node,
                        fragment_stack,
                        is_root,
                    )?);
                }
            }
        }
        Ok(fields)
    }

    fn bind_field(
        &self,
        parent: &ObjectType,
        field: &Positioned<Field>,
        fragment_stack: &mut Vec<String>,
        is_root: bool,
    ) -> Result<BoundField, BindError> {
        let name = field.node.name.node.as_str();
        let response_key = field
            .node
            .alias
            .as_ref()
            .map(|alias| alias.node.to_string())
            .unwrap_or_else(|| name.to_string());

        if name == "__typename" {
            return Ok(BoundField {
                response_key,
                name: name.to_string(),
                kind: BoundFieldKind::TypeName,
                arguments: IndexMap::new(),
                location: location(field.node.name.pos),
                selection: Vec::new(),
            });
        }

        let is_query_root = is_root && parent.name == self.view.registry().query_type;
        if is_query_root && (name == "__schema" || name == "__type") {
            return Ok(BoundField {
                response_key,
                name: name.to_string(),
                kind: BoundFieldKind::Introspection,
                arguments: self.bind_arguments_loose(field)?,
                location: location(field.node.name.pos),
                selection: self.bind_loose_selection(&field.node.selection_set.node)?,
            });
        }

        let Some(definition) = self.view.field(&parent.name, name) else {
            return Err(BindError::UnknownField {
                container: parent.name.clone(),
                name: name.to_string(),
                pos: field.node.name.pos,
            });
        };

        let mut arguments = IndexMap::new();
        for (argument_name, argument_value) in &field.node.arguments {
            if self
                .view
                .argument(&parent.name, &definition.name, argument_name.node.as_str())
                .is_none()
            {
                return Err(BindError::UnknownArgument {
                    field_name: definition.name.clone(),
                    argument_name: argument_name.node.to_string(),
                    pos: argument_name.pos,
                });
            }
            let value = self.const_value(argument_value)?;
            arguments.insert(argument_name.node.clone(), value);
        }
        for argument in self.view.arguments(&parent.name, definition) {
            if arguments.iter().any(|(bound, _)| bound.as_str() == argument.name) {
                continue;
            }
            if let Some(default) = &argument.default_value {
                arguments.insert(Name::new(&argument.name), default.clone());
            } else if argument.ty.is_non_null() {
                return Err(BindError::MissingArgument {
                    field: definition.name.clone(),
                    name: argument.name.clone(),
                    pos: field.pos,
                });
            }
        }

        let named_type = definition.ty.named_type().to_string();
        let Some(field_type) = self.view.type_named(&named_type) else {
            return Err(BindError::UnknownType {
                name: named_type,
                pos: field.pos,
            });
        };
        let selection = match field_type {
            MetaType::Object(object) => {
                if field.node.selection_set.node.items.is_empty() {
                    return Err(BindError::MustHaveSelectionSet {
                        name: name.to_string(),
                        ty: definition.ty.to_string(),
                        pos: field.pos,
                    });
                }
                self.bind_selection_set(object, &field.node.selection_set.node, fragment_stack, false)?
            }
            _ => {
                if !field.node.selection_set.node.items.is_empty() {
                    return Err(BindError::CannotHaveSelectionSet {
                        name: name.to_string(),
                        ty: named_type,
                        pos: field.pos,
                    });
                }
                Vec::new()
            }
        };

        Ok(BoundField {
            response_key,
            name: name.to_string(),
            kind: BoundFieldKind::Normal,
            arguments,
            location: location(field.node.name.pos),
            selection,
        })
    }

    /// Introspection selections are not validated against the schema; their
    /// fields resolve by key lookup in the introspection value.
    fn bind_loose_selection(&self, selection_set: &SelectionSet) -> Result<Vec<BoundField>, BindError> {
        let mut fields = Vec::with_capacity(selection_set.items.len());
        for item in &selection_set.items {
            match &item.node {
                Selection::Field(field) => {
                    let name = field.node.name.node.as_str();
                    let response_key = field
                        .node
                        .alias
                        .as_ref()
                        .map(|alias| alias.node.to_string())
                        .unwrap_or_else(|| name.to_string());
                    let kind = if name == "__typename" {
                        BoundFieldKind::TypeName
                    } else {
                        BoundFieldKind::Loose
                    };
                    fields.push(BoundField {
                        response_key,
                        name: name.to_string(),
                        kind,
                        arguments: self.bind_arguments_loose(field)?,
                        location: location(field.node.name.pos),
                        selection: self.bind_loose_selection(&field.node.selection_set.node)?,
                    });
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    let fragment = self
                        .document
                        .fragments
                        .iter()
                        .find_map(|(candidate, fragment)| (candidate.as_str() == name).then_some(fragment))
                        .ok_or_else(|| BindError::UnknownFragment {
                            name: name.to_string(),
                            pos: spread.node.fragment_name.pos,
                        })?;
                    fields.extend(self.bind_loose_selection(&fragment.node.selection_set.node)?);
                }
                Selection::InlineFragment(fragment) => {
                    fields.extend(self.bind_loose_selection(&fragment.node.selection_set.node)?);
                }
            }
        }
        Ok(fields)
    }

    fn bind_arguments_loose(&self, field: &Positioned<Field>) -> Result<IndexMap<Name, ConstValue>, BindError> {
        let mut arguments = IndexMap::new();
        for (argument_name, argument_value) in &field.node.arguments {
            let value = self.const_value(argument_value)?;
            arguments.insert(argument_name.node.clone(), value);
        }
        Ok(arguments)
    }

    fn const_value(&self, value: &Positioned<Value>) -> Result<ConstValue, BindError> {
        value.node.clone().into_const_with(|name| {
            self.variables
                .get(&name)
                .cloned()
                .ok_or(BindError::UndefinedVariable {
                    name: name.to_string(),
                    pos: value.pos,
                })
        })
    }
}
