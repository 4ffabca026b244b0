use async_graphql_value::{ConstValue, Name};
use engine_error::{ErrorCode, ErrorPath, GraphqlError};
use indexmap::IndexMap;

use super::{ExecutionContext, FieldError};
use crate::{
    operation::BoundField,
    registry::{MetaField, MetaInputValue, MetaType, SchemaView},
};

/// Resolves `__schema` / `__type` against the request's schema view, so a
/// masked field or argument is as invisible to introspection as it is to
/// validation.
pub(super) fn resolve_introspection(
    ctx: ExecutionContext<'_>,
    field: &BoundField,
    path: &ErrorPath,
) -> Result<(String, ConstValue), FieldError> {
    if !ctx.introspection_enabled {
        return Err(FieldError::Propagate(
            GraphqlError::new("Unauthorized for introspection.", ErrorCode::Unauthorized)
                .with_location(field.location)
                .with_path(path.clone()),
        ));
    }

    let value = match field.name.as_str() {
        "__schema" => schema_value(ctx.view),
        "__type" => match field.arguments.get("name") {
            Some(ConstValue::String(name)) => ctx
                .view
                .type_named(name)
                .map(|ty| type_value(ctx.view, ty))
                .unwrap_or(ConstValue::Null),
            _ => ConstValue::Null,
        },
        _ => ConstValue::Null,
    };

    Ok((field.response_key.clone(), project(&value, &field.selection)))
}

/// Applies a loose selection to an introspection value: plain key lookups,
/// distributed over lists. An empty selection keeps the value as is.
pub(super) fn project(value: &ConstValue, selection: &[BoundField]) -> ConstValue {
    if selection.is_empty() {
        return value.clone();
    }
    match value {
        ConstValue::List(items) => ConstValue::List(items.iter().map(|item| project(item, selection)).collect()),
        ConstValue::Object(map) => {
            let mut projected = IndexMap::with_capacity(selection.len());
            for field in selection {
                let child = map.get(field.name.as_str()).cloned().unwrap_or(ConstValue::Null);
                projected
                    .entry(Name::new(&field.response_key))
                    .or_insert_with(|| project(&child, &field.selection));
            }
            ConstValue::Object(projected)
        }
        other => other.clone(),
    }
}

fn object(entries: impl IntoIterator<Item = (&'static str, ConstValue)>) -> ConstValue {
    ConstValue::Object(
        entries
            .into_iter()
            .map(|(key, value)| (Name::new(key), value))
            .collect(),
    )
}

fn string(value: &str) -> ConstValue {
    ConstValue::String(value.to_string())
}

fn maybe_string(value: &Option<String>) -> ConstValue {
    value.as_deref().map(string).unwrap_or(ConstValue::Null)
}

fn schema_value(view: SchemaView<'_>) -> ConstValue {
    let registry = view.registry();
    object([
        ("__typename", string("__Schema")),
        ("queryType", object([("name", string(&registry.query_type))])),
        (
            "mutationType",
            registry
                .mutation_type
                .as_deref()
                .map(|name| object([("name", string(name))]))
                .unwrap_or(ConstValue::Null),
        ),
        ("subscriptionType", ConstValue::Null),
        (
            "types",
            ConstValue::List(registry.types.values().map(|ty| type_value(view, ty)).collect()),
        ),
        ("directives", ConstValue::List(Vec::new())),
    ])
}

fn type_value(view: SchemaView<'_>, ty: &MetaType) -> ConstValue {
    match ty {
        MetaType::Object(obj) => object([
            ("__typename", string("__Type")),
            ("kind", string("OBJECT")),
            ("name", string(&obj.name)),
            ("description", maybe_string(&obj.description)),
            (
                "fields",
                ConstValue::List(view.fields(obj).map(|field| field_value(view, &obj.name, field)).collect()),
            ),
            ("inputFields", ConstValue::Null),
            ("interfaces", ConstValue::List(Vec::new())),
            ("enumValues", ConstValue::Null),
            ("possibleTypes", ConstValue::Null),
        ]),
        MetaType::Scalar(scalar) => object([
            ("__typename", string("__Type")),
            ("kind", string("SCALAR")),
            ("name", string(&scalar.name)),
            ("description", maybe_string(&scalar.description)),
            ("fields", ConstValue::Null),
            ("inputFields", ConstValue::Null),
            ("interfaces", ConstValue::Null),
            ("enumValues", ConstValue::Null),
            ("possibleTypes", ConstValue::Null),
        ]),
        MetaType::Enum(enum_type) => object([
            ("__typename", string("__Type")),
            ("kind", string("ENUM")),
            ("name", string(&enum_type.name)),
            ("description", maybe_string(&enum_type.description)),
            ("fields", ConstValue::Null),
            ("inputFields", ConstValue::Null),
            ("interfaces", ConstValue::Null),
            (
                "enumValues",
                ConstValue::List(
                    enum_type
                        .values
                        .iter()
                        .map(|value| {
                            object([
                                ("__typename", string("__EnumValue")),
                                ("name", string(value)),
                                ("description", ConstValue::Null),
                                ("isDeprecated", ConstValue::Boolean(false)),
                                ("deprecationReason", ConstValue::Null),
                            ])
                        })
                        .collect(),
                ),
            ),
            ("possibleTypes", ConstValue::Null),
        ]),
    }
}

fn field_value(view: SchemaView<'_>, type_name: &str, field: &MetaField) -> ConstValue {
    object([
        ("__typename", string("__Field")),
        ("name", string(&field.name)),
        ("description", maybe_string(&field.description)),
        (
            "args",
            ConstValue::List(
                view.arguments(type_name, field)
                    .map(input_value)
                    .collect(),
            ),
        ),
        ("type", type_ref(view, field.ty.as_str())),
        ("isDeprecated", ConstValue::Boolean(false)),
        ("deprecationReason", ConstValue::Null),
    ])
}

fn input_value(argument: &MetaInputValue) -> ConstValue {
    object([
        ("__typename", string("__InputValue")),
        ("name", string(&argument.name)),
        ("description", maybe_string(&argument.description)),
        ("type", type_ref_unviewed(argument.ty.as_str())),
        (
            "defaultValue",
            argument
                .default_value
                .as_ref()
                .map(|value| ConstValue::String(value.to_string()))
                .unwrap_or(ConstValue::Null),
        ),
    ])
}

fn type_ref(view: SchemaView<'_>, sdl: &str) -> ConstValue {
    if let Some(inner) = sdl.strip_suffix('!') {
        return object([
            ("__typename", string("__Type")),
            ("kind", string("NON_NULL")),
            ("name", ConstValue::Null),
            ("ofType", type_ref(view, inner)),
        ]);
    }
    if let Some(inner) = sdl.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return object([
            ("__typename", string("__Type")),
            ("kind", string("LIST")),
            ("name", ConstValue::Null),
            ("ofType", type_ref(view, inner)),
        ]);
    }
    let kind = match view.type_named(sdl) {
        Some(MetaType::Object(_)) => "OBJECT",
        Some(MetaType::Enum(_)) => "ENUM",
        _ => "SCALAR",
    };
    object([
        ("__typename", string("__Type")),
        ("kind", string(kind)),
        ("name", string(sdl)),
        ("ofType", ConstValue::Null),
    ])
}

// Argument types are primitives here, no view needed for their kind.
fn type_ref_unviewed(sdl: &str) -> ConstValue {
    if let Some(inner) = sdl.strip_suffix('!') {
        return object([
            ("__typename", string("__Type")),
            ("kind", string("NON_NULL")),
            ("name", ConstValue::Null),
            ("ofType", type_ref_unviewed(inner)),
        ]);
    }
    if let Some(inner) = sdl.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return object([
            ("__typename", string("__Type")),
            ("kind", string("LIST")),
            ("name", ConstValue::Null),
            ("ofType", type_ref_unviewed(inner)),
        ]);
    }
    object([
        ("__typename", string("__Type")),
        ("kind", string("SCALAR")),
        ("name", string(sdl)),
        ("ofType", ConstValue::Null),
    ])
}
