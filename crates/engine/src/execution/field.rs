use async_graphql_value::ConstValue;
use engine_auth::{DenialOutcome, FieldAccessEvent};
use engine_error::{ErrorCode, ErrorPath, GraphqlError, Location};
use futures_util::future::BoxFuture;

use super::{container::resolve_container, introspection, ExecutionContext, FieldError};
use crate::{
    operation::{BoundField, BoundFieldKind},
    registry::{MetaFieldType, MetaType, ObjectType, ResolverContext},
};

/// Resolves a single field of `object` within `ctx`.
///
/// The guard is evaluated strictly before the resolver runs and before any
/// child field is considered; a suspension while evaluating it parks only
/// this future, sibling fields keep resolving.
pub(super) fn resolve_field<'a>(
    ctx: ExecutionContext<'a>,
    object: &'a ObjectType,
    field: &'a BoundField,
    parent_value: &'a ConstValue,
    parent_path: &'a ErrorPath,
) -> BoxFuture<'a, Result<(String, ConstValue), FieldError>> {
    Box::pin(async move {
        let mut path = parent_path.clone();
        path.push(field.response_key.as_str());

        match field.kind {
            BoundFieldKind::TypeName => {
                return Ok((field.response_key.clone(), ConstValue::String(object.name.clone())));
            }
            BoundFieldKind::Introspection => {
                return introspection::resolve_introspection(ctx, field, &path);
            }
            BoundFieldKind::Loose => {
                let value = match parent_value {
                    ConstValue::Object(map) => map.get(field.name.as_str()).cloned().unwrap_or(ConstValue::Null),
                    _ => ConstValue::Null,
                };
                return Ok((field.response_key.clone(), introspection::project(&value, &field.selection)));
            }
            BoundFieldKind::Normal => {}
        }

        let Some(definition) = ctx.view.field(&object.name, &field.name) else {
            // Bound against the same view, so this cannot happen short of a
            // bug; fail the field rather than the process.
            return Err(FieldError::Propagate(
                GraphqlError::internal_server_error()
                    .with_location(field.location)
                    .with_path(path.clone()),
            ));
        };

        let event = FieldAccessEvent {
            parent_type: &object.name,
            field_name: &field.name,
            return_type: definition.ty.named_type(),
            parent: parent_value,
            arguments: &field.arguments,
            request: ctx.request,
            location: field.location,
            path: &path,
        };
        match ctx.interceptor.authorize_field(&event).await {
            DenialOutcome::Proceed => {}
            DenialOutcome::Abort(error) => return Err(FieldError::Abort(error)),
            DenialOutcome::MaskWithError(error) => {
                return catch_or_propagate(ctx, &definition.ty, field, error);
            }
        }

        let resolved = definition
            .resolver
            .resolve(
                &field.name,
                ResolverContext {
                    parent: parent_value,
                    arguments: &field.arguments,
                    request: ctx.request,
                },
            )
            .await;
        let value = match resolved {
            Ok(value) => value,
            Err(error) => {
                return catch_or_propagate(ctx, &definition.ty, field, located(error, field.location, &path));
            }
        };

        match shape_value(ctx, field, definition.ty.clone(), value, path.clone()).await {
            Ok(value) => Ok((field.response_key.clone(), value)),
            Err(FieldError::Abort(error)) => Err(FieldError::Abort(error)),
            Err(FieldError::Propagate(error)) => catch_or_propagate(ctx, &definition.ty, field, error),
        }
    })
}

/// The standard nullability split: a nullable field swallows the error into
/// the response and yields null, a non-null field hands it to its parent to
/// null out instead.
fn catch_or_propagate(
    ctx: ExecutionContext<'_>,
    ty: &MetaFieldType,
    field: &BoundField,
    error: GraphqlError,
) -> Result<(String, ConstValue), FieldError> {
    if ty.is_nullable() {
        ctx.add_error(error);
        Ok((field.response_key.clone(), ConstValue::Null))
    } else {
        Err(FieldError::Propagate(error))
    }
}

fn located(mut error: GraphqlError, location: Location, path: &ErrorPath) -> GraphqlError {
    if error.locations.is_empty() {
        error.locations.push(location);
    }
    if error.path.is_none() {
        error.path = Some(path.clone());
    }
    error
}

/// Fits a resolved value to the field's declared type: enforces non-null,
/// recurses into lists and selection sets, passes leaves through.
fn shape_value<'a>(
    ctx: ExecutionContext<'a>,
    field: &'a BoundField,
    ty: MetaFieldType,
    value: ConstValue,
    path: ErrorPath,
) -> BoxFuture<'a, Result<ConstValue, FieldError>> {
    Box::pin(async move {
        if value == ConstValue::Null {
            if ty.is_non_null() {
                return Err(FieldError::Propagate(
                    GraphqlError::new(
                        format!(
                            "An error happened while fetching `{}`, expected a non null value but found a null",
                            field.name
                        ),
                        ErrorCode::InternalServerError,
                    )
                    .with_location(field.location)
                    .with_path(path),
                ));
            }
            return Ok(ConstValue::Null);
        }

        if ty.is_list() {
            let ConstValue::List(items) = value else {
                return Err(FieldError::Propagate(
                    GraphqlError::new(
                        format!("Expected a list for `{}`", field.name),
                        ErrorCode::InternalServerError,
                    )
                    .with_location(field.location)
                    .with_path(path),
                ));
            };
            let item_ty = ty.list_item_type().unwrap_or_else(|| ty.named_type().into());
            let items = items.into_iter().enumerate().map(|(index, item)| {
                let item_ty = item_ty.clone();
                let mut item_path = path.clone();
                item_path.push(index);
                async move {
                    let item_is_nullable = item_ty.is_nullable();
                    match shape_value(ctx, field, item_ty, item, item_path).await {
                        Ok(value) => Ok(value),
                        Err(FieldError::Propagate(error)) if item_is_nullable => {
                            ctx.add_error(error);
                            Ok(ConstValue::Null)
                        }
                        Err(error) => Err(error),
                    }
                }
            });
            return Ok(ConstValue::List(futures_util::future::try_join_all(items).await?));
        }

        match ctx.view.type_named(ty.named_type()) {
            Some(MetaType::Object(object)) => resolve_container(ctx, object, &field.selection, &value, &path, true).await,
            Some(_) => Ok(value),
            None => Err(FieldError::Propagate(
                GraphqlError::internal_server_error()
                    .with_location(field.location)
                    .with_path(path),
            )),
        }
    })
}
