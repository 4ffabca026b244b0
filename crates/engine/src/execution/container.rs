use async_graphql_value::{ConstValue, Name};
use engine_error::ErrorPath;
use indexmap::IndexMap;

use super::{field::resolve_field, ExecutionContext, FieldError};
use crate::{operation::BoundField, registry::ObjectType};

/// Resolves a selection set against one parent value, either concurrently
/// or field by field (mutation roots).
///
/// `try_join_all` gives the cancellation behavior authorization relies on:
/// the first fatal error drops every still-pending sibling future.
pub(super) async fn resolve_container(
    ctx: ExecutionContext<'_>,
    object: &ObjectType,
    selection: &[BoundField],
    parent_value: &ConstValue,
    path: &ErrorPath,
    parallel: bool,
) -> Result<ConstValue, FieldError> {
    let results = if parallel {
        let fields = selection
            .iter()
            .map(|field| resolve_field(ctx, object, field, parent_value, path));
        futures_util::future::try_join_all(fields).await?
    } else {
        let mut results = Vec::with_capacity(selection.len());
        for field in selection {
            results.push(resolve_field(ctx, object, field, parent_value, path).await?);
        }
        results
    };

    let mut container = IndexMap::with_capacity(results.len());
    for (response_key, value) in results {
        // First field wins on duplicate response keys.
        container.entry(Name::new(response_key)).or_insert(value);
    }
    Ok(ConstValue::Object(container))
}
