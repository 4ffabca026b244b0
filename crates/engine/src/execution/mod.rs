mod container;
mod field;
mod introspection;

use container::resolve_container;

use std::sync::Mutex;

use async_graphql_parser::types::OperationType;
use async_graphql_value::ConstValue;
use engine_auth::{AuthorizationInterceptor, RequestContext};
use engine_error::{ErrorPath, GraphqlError};

use crate::{operation::BoundOperation, registry::SchemaView};

/// Shared, read-only state for one executing request. Copied freely into
/// the per-field futures.
#[derive(Clone, Copy)]
pub(crate) struct ExecutionContext<'a> {
    pub view: SchemaView<'a>,
    pub interceptor: &'a AuthorizationInterceptor,
    pub request: &'a RequestContext,
    pub errors: &'a Mutex<Vec<GraphqlError>>,
    pub introspection_enabled: bool,
}

impl ExecutionContext<'_> {
    pub(crate) fn add_error(&self, error: GraphqlError) {
        self.errors.lock().expect("error sink poisoned").push(error);
    }
}

/// How a failed field travels upwards.
pub(crate) enum FieldError {
    /// Fatal authorization failure: stop everything, return no data at all.
    /// Never caught by nullable ancestors.
    Abort(GraphqlError),
    /// Standard propagation towards the nearest nullable ancestor, which
    /// records the error and becomes null itself.
    Propagate(GraphqlError),
}

pub(crate) async fn execute_operation(
    ctx: ExecutionContext<'_>,
    operation: &BoundOperation,
) -> Result<ConstValue, FieldError> {
    let root = ctx
        .view
        .object(&operation.root_type)
        .ok_or_else(|| FieldError::Propagate(GraphqlError::internal_server_error()))?;

    tracing::trace!("executing {:?} on {}", operation.ty, operation.root_type);

    // Mutation root fields run one after another, everything else resolves
    // its siblings concurrently.
    let parallel = operation.ty != OperationType::Mutation;
    resolve_container(
        ctx,
        root,
        &operation.selection,
        &ConstValue::Null,
        &ErrorPath::default(),
        parallel,
    )
    .await
}
