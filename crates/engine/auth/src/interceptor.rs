use std::sync::Arc;

use async_graphql_value::{ConstValue, Name};
use engine_error::{ErrorCode, ErrorPath, GraphqlError, Location};
use indexmap::IndexMap;

use crate::{
    config::FailureMode,
    context::RequestContext,
    guard::GuardContext,
    registry::GuardRegistry,
};

/// Ephemeral record describing the field the engine is about to resolve.
/// Lives for a single resolution step.
pub struct FieldAccessEvent<'a> {
    pub parent_type: &'a str,
    pub field_name: &'a str,
    /// Named return type of the field, without list or non-null wrappers.
    pub return_type: &'a str,
    pub parent: &'a ConstValue,
    pub arguments: &'a IndexMap<Name, ConstValue>,
    pub request: &'a RequestContext,
    pub location: Location,
    /// Response path of the field itself, root first.
    pub path: &'a ErrorPath,
}

impl<'a> FieldAccessEvent<'a> {
    fn guard_context(&self) -> GuardContext<'a> {
        GuardContext {
            parent: self.parent,
            arguments: self.arguments,
            request: self.request,
        }
    }
}

/// Outcome of intercepting one field-access event. Consumed immediately by
/// the executor; never stored.
#[derive(Debug)]
pub enum DenialOutcome {
    /// No guard applied, or the predicate allowed access: run the resolver
    /// and pass its value through unchanged.
    Proceed,
    /// Exception mode denial: the whole execution stops, no data at all.
    Abort(GraphqlError),
    /// Error-collecting mode denial: substitute null for the field, record
    /// the error, keep resolving siblings.
    MaskWithError(GraphqlError),
}

/// The per-field gate invoked by the engine immediately before a resolver
/// runs. Holds no mutable state, so concurrent field resolutions can share
/// one interceptor freely.
pub struct AuthorizationInterceptor {
    registry: Arc<GuardRegistry>,
    failure_mode: FailureMode,
}

impl AuthorizationInterceptor {
    pub fn new(registry: Arc<GuardRegistry>, failure_mode: FailureMode) -> Self {
        AuthorizationInterceptor { registry, failure_mode }
    }

    pub fn registry(&self) -> &Arc<GuardRegistry> {
        &self.registry
    }

    /// Evaluates the applicable predicates for this event. Argument guards
    /// run first, then the field (or return-type) guard. Awaiting an
    /// asynchronous predicate suspends only this field's resolution.
    pub async fn authorize_field(&self, event: &FieldAccessEvent<'_>) -> DenialOutcome {
        let resolver = self.registry.resolver();

        for (argument_name, guard) in resolver.argument_guards(event.parent_type, event.field_name) {
            if !guard.evaluate(event.guard_context()).await {
                tracing::debug!(
                    "denied access to argument {}.{}.{argument_name}",
                    event.parent_type,
                    event.field_name,
                );
                return self.deny(event, Some(argument_name));
            }
        }

        match resolver.field_guard(event.parent_type, event.field_name, event.return_type) {
            None => DenialOutcome::Proceed,
            Some(guard) => {
                if guard.evaluate(event.guard_context()).await {
                    DenialOutcome::Proceed
                } else {
                    tracing::debug!("denied access to {}.{}", event.parent_type, event.field_name);
                    self.deny(event, None)
                }
            }
        }
    }

    fn deny(&self, event: &FieldAccessEvent<'_>, argument: Option<&str>) -> DenialOutcome {
        let target = match argument {
            Some(argument) => format!("{}.{}.{argument}", event.parent_type, event.field_name),
            None => format!("{}.{}", event.parent_type, event.field_name),
        };
        // The exception-mode message carries a colon, the collecting-mode
        // one does not; both are part of the public contract.
        let message = match self.failure_mode {
            FailureMode::Abort => format!("Not authorized to access: {target}"),
            FailureMode::CollectErrors => format!("Not authorized to access {target}"),
        };

        let mut error = GraphqlError::new(message, ErrorCode::Unauthorized)
            .with_location(event.location)
            .with_path(event.path.clone())
            .with_extension("typeName", event.parent_type)
            .with_extension("fieldName", event.field_name);
        if let Some(argument) = argument {
            error = error.with_extension("argumentName", argument);
        }

        match self.failure_mode {
            FailureMode::Abort => DenialOutcome::Abort(error),
            FailureMode::CollectErrors => DenialOutcome::MaskWithError(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Guard;

    fn event<'a>(
        parent: &'a ConstValue,
        arguments: &'a IndexMap<Name, ConstValue>,
        request: &'a RequestContext,
        path: &'a ErrorPath,
    ) -> FieldAccessEvent<'a> {
        FieldAccessEvent {
            parent_type: "Query",
            field_name: "posts",
            return_type: "Post",
            parent,
            arguments,
            request,
            location: Location::new(1, 9),
            path,
        }
    }

    fn registry_denying_posts() -> Arc<GuardRegistry> {
        let mut builder = GuardRegistry::builder();
        builder.field_guard("Query", "posts", Guard::new(|_| false));
        Arc::new(builder.build().unwrap())
    }

    #[tokio::test]
    async fn denial_aborts_in_exception_mode() {
        let interceptor = AuthorizationInterceptor::new(registry_denying_posts(), FailureMode::Abort);

        let parent = ConstValue::Null;
        let arguments = IndexMap::new();
        let request = RequestContext::default();
        let path = ErrorPath::from(vec!["posts"]);

        match interceptor
            .authorize_field(&event(&parent, &arguments, &request, &path))
            .await
        {
            DenialOutcome::Abort(error) => {
                assert_eq!(error.message, "Not authorized to access: Query.posts");
                assert_eq!(error.code, ErrorCode::Unauthorized);
            }
            other => panic!("expected abort, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn denial_masks_in_error_collecting_mode() {
        let interceptor = AuthorizationInterceptor::new(registry_denying_posts(), FailureMode::CollectErrors);

        let parent = ConstValue::Null;
        let arguments = IndexMap::new();
        let request = RequestContext::default();
        let path = ErrorPath::from(vec!["posts"]);

        match interceptor
            .authorize_field(&event(&parent, &arguments, &request, &path))
            .await
        {
            DenialOutcome::MaskWithError(error) => {
                assert_eq!(error.message, "Not authorized to access Query.posts");
                assert_eq!(error.path, Some(ErrorPath::from(vec!["posts"])));
                assert_eq!(error.locations, vec![Location::new(1, 9)]);
            }
            other => panic!("expected mask-with-error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn argument_guards_run_before_the_field_guard() {
        let mut builder = GuardRegistry::builder();
        builder.argument_guard("Query", "posts", "userId", Guard::new(|_| false));
        // Field guard would allow, but must never be reached.
        builder.field_guard("Query", "posts", Guard::new(|_| true));
        let interceptor = AuthorizationInterceptor::new(Arc::new(builder.build().unwrap()), FailureMode::Abort);

        let parent = ConstValue::Null;
        let arguments = IndexMap::new();
        let request = RequestContext::default();
        let path = ErrorPath::from(vec!["posts"]);

        match interceptor
            .authorize_field(&event(&parent, &arguments, &request, &path))
            .await
        {
            DenialOutcome::Abort(error) => {
                assert_eq!(error.message, "Not authorized to access: Query.posts.userId");
            }
            other => panic!("expected abort, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unguarded_events_proceed() {
        let interceptor =
            AuthorizationInterceptor::new(Arc::new(GuardRegistry::builder().build().unwrap()), FailureMode::Abort);

        let parent = ConstValue::Null;
        let arguments = IndexMap::new();
        let request = RequestContext::default();
        let path = ErrorPath::from(vec!["posts"]);

        assert!(matches!(
            interceptor
                .authorize_field(&event(&parent, &arguments, &request, &path))
                .await,
            DenialOutcome::Proceed
        ));
    }
}
