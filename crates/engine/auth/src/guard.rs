use std::sync::Arc;

use async_graphql_value::{ConstValue, Name};
use futures_util::future::BoxFuture;
use indexmap::IndexMap;

use crate::{context::RequestContext, policy::Policy};

/// Everything a predicate may look at: the parent object the field hangs
/// off, the coerced argument map, and the request context.
///
/// Mask predicates run before any data has been fetched, so they see a null
/// parent and only statically-known arguments.
#[derive(Clone, Copy)]
pub struct GuardContext<'a> {
    pub parent: &'a ConstValue,
    pub arguments: &'a IndexMap<Name, ConstValue>,
    pub request: &'a RequestContext,
}

impl<'a> GuardContext<'a> {
    pub fn argument(&self, name: &str) -> Option<&'a ConstValue> {
        self.arguments.get(name)
    }
}

type SyncPredicate = dyn Fn(&GuardContext<'_>) -> bool + Send + Sync;
type AsyncPredicate = dyn for<'a> Fn(&'a GuardContext<'a>) -> BoxFuture<'a, bool> + Send + Sync;

/// A single authorization predicate attached to a type, field or argument.
///
/// Guards are pure: evaluating one must not mutate its inputs, and the same
/// inputs always yield the same boolean. They are evaluated at most once per
/// field-access event and never memoized across events.
#[derive(Clone)]
pub struct Guard {
    kind: GuardKind,
}

#[derive(Clone)]
pub(crate) enum GuardKind {
    Sync(Arc<SyncPredicate>),
    Async(Arc<AsyncPredicate>),
    /// Marker requesting policy-object lookup; replaced by `Resolved` when
    /// the registry is built.
    Policy,
    Resolved(Arc<dyn Policy>),
}

impl Guard {
    /// A synchronous predicate.
    pub fn new(predicate: impl Fn(&GuardContext<'_>) -> bool + Send + Sync + 'static) -> Self {
        Guard {
            kind: GuardKind::Sync(Arc::new(predicate)),
        }
    }

    /// An asynchronous predicate. The returned future may borrow from the
    /// guard context; it suspends only the field being authorized.
    pub fn new_async<F>(predicate: F) -> Self
    where
        F: for<'a> Fn(&'a GuardContext<'a>) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        Guard {
            kind: GuardKind::Async(Arc::new(predicate)),
        }
    }

    /// Defer to the policy object located for the annotated type.
    pub fn policy() -> Self {
        Guard { kind: GuardKind::Policy }
    }

    pub(crate) fn resolved(policy: Arc<dyn Policy>) -> Self {
        Guard {
            kind: GuardKind::Resolved(policy),
        }
    }

    pub(crate) fn is_policy_marker(&self) -> bool {
        matches!(self.kind, GuardKind::Policy)
    }

    pub async fn evaluate(&self, ctx: GuardContext<'_>) -> bool {
        match &self.kind {
            GuardKind::Sync(predicate) => predicate(&ctx),
            GuardKind::Async(predicate) => predicate(&ctx).await,
            GuardKind::Resolved(policy) => policy.authorize(&ctx).await,
            GuardKind::Policy => {
                // Markers are replaced during the registry build; reaching one
                // here means the guard never went through a builder.
                tracing::error!("unresolved policy guard evaluated, denying access");
                false
            }
        }
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            GuardKind::Sync(_) => "sync",
            GuardKind::Async(_) => "async",
            GuardKind::Policy => "policy",
            GuardKind::Resolved(_) => "resolved-policy",
        };
        f.debug_struct("Guard").field("kind", &kind).finish()
    }
}
