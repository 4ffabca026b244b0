use std::sync::Arc;

use async_graphql_value::{ConstValue, Name};
use engine_auth::RequestContext;
use engine_error::GraphqlError;
use futures_util::future::BoxFuture;
use indexmap::IndexMap;

/// What a resolver gets to look at: the parent object's value, the coerced
/// arguments of the field, and the request context.
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    pub parent: &'a ConstValue,
    pub arguments: &'a IndexMap<Name, ConstValue>,
    pub request: &'a RequestContext,
}

impl<'a> ResolverContext<'a> {
    pub fn argument(&self, name: &str) -> Option<&'a ConstValue> {
        self.arguments.get(name)
    }
}

type ResolverFn =
    dyn for<'a> Fn(&'a ResolverContext<'a>) -> BoxFuture<'a, Result<ConstValue, GraphqlError>> + Send + Sync;

/// How a field produces its value.
#[derive(Clone, Default)]
pub enum Resolver {
    /// Look the field up by name in the parent object. Fields without
    /// business logic of their own pass their parent's data down this way.
    #[default]
    Parent,
    /// Run a custom asynchronous function.
    Custom(Arc<ResolverFn>),
}

impl Resolver {
    pub fn custom<F>(resolver: F) -> Self
    where
        F: for<'a> Fn(&'a ResolverContext<'a>) -> BoxFuture<'a, Result<ConstValue, GraphqlError>>
            + Send
            + Sync
            + 'static,
    {
        Resolver::Custom(Arc::new(resolver))
    }

    pub(crate) async fn resolve(
        &self,
        field_name: &str,
        ctx: ResolverContext<'_>,
    ) -> Result<ConstValue, GraphqlError> {
        match self {
            Resolver::Parent => Ok(match ctx.parent {
                ConstValue::Object(object) => object.get(field_name).cloned().unwrap_or(ConstValue::Null),
                _ => ConstValue::Null,
            }),
            Resolver::Custom(resolver) => resolver(&ctx).await,
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolver::Parent => f.write_str("Parent"),
            Resolver::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
