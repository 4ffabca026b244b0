//! A small, dynamic GraphQL execution engine whose request pipeline is wired
//! for field-level authorization: every field resolution passes through the
//! [`engine_auth::AuthorizationInterceptor`] before its resolver runs, and
//! the schema surface each request validates against is rewritten per
//! request by the [`engine_auth::MaskPlanner`].

mod execution;
mod operation;
mod registry;
mod request;
mod response;
mod schema;

pub use async_graphql_value::{ConstValue, Name};
pub use engine_auth::{
    AuthConfig, ConfigurationError, FailureMode, Guard, GuardContext, Policy, PolicyLocator, RequestContext,
};
pub use engine_error::{ErrorCode, ErrorPath, GraphqlError, Location};
pub use registry::{
    EnumType, MetaField, MetaFieldType, MetaInputValue, MetaType, ObjectType, Registry, Resolver, ResolverContext,
    ScalarType, SchemaView,
};
pub use request::{Request, Variables};
pub use response::Response;
pub use schema::{Schema, SchemaBuilder};
