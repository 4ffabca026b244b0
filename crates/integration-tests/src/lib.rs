#![allow(unused_crate_dependencies, clippy::panic)]

//! Shared harness for the end-to-end tests: a tokio runtime, a small blog
//! schema with static data, and the request-context helpers the guard
//! predicates work against.

use std::sync::OnceLock;

use engine::{
    ConstValue, GraphqlError, MetaField, MetaInputValue, MetaType, ObjectType, Registry, RequestContext, Resolver,
    ResolverContext,
};
use tokio::runtime::Runtime;

pub fn runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::new().expect("failed to build the test runtime"))
}

/// The authenticated principal tests put into the request context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: u64,
    pub role: Option<String>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

pub fn admin() -> RequestContext {
    RequestContext::default().with(CurrentUser {
        id: 1,
        role: Some("admin".to_string()),
    })
}

pub fn member(id: u64) -> RequestContext {
    RequestContext::default().with(CurrentUser { id, role: None })
}

pub fn anonymous() -> RequestContext {
    RequestContext::default()
}

pub fn current_user<'a>(ctx: &engine::GuardContext<'a>) -> Option<&'a CurrentUser> {
    ctx.request.typed_get::<CurrentUser>()
}

pub fn value(json: serde_json::Value) -> ConstValue {
    ConstValue::from_json(json).expect("valid test data")
}

pub fn resolver<F>(f: F) -> Resolver
where
    F: Fn(ResolverContext<'_>) -> Result<ConstValue, GraphqlError> + Send + Sync + 'static,
{
    Resolver::custom(move |ctx| {
        let result = f(*ctx);
        Box::pin(async move { result })
    })
}

fn argument_u64(ctx: &ResolverContext<'_>, name: &str) -> u64 {
    match ctx.argument(name) {
        Some(ConstValue::Number(number)) => number.as_u64().unwrap_or_default(),
        _ => 0,
    }
}

fn user_json(id: u64) -> Option<serde_json::Value> {
    match id {
        1 => Some(serde_json::json!({"id": 1, "name": "Alice", "email": "alice@example.com"})),
        2 => Some(serde_json::json!({"id": 2, "name": "Bob", "email": "bob@example.com"})),
        _ => None,
    }
}

fn posts_json(user_id: u64) -> serde_json::Value {
    match user_id {
        1 => serde_json::json!([
            {"id": 1, "title": "Hello world", "secretNotes": "draft thoughts"},
        ]),
        2 => serde_json::json!([
            {"id": 2, "title": "Bob's adventures", "secretNotes": "do not publish"},
            {"id": 3, "title": "More adventures", "secretNotes": null},
        ]),
        _ => serde_json::json!([]),
    }
}

/// A blog schema without any guards or masks attached; tests wire their own
/// through the schema builder.
pub fn blog_registry() -> Registry {
    let mut registry = Registry::new();

    registry.insert_type(MetaType::Object(
        ObjectType::new("User")
            .with_field(MetaField::new("id", "Int!"))
            .with_field(MetaField::new("name", "String!"))
            .with_field(MetaField::new("email", "String"))
            .with_field(
                MetaField::new("posts", "[Post!]!").with_resolver(resolver(|ctx| {
                    let id = match ctx.parent {
                        ConstValue::Object(user) => match user.get("id") {
                            Some(ConstValue::Number(number)) => number.as_u64().unwrap_or_default(),
                            _ => 0,
                        },
                        _ => 0,
                    };
                    Ok(value(posts_json(id)))
                })),
            ),
    ));

    registry.insert_type(MetaType::Object(
        ObjectType::new("Post")
            .with_field(MetaField::new("id", "Int!"))
            .with_field(MetaField::new("title", "String!"))
            .with_field(MetaField::new("secretNotes", "String")),
    ));

    registry.insert_type(MetaType::Object(
        ObjectType::new("Query")
            .with_field(
                MetaField::new("posts", "[Post!]")
                    .with_argument(MetaInputValue::new("userId", "Int!"))
                    .with_resolver(resolver(|ctx| Ok(value(posts_json(argument_u64(&ctx, "userId")))))),
            )
            .with_field(
                MetaField::new("user", "User")
                    .with_argument(MetaInputValue::new("id", "Int!"))
                    .with_resolver(resolver(|ctx| {
                        Ok(user_json(argument_u64(&ctx, "id")).map(value).unwrap_or(ConstValue::Null))
                    })),
            )
            .with_field(
                MetaField::new("publicInfo", "String")
                    .with_resolver(resolver(|_| Ok(ConstValue::String("welcome".to_string())))),
            )
            .with_field(
                MetaField::new("auditLog", "[String!]")
                    .with_resolver(resolver(|_| Ok(value(serde_json::json!(["boot", "login"]))))),
            ),
    ));

    registry.insert_type(MetaType::Object(
        ObjectType::new("Mutation").with_field(
            MetaField::new("createPost", "Post!")
                .with_argument(MetaInputValue::new("title", "String!"))
                .with_resolver(resolver(|ctx| {
                    let title = match ctx.argument("title") {
                        Some(ConstValue::String(title)) => title.clone(),
                        _ => String::new(),
                    };
                    Ok(value(serde_json::json!({"id": 99, "title": title, "secretNotes": null})))
                })),
        ),
    ));
    registry.mutation_type = Some("Mutation".to_string());

    registry
}
