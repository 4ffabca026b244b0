use std::sync::{Arc, Mutex};

use async_graphql_parser::parse_query;
use async_graphql_value::{ConstValue, Name};
use engine_auth::{
    AuthConfig, AuthorizationInterceptor, ConfigurationError, Guard, GuardRegistry, GuardRegistryBuilder, MaskPlanner,
};
use engine_error::{ErrorCode, GraphqlError};
use indexmap::IndexMap;

use crate::{
    execution::{execute_operation, ExecutionContext, FieldError},
    operation::{bind_operation, location},
    registry::{MetaInputValue, MetaType, Registry, SchemaView},
    request::Request,
    response::Response,
};

/// An executable schema: the type registry plus the authorization wiring
/// built from its guard and mask annotations. Cheap to clone, immutable,
/// shared across concurrent requests.
#[derive(Clone)]
pub struct Schema(Arc<SchemaInner>);

struct SchemaInner {
    registry: Registry,
    interceptor: AuthorizationInterceptor,
    planner: MaskPlanner,
}

impl Schema {
    pub fn build(registry: Registry) -> SchemaBuilder {
        SchemaBuilder {
            registry,
            auth: AuthConfig::default(),
            guards: Vec::new(),
            masks: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.0.registry
    }

    pub async fn execute(&self, request: Request) -> Response {
        let Request {
            query,
            operation_name,
            variables,
            context,
        } = request;

        let document = match parse_query(&query) {
            Ok(document) => document,
            Err(error) => {
                let mut graphql_error = GraphqlError::new(error.to_string(), ErrorCode::OperationParsingError);
                for pos in error.positions() {
                    graphql_error = graphql_error.with_location(location(pos));
                }
                return Response::from_errors(vec![graphql_error]);
            }
        };

        // The visibility plan is computed before validation so that hidden
        // elements fail binding exactly like undefined ones.
        let plan = if self.0.planner.is_noop() {
            None
        } else {
            Some(self.0.planner.plan(&context).await)
        };
        let view = SchemaView::new(&self.0.registry, plan.as_ref());

        let operation = match bind_operation(view, &document, operation_name.as_deref(), &variables) {
            Ok(operation) => operation,
            Err(error) => return Response::from_errors(vec![error.into()]),
        };

        let errors = Mutex::new(Vec::new());
        let ctx = ExecutionContext {
            view,
            interceptor: &self.0.interceptor,
            request: &context,
            errors: &errors,
            introspection_enabled: !self.0.registry.disable_introspection,
        };
        match execute_operation(ctx, &operation).await {
            Ok(data) => Response {
                data: Some(data),
                errors: errors.into_inner().expect("error sink poisoned"),
            },
            Err(FieldError::Propagate(error)) => {
                // Null propagation reached the operation root.
                let mut errors = errors.into_inner().expect("error sink poisoned");
                errors.push(error);
                Response {
                    data: Some(ConstValue::Null),
                    errors,
                }
            }
            // A fatal denial is the sole outcome of the request, whatever
            // else had already resolved.
            Err(FieldError::Abort(error)) => Response::from_errors(vec![error]),
        }
    }
}

/// Builds a [`Schema`]: walks every type, field and argument definition,
/// records their guard/mask annotations into the guard registry, resolves
/// policy references, and validates name-keyed attachments. All of this
/// fails here, at build time, never during a request.
pub struct SchemaBuilder {
    registry: Registry,
    auth: AuthConfig,
    guards: Vec<(String, Guard)>,
    masks: Vec<(String, Guard)>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Attach a guard by target name: `"Type"`, `"Type.field"` or
    /// `"Type.field.argument"`. Unknown targets fail the build.
    #[must_use]
    pub fn guard(mut self, target: impl Into<String>, guard: Guard) -> Self {
        self.guards.push((target.into(), guard));
        self
    }

    /// Attach a mask by target name: `"Type.field"` or
    /// `"Type.field.argument"`.
    #[must_use]
    pub fn mask(mut self, target: impl Into<String>, mask: Guard) -> Self {
        self.masks.push((target.into(), mask));
        self
    }

    #[must_use]
    pub fn disable_introspection(mut self) -> Self {
        self.registry.disable_introspection = true;
        self
    }

    pub fn finish(self) -> Result<Schema, ConfigurationError> {
        let mut builder = GuardRegistry::builder().with_policy_locator(self.auth.policy_locator.clone());

        for ty in self.registry.types.values() {
            let MetaType::Object(object) = ty else { continue };
            if let Some(guard) = &object.guard {
                builder.type_guard(object.name.as_str(), guard.clone());
            }
            for field in object.fields.values() {
                if let Some(guard) = &field.guard {
                    builder.field_guard(object.name.as_str(), field.name.as_str(), guard.clone());
                }
                if let Some(mask) = &field.mask {
                    builder.field_mask(object.name.as_str(), field.name.as_str(), mask.clone());
                }
                for argument in field.args.values() {
                    if let Some(guard) = &argument.guard {
                        builder.argument_guard(
                            object.name.as_str(),
                            field.name.as_str(),
                            argument.name.as_str(),
                            guard.clone(),
                        );
                    }
                    if let Some(mask) = &argument.mask {
                        builder.argument_mask(
                            object.name.as_str(),
                            field.name.as_str(),
                            argument.name.as_str(),
                            mask.clone(),
                            static_arguments(argument),
                        );
                    }
                }
            }
        }

        for (target, guard) in &self.guards {
            attach(&mut builder, &self.registry, target, guard.clone(), Attachment::Guard)?;
        }
        for (target, mask) in &self.masks {
            attach(&mut builder, &self.registry, target, mask.clone(), Attachment::Mask)?;
        }

        let guards = Arc::new(builder.build()?);
        tracing::debug!(
            "schema built, guards: {}, masks: {}",
            guards.has_guards(),
            guards.has_masks(),
        );

        let interceptor = AuthorizationInterceptor::new(Arc::clone(&guards), self.auth.failure_mode);
        let planner = MaskPlanner::new(guards);
        Ok(Schema(Arc::new(SchemaInner {
            registry: self.registry,
            interceptor,
            planner,
        })))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Attachment {
    Guard,
    Mask,
}

fn attach(
    builder: &mut GuardRegistryBuilder,
    registry: &Registry,
    target: &str,
    guard: Guard,
    attachment: Attachment,
) -> Result<(), ConfigurationError> {
    let unknown = || ConfigurationError::UnknownGuardTarget {
        target: target.to_string(),
    };
    let mut parts = target.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(type_name), None, None, None) => {
            if attachment == Attachment::Mask || registry.object(type_name).is_none() {
                return Err(unknown());
            }
            builder.type_guard(type_name, guard);
        }
        (Some(type_name), Some(field_name), None, None) => {
            if registry.field(type_name, field_name).is_none() {
                return Err(unknown());
            }
            match attachment {
                Attachment::Guard => builder.field_guard(type_name, field_name, guard),
                Attachment::Mask => builder.field_mask(type_name, field_name, guard),
            };
        }
        (Some(type_name), Some(field_name), Some(argument_name), None) => {
            let argument = registry
                .field(type_name, field_name)
                .and_then(|field| field.args.get(argument_name))
                .ok_or_else(unknown)?;
            match attachment {
                Attachment::Guard => builder.argument_guard(type_name, field_name, argument_name, guard),
                Attachment::Mask => {
                    builder.argument_mask(type_name, field_name, argument_name, guard, static_arguments(argument))
                }
            };
        }
        _ => return Err(unknown()),
    }
    Ok(())
}

/// What a mask predicate may know about an argument before any query ran:
/// its declared default, nothing else.
fn static_arguments(argument: &MetaInputValue) -> IndexMap<Name, ConstValue> {
    argument
        .default_value
        .as_ref()
        .map(|default| IndexMap::from_iter([(Name::new(&argument.name), default.clone())]))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use engine_auth::Guard;

    use super::*;
    use crate::registry::{MetaField, MetaType, ObjectType, Resolver};

    fn tiny_registry() -> Registry {
        let mut registry = Registry::new();
        registry.insert_type(MetaType::Object(
            ObjectType::new("Query").with_field(
                MetaField::new("greeting", "String")
                    .with_resolver(Resolver::custom(|_| {
                        Box::pin(async { Ok(ConstValue::String("hello".to_string())) })
                    }))
                    .with_guard(Guard::new(|ctx| ctx.request.get("role") == Some("admin"))),
            ),
        ));
        registry
    }

    #[tokio::test]
    async fn annotation_guards_are_collected_at_build_time() {
        let schema = Schema::build(tiny_registry()).finish().unwrap();

        let mut context = engine_auth::RequestContext::default();
        context.insert("role", "admin");
        let response = schema
            .execute(Request::new("query { greeting }").with_context(context))
            .await;
        assert!(response.is_success());

        let response = schema.execute(Request::new("query { greeting }")).await;
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].message, "Not authorized to access: Query.greeting");
        assert!(response.data.is_none());
    }

    #[test]
    fn double_attachment_on_one_field_is_rejected() {
        let result = Schema::build(tiny_registry())
            .guard("Query.greeting", Guard::new(|_| true))
            .finish();
        assert!(matches!(
            result.err(),
            Some(ConfigurationError::DuplicateGuard { target }) if target == "Query.greeting"
        ));
    }

    #[test]
    fn masks_attach_to_known_targets_only() {
        let result = Schema::build(tiny_registry())
            .mask("Query.missing", Guard::new(|_| true))
            .finish();
        assert!(matches!(
            result.err(),
            Some(ConfigurationError::UnknownGuardTarget { target }) if target == "Query.missing"
        ));
    }
}
