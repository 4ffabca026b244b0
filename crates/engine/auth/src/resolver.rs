use crate::{guard::Guard, registry::GuardRegistry};

/// Determines which predicate applies to a field-access event.
///
/// Precedence: a field-level guard wins outright; otherwise the type-level
/// guard on the field's declared return type applies; otherwise access is
/// unguarded. The two are never combined, so a field-level guard means the
/// type-level predicate is not evaluated at all for that field.
pub struct GuardResolver<'r> {
    registry: &'r GuardRegistry,
}

impl<'r> GuardResolver<'r> {
    pub(crate) fn new(registry: &'r GuardRegistry) -> Self {
        GuardResolver { registry }
    }

    pub fn field_guard(&self, parent_type: &str, field_name: &str, return_type: &str) -> Option<&'r Guard> {
        self.registry
            .field_guard(parent_type, field_name)
            .or_else(|| self.registry.type_guard(return_type))
    }

    /// Argument guards are independent of the field guard and evaluated
    /// before it, in registration order.
    pub fn argument_guards(&self, parent_type: &str, field_name: &str) -> impl Iterator<Item = (&'r str, &'r Guard)> {
        self.registry
            .argument_guards(parent_type, field_name)
            .iter()
            .map(|(name, guard)| (name.as_str(), guard))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use async_graphql_value::ConstValue;
    use indexmap::IndexMap;

    use super::*;
    use crate::{GuardContext, RequestContext};

    fn counting_guard(counter: &Arc<AtomicUsize>, verdict: bool) -> Guard {
        let counter = Arc::clone(counter);
        Guard::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            verdict
        })
    }

    #[tokio::test]
    async fn field_guard_shadows_type_guard() {
        let field_evaluations = Arc::new(AtomicUsize::new(0));
        let type_evaluations = Arc::new(AtomicUsize::new(0));

        let mut builder = GuardRegistry::builder();
        builder.field_guard("Query", "post", counting_guard(&field_evaluations, true));
        builder.type_guard("Post", counting_guard(&type_evaluations, false));
        let registry = builder.build().unwrap();

        let guard = registry.resolver().field_guard("Query", "post", "Post").unwrap();

        let parent = ConstValue::Null;
        let arguments = IndexMap::new();
        let request = RequestContext::default();
        assert!(
            guard
                .evaluate(GuardContext {
                    parent: &parent,
                    arguments: &arguments,
                    request: &request,
                })
                .await
        );

        assert_eq!(field_evaluations.load(Ordering::SeqCst), 1);
        assert_eq!(type_evaluations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn type_guard_applies_to_the_declared_return_type() {
        let evaluations = Arc::new(AtomicUsize::new(0));
        let mut builder = GuardRegistry::builder();
        builder.type_guard("Post", counting_guard(&evaluations, true));
        let registry = builder.build().unwrap();

        assert!(registry.resolver().field_guard("Query", "post", "Post").is_some());
        assert!(registry.resolver().field_guard("Query", "user", "User").is_none());
    }

    #[test]
    fn unguarded_fields_resolve_to_no_guard() {
        let registry = GuardRegistry::builder().build().unwrap();
        assert!(registry.resolver().field_guard("Query", "posts", "Post").is_none());
        assert_eq!(registry.resolver().argument_guards("Query", "posts").count(), 0);
    }
}
