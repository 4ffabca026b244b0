use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_graphql_value::ConstValue;
use indexmap::IndexMap;

use crate::{context::RequestContext, guard::GuardContext, registry::GuardRegistry};

/// Which schema elements exist for the current request.
///
/// Computed once before validation and never modified afterwards, so it can
/// be read concurrently while fields resolve. Plans are derived from the
/// request context and must never be reused for another request.
#[derive(Debug, Default)]
pub struct VisibilityPlan {
    hidden_fields: HashMap<String, HashSet<String>>,
    hidden_arguments: HashMap<String, HashMap<String, HashSet<String>>>,
}

impl VisibilityPlan {
    pub fn is_field_visible(&self, type_name: &str, field_name: &str) -> bool {
        !self
            .hidden_fields
            .get(type_name)
            .is_some_and(|fields| fields.contains(field_name))
    }

    pub fn is_argument_visible(&self, type_name: &str, field_name: &str, argument_name: &str) -> bool {
        !self
            .hidden_arguments
            .get(type_name)
            .and_then(|fields| fields.get(field_name))
            .is_some_and(|arguments| arguments.contains(argument_name))
    }

    pub fn hides_anything(&self) -> bool {
        !self.hidden_fields.is_empty() || !self.hidden_arguments.is_empty()
    }

    fn hide_field(&mut self, type_name: &str, field_name: &str) {
        self.hidden_fields
            .entry(type_name.to_string())
            .or_default()
            .insert(field_name.to_string());
    }

    fn hide_argument(&mut self, type_name: &str, field_name: &str, argument_name: &str) {
        self.hidden_arguments
            .entry(type_name.to_string())
            .or_default()
            .entry(field_name.to_string())
            .or_default()
            .insert(argument_name.to_string());
    }
}

/// Pre-execution pass computing the schema surface visible to one request.
///
/// Mask predicates run without a concrete parent object: visibility has to
/// be decidable before any data is fetched, so they only see the request
/// context and statically-known arguments.
pub struct MaskPlanner {
    registry: Arc<GuardRegistry>,
}

impl MaskPlanner {
    pub fn new(registry: Arc<GuardRegistry>) -> Self {
        MaskPlanner { registry }
    }

    /// True when the schema carries no masks at all; callers can then skip
    /// planning entirely and validate against the unmasked schema.
    pub fn is_noop(&self) -> bool {
        !self.registry.has_masks()
    }

    pub async fn plan(&self, request: &RequestContext) -> VisibilityPlan {
        let mut plan = VisibilityPlan::default();
        let placeholder_parent = ConstValue::Null;
        let no_arguments = IndexMap::new();

        for mask in self.registry.field_masks() {
            let visible = mask
                .guard
                .evaluate(GuardContext {
                    parent: &placeholder_parent,
                    arguments: &no_arguments,
                    request,
                })
                .await;
            if !visible {
                tracing::debug!("hiding {}.{} for this request", mask.type_name, mask.field_name);
                plan.hide_field(&mask.type_name, &mask.field_name);
            }
        }

        for mask in self.registry.argument_masks() {
            let visible = mask
                .guard
                .evaluate(GuardContext {
                    parent: &placeholder_parent,
                    arguments: &mask.static_arguments,
                    request,
                })
                .await;
            if !visible {
                tracing::debug!(
                    "hiding argument {}.{}.{} for this request",
                    mask.type_name,
                    mask.field_name,
                    mask.argument_name,
                );
                plan.hide_argument(&mask.type_name, &mask.field_name, &mask.argument_name);
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Guard;

    #[tokio::test]
    async fn plans_are_derived_from_the_request_context() {
        let mut builder = GuardRegistry::builder();
        builder.field_mask(
            "Query",
            "auditLog",
            Guard::new(|ctx| ctx.request.get("role") == Some("admin")),
        );
        let planner = MaskPlanner::new(Arc::new(builder.build().unwrap()));

        let mut admin = RequestContext::default();
        admin.insert("role", "admin");
        let plan = planner.plan(&admin).await;
        assert!(plan.is_field_visible("Query", "auditLog"));
        assert!(!plan.hides_anything());

        let visitor = RequestContext::default();
        let plan = planner.plan(&visitor).await;
        assert!(!plan.is_field_visible("Query", "auditLog"));
        assert!(plan.is_field_visible("Query", "posts"));
    }

    #[tokio::test]
    async fn argument_masks_see_static_defaults() {
        use async_graphql_value::Name;

        let mut static_arguments = IndexMap::new();
        static_arguments.insert(Name::new("limit"), ConstValue::Number(10u64.into()));

        let mut builder = GuardRegistry::builder();
        builder.argument_mask(
            "Query",
            "posts",
            "limit",
            Guard::new(|ctx| matches!(ctx.argument("limit"), Some(ConstValue::Number(n)) if n.as_u64() == Some(10))),
            static_arguments,
        );
        let planner = MaskPlanner::new(Arc::new(builder.build().unwrap()));

        let plan = planner.plan(&RequestContext::default()).await;
        assert!(plan.is_argument_visible("Query", "posts", "limit"));
    }

    #[tokio::test]
    async fn noop_planner_hides_nothing() {
        let planner = MaskPlanner::new(Arc::new(GuardRegistry::builder().build().unwrap()));
        assert!(planner.is_noop());
        let plan = planner.plan(&RequestContext::default()).await;
        assert!(!plan.hides_anything());
    }
}
