use std::{
    collections::HashMap,
    sync::Arc,
};

use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;

use crate::{
    error::ConfigurationError,
    guard::Guard,
    policy::{Policy, PolicyLocator},
    resolver::GuardResolver,
};

/// Static mapping from schema elements to their guard and mask predicates.
///
/// Built once when the schema is built, read-only afterwards; many requests
/// consult it concurrently. Policy markers are resolved to concrete policy
/// handles during the build, once per type.
#[derive(Debug, Default)]
pub struct GuardRegistry {
    type_guards: HashMap<String, Guard>,
    field_guards: HashMap<String, HashMap<String, Guard>>,
    argument_guards: HashMap<String, HashMap<String, Vec<(String, Guard)>>>,
    field_masks: Vec<FieldMask>,
    argument_masks: Vec<ArgumentMask>,
}

#[derive(Debug)]
pub(crate) struct FieldMask {
    pub type_name: String,
    pub field_name: String,
    pub guard: Guard,
}

#[derive(Debug)]
pub(crate) struct ArgumentMask {
    pub type_name: String,
    pub field_name: String,
    pub argument_name: String,
    pub guard: Guard,
    /// Statically-known arguments a mask predicate may inspect, typically
    /// the argument's declared default value.
    pub static_arguments: IndexMap<Name, ConstValue>,
}

impl GuardRegistry {
    pub fn builder() -> GuardRegistryBuilder {
        GuardRegistryBuilder::default()
    }

    pub fn resolver(&self) -> GuardResolver<'_> {
        GuardResolver::new(self)
    }

    pub fn has_guards(&self) -> bool {
        !self.type_guards.is_empty() || !self.field_guards.is_empty() || !self.argument_guards.is_empty()
    }

    pub fn has_masks(&self) -> bool {
        !self.field_masks.is_empty() || !self.argument_masks.is_empty()
    }

    pub(crate) fn type_guard(&self, type_name: &str) -> Option<&Guard> {
        self.type_guards.get(type_name)
    }

    pub(crate) fn field_guard(&self, type_name: &str, field_name: &str) -> Option<&Guard> {
        self.field_guards.get(type_name)?.get(field_name)
    }

    pub(crate) fn argument_guards(&self, type_name: &str, field_name: &str) -> &[(String, Guard)] {
        self.argument_guards
            .get(type_name)
            .and_then(|fields| fields.get(field_name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn field_masks(&self) -> &[FieldMask] {
        &self.field_masks
    }

    pub(crate) fn argument_masks(&self) -> &[ArgumentMask] {
        &self.argument_masks
    }
}

/// Collects guard and mask attachments while the schema is built, then
/// resolves policy markers and checks the single-guard-per-target invariant.
#[derive(Default)]
pub struct GuardRegistryBuilder {
    policy_locator: Option<Arc<dyn PolicyLocator>>,
    type_guards: Vec<(String, Guard)>,
    field_guards: Vec<(String, String, Guard)>,
    argument_guards: Vec<(String, String, String, Guard)>,
    field_masks: Vec<(String, String, Guard)>,
    argument_masks: Vec<(String, String, String, Guard, IndexMap<Name, ConstValue>)>,
}

impl GuardRegistryBuilder {
    pub fn with_policy_locator(mut self, locator: Option<Arc<dyn PolicyLocator>>) -> Self {
        self.policy_locator = locator;
        self
    }

    pub fn type_guard(&mut self, type_name: impl Into<String>, guard: Guard) -> &mut Self {
        self.type_guards.push((type_name.into(), guard));
        self
    }

    pub fn field_guard(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        guard: Guard,
    ) -> &mut Self {
        self.field_guards.push((type_name.into(), field_name.into(), guard));
        self
    }

    pub fn argument_guard(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        argument_name: impl Into<String>,
        guard: Guard,
    ) -> &mut Self {
        self.argument_guards
            .push((type_name.into(), field_name.into(), argument_name.into(), guard));
        self
    }

    pub fn field_mask(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        mask: Guard,
    ) -> &mut Self {
        self.field_masks.push((type_name.into(), field_name.into(), mask));
        self
    }

    pub fn argument_mask(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        argument_name: impl Into<String>,
        mask: Guard,
        static_arguments: IndexMap<Name, ConstValue>,
    ) -> &mut Self {
        self.argument_masks.push((
            type_name.into(),
            field_name.into(),
            argument_name.into(),
            mask,
            static_arguments,
        ));
        self
    }

    pub fn build(self) -> Result<GuardRegistry, ConfigurationError> {
        let mut policies = PolicyCache {
            locator: self.policy_locator,
            resolved: HashMap::new(),
        };
        let mut registry = GuardRegistry::default();

        for (type_name, guard) in self.type_guards {
            let guard = policies.resolve(guard, &type_name, &type_name)?;
            if registry.type_guards.insert(type_name.clone(), guard).is_some() {
                return Err(ConfigurationError::DuplicateGuard { target: type_name });
            }
        }

        for (type_name, field_name, guard) in self.field_guards {
            let target = format!("{type_name}.{field_name}");
            let guard = policies.resolve(guard, &type_name, &target)?;
            let previous = registry
                .field_guards
                .entry(type_name)
                .or_default()
                .insert(field_name, guard);
            if previous.is_some() {
                return Err(ConfigurationError::DuplicateGuard { target });
            }
        }

        for (type_name, field_name, argument_name, guard) in self.argument_guards {
            let target = format!("{type_name}.{field_name}.{argument_name}");
            let guard = policies.resolve(guard, &type_name, &target)?;
            let arguments = registry
                .argument_guards
                .entry(type_name)
                .or_default()
                .entry(field_name)
                .or_default();
            if arguments.iter().any(|(name, _)| *name == argument_name) {
                return Err(ConfigurationError::DuplicateGuard { target });
            }
            arguments.push((argument_name, guard));
        }

        for (type_name, field_name, guard) in self.field_masks {
            if guard.is_policy_marker() {
                return Err(ConfigurationError::PolicyMask {
                    target: format!("{type_name}.{field_name}"),
                });
            }
            registry.field_masks.push(FieldMask {
                type_name,
                field_name,
                guard,
            });
        }

        for (type_name, field_name, argument_name, guard, static_arguments) in self.argument_masks {
            if guard.is_policy_marker() {
                return Err(ConfigurationError::PolicyMask {
                    target: format!("{type_name}.{field_name}.{argument_name}"),
                });
            }
            registry.argument_masks.push(ArgumentMask {
                type_name,
                field_name,
                argument_name,
                guard,
                static_arguments,
            });
        }

        Ok(registry)
    }
}

struct PolicyCache {
    locator: Option<Arc<dyn PolicyLocator>>,
    resolved: HashMap<String, Arc<dyn Policy>>,
}

impl PolicyCache {
    /// Replaces a policy marker with the concrete handle for `type_name`.
    /// Inline guards pass through untouched.
    fn resolve(&mut self, guard: Guard, type_name: &str, target: &str) -> Result<Guard, ConfigurationError> {
        if !guard.is_policy_marker() {
            return Ok(guard);
        }
        let Some(locator) = &self.locator else {
            return Err(ConfigurationError::MissingPolicyLocator {
                target: target.to_string(),
            });
        };
        if let Some(policy) = self.resolved.get(type_name) {
            return Ok(Guard::resolved(Arc::clone(policy)));
        }
        let policy = locator
            .locate(type_name)
            .ok_or_else(|| ConfigurationError::UnresolvedPolicy {
                type_name: type_name.to_string(),
            })?;
        self.resolved.insert(type_name.to_string(), Arc::clone(&policy));
        Ok(Guard::resolved(policy))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::future::BoxFuture;

    use super::*;
    use crate::guard::GuardContext;

    struct AllowAll;

    impl Policy for AllowAll {
        fn authorize<'a>(&'a self, _ctx: &'a GuardContext<'a>) -> BoxFuture<'a, bool> {
            Box::pin(async { true })
        }
    }

    #[test]
    fn duplicate_field_guard_is_rejected() {
        let mut builder = GuardRegistry::builder();
        builder.field_guard("Query", "posts", Guard::new(|_| true));
        builder.field_guard("Query", "posts", Guard::new(|_| false));
        let err = builder.build().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::DuplicateGuard { target } if target == "Query.posts"
        ));
    }

    #[test]
    fn policies_are_located_once_per_type() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let locator = move |_: &str| {
            counted.fetch_add(1, Ordering::SeqCst);
            Some(Arc::new(AllowAll) as Arc<dyn Policy>)
        };

        let mut builder = GuardRegistry::builder().with_policy_locator(Some(Arc::new(locator)));
        builder.field_guard("Post", "title", Guard::policy());
        builder.field_guard("Post", "body", Guard::policy());
        builder.build().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unresolved_policy_fails_the_build() {
        let locator = |_: &str| -> Option<Arc<dyn Policy>> { None };
        let mut builder = GuardRegistry::builder().with_policy_locator(Some(Arc::new(locator)));
        builder.type_guard("Post", Guard::policy());
        let err = builder.build().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnresolvedPolicy { type_name } if type_name == "Post"
        ));
    }

    #[test]
    fn policy_marker_without_locator_fails_the_build() {
        let mut builder = GuardRegistry::builder();
        builder.field_guard("Query", "posts", Guard::policy());
        let err = builder.build().unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingPolicyLocator { .. }));
    }

    #[test]
    fn masks_reject_policy_markers() {
        let mut builder = GuardRegistry::builder();
        builder.field_mask("Query", "posts", Guard::policy());
        let err = builder.build().unwrap_err();
        assert!(matches!(err, ConfigurationError::PolicyMask { .. }));
    }
}
