use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

/// Opaque per-request data handed to every predicate evaluation, typically
/// carrying the authenticated principal.
///
/// Values can be stored by type or by name. The context is populated before
/// execution starts and is read-only afterwards, so it can be shared across
/// concurrently resolving fields without synchronization.
#[derive(Default)]
pub struct RequestContext {
    by_type: HashMap<TypeId, Box<dyn Any + Sync + Send>>,
    by_name: HashMap<String, String>,
}

impl RequestContext {
    pub fn typed_get<T>(&self) -> Option<&T>
    where
        T: 'static + Send + Sync,
    {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    pub fn typed_insert<T>(&mut self, value: T)
    where
        T: 'static + Send + Sync,
    {
        self.by_type.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.by_name.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn with<T>(mut self, value: T) -> Self
    where
        T: 'static + Send + Sync,
    {
        self.typed_insert(value);
        self
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("by_type", &self.by_type.len())
            .field("by_name", &self.by_name)
            .finish()
    }
}
