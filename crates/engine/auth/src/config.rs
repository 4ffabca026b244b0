use std::sync::Arc;

use crate::policy::PolicyLocator;

/// What happens when a guard denies access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Abort the whole execution; no partial data is returned.
    #[default]
    Abort,
    /// Null the field out, record a response error and keep resolving
    /// unrelated fields.
    CollectErrors,
}

/// Immutable authorization configuration, built once at schema build time
/// and shared by reference with every request.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub failure_mode: FailureMode,
    pub policy_locator: Option<Arc<dyn PolicyLocator>>,
}

impl AuthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_mode = failure_mode;
        self
    }

    #[must_use]
    pub fn with_policy_locator(mut self, locator: impl PolicyLocator + 'static) -> Self {
        self.policy_locator = Some(Arc::new(locator));
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("failure_mode", &self.failure_mode)
            .field("policy_locator", &self.policy_locator.is_some())
            .finish()
    }
}
