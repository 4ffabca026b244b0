/// Misconfiguration detected while the guard registry is built. These never
/// surface at request time; a schema that builds is a schema whose guards
/// all resolve.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no policy could be located for type `{type_name}`")]
    UnresolvedPolicy { type_name: String },
    #[error("guard attached to unknown schema element `{target}`")]
    UnknownGuardTarget { target: String },
    #[error("more than one guard attached to `{target}`")]
    DuplicateGuard { target: String },
    #[error("mask on `{target}` cannot use policy lookup, masks take inline predicates only")]
    PolicyMask { target: String },
    #[error("`{target}` requests policy lookup but no policy locator is configured")]
    MissingPolicyLocator { target: String },
}
