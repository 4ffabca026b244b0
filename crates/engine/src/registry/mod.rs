mod resolvers;
mod type_names;
mod view;

pub use resolvers::{Resolver, ResolverContext};
pub use type_names::MetaFieldType;
pub use view::SchemaView;

use async_graphql_value::ConstValue;
use engine_auth::Guard;
use indexmap::IndexMap;

/// All type definitions of a schema, keyed by name. Built once by the
/// schema author, never mutated during request handling.
#[derive(Debug, Default)]
pub struct Registry {
    pub types: IndexMap<String, MetaType>,
    pub query_type: String,
    pub mutation_type: Option<String>,
    pub disable_introspection: bool,
}

impl Registry {
    pub fn new() -> Self {
        let mut registry = Registry {
            query_type: "Query".to_string(),
            ..Default::default()
        };
        for name in ["String", "Int", "Float", "Boolean", "ID"] {
            registry.insert_type(MetaType::Scalar(ScalarType::new(name)));
        }
        registry
    }

    pub fn insert_type(&mut self, ty: MetaType) -> &mut Self {
        self.types.insert(ty.name().to_string(), ty);
        self
    }

    pub fn type_named(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        match self.types.get(name)? {
            MetaType::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&MetaField> {
        self.object(type_name)?.fields.get(field_name)
    }
}

#[derive(Debug)]
pub enum MetaType {
    Object(ObjectType),
    Scalar(ScalarType),
    Enum(EnumType),
}

impl MetaType {
    pub fn name(&self) -> &str {
        match self {
            MetaType::Object(object) => &object.name,
            MetaType::Scalar(scalar) => &scalar.name,
            MetaType::Enum(enum_type) => &enum_type.name,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, MetaType::Object(_))
    }
}

#[derive(Debug)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, MetaField>,
    /// Type-level guard, applied to fields *returning* this type that carry
    /// no field-level guard of their own.
    pub guard: Option<Guard>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        ObjectType {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            guard: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: MetaField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    #[must_use]
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }
}

#[derive(Debug)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
}

impl ScalarType {
    pub fn new(name: impl Into<String>) -> Self {
        ScalarType {
            name: name.into(),
            description: None,
        }
    }
}

#[derive(Debug)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        EnumType {
            name: name.into(),
            description: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug)]
pub struct MetaField {
    pub name: String,
    pub description: Option<String>,
    pub args: IndexMap<String, MetaInputValue>,
    pub ty: MetaFieldType,
    pub resolver: Resolver,
    /// Runtime gate: evaluated by the interceptor right before `resolver`.
    pub guard: Option<Guard>,
    /// Visibility predicate: a falsy outcome removes the field from the
    /// schema surface for the request.
    pub mask: Option<Guard>,
}

impl MetaField {
    pub fn new(name: impl Into<String>, ty: impl Into<MetaFieldType>) -> MetaField {
        MetaField {
            name: name.into(),
            description: None,
            args: IndexMap::new(),
            ty: ty.into(),
            resolver: Resolver::default(),
            guard: None,
            mask: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_argument(mut self, argument: MetaInputValue) -> Self {
        self.args.insert(argument.name.clone(), argument);
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    #[must_use]
    pub fn with_mask(mut self, mask: Guard) -> Self {
        self.mask = Some(mask);
        self
    }
}

#[derive(Debug)]
pub struct MetaInputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: MetaFieldType,
    pub default_value: Option<ConstValue>,
    pub guard: Option<Guard>,
    pub mask: Option<Guard>,
}

impl MetaInputValue {
    pub fn new(name: impl Into<String>, ty: impl Into<MetaFieldType>) -> MetaInputValue {
        MetaInputValue {
            name: name.into(),
            description: None,
            ty: ty.into(),
            default_value: None,
            guard: None,
            mask: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default_value: ConstValue) -> Self {
        self.default_value = Some(default_value);
        self
    }

    #[must_use]
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    #[must_use]
    pub fn with_mask(mut self, mask: Guard) -> Self {
        self.mask = Some(mask);
        self
    }
}
