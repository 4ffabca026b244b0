use engine_auth::VisibilityPlan;

use super::{MetaField, MetaInputValue, MetaType, ObjectType, Registry};

/// The schema as one request sees it.
///
/// Binding, execution and introspection all go through this view, so an
/// element hidden by the request's [`VisibilityPlan`] behaves everywhere as
/// if it had never been defined.
#[derive(Clone, Copy)]
pub struct SchemaView<'a> {
    registry: &'a Registry,
    visibility: Option<&'a VisibilityPlan>,
}

impl<'a> SchemaView<'a> {
    pub fn new(registry: &'a Registry, visibility: Option<&'a VisibilityPlan>) -> Self {
        SchemaView { registry, visibility }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn type_named(&self, name: &str) -> Option<&'a MetaType> {
        self.registry.type_named(name)
    }

    pub fn object(&self, name: &str) -> Option<&'a ObjectType> {
        self.registry.object(name)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&'a MetaField> {
        if let Some(visibility) = self.visibility {
            if !visibility.is_field_visible(type_name, field_name) {
                return None;
            }
        }
        self.registry.field(type_name, field_name)
    }

    pub fn argument(&self, type_name: &str, field_name: &str, argument_name: &str) -> Option<&'a MetaInputValue> {
        if let Some(visibility) = self.visibility {
            if !visibility.is_argument_visible(type_name, field_name, argument_name) {
                return None;
            }
        }
        self.field(type_name, field_name)?.args.get(argument_name)
    }

    /// Visible fields of an object, in definition order.
    pub fn fields(&self, object: &'a ObjectType) -> impl Iterator<Item = &'a MetaField> + '_ {
        let type_name = object.name.as_str();
        object
            .fields
            .values()
            .filter(move |field| self.field(type_name, &field.name).is_some())
    }

    /// Visible arguments of a field, in definition order.
    pub fn arguments(&self, type_name: &'a str, field: &'a MetaField) -> impl Iterator<Item = &'a MetaInputValue> + '_ {
        field
            .args
            .values()
            .filter(move |argument| self.argument(type_name, &field.name, &argument.name).is_some())
    }
}
