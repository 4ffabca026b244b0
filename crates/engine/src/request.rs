use async_graphql_value::{ConstValue, Name};
use engine_auth::RequestContext;
use indexmap::IndexMap;

pub type Variables = IndexMap<Name, ConstValue>;

/// One GraphQL request: the query text, an optional operation name,
/// variables, and the opaque per-request context predicates evaluate
/// against.
pub struct Request {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: Variables,
    pub context: RequestContext,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Request {
            query: query.into(),
            operation_name: None,
            variables: Variables::new(),
            context: RequestContext::default(),
        }
    }

    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    /// Variables from a JSON object, the shape they arrive in over the
    /// wire. Non-object input is ignored.
    #[must_use]
    pub fn with_json_variables(mut self, variables: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = variables {
            for (name, value) in map {
                let value = ConstValue::from_json(value).unwrap_or(ConstValue::Null);
                self.variables.insert(Name::new(name), value);
            }
        }
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Store a typed value in the request context.
    #[must_use]
    pub fn data<T>(mut self, value: T) -> Self
    where
        T: 'static + Send + Sync,
    {
        self.context.typed_insert(value);
        self
    }
}

impl From<&str> for Request {
    fn from(query: &str) -> Self {
        Request::new(query)
    }
}

impl From<String> for Request {
    fn from(query: String) -> Self {
        Request::new(query)
    }
}
