use async_graphql_value::ConstValue;
use engine_error::GraphqlError;

/// The standard response shape. `data` is omitted entirely when the request
/// failed before or during execution without producing any data, and is
/// JSON `null` when error propagation reached the operation root.
#[derive(Debug, serde::Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ConstValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl Response {
    pub(crate) fn from_errors(errors: Vec<GraphqlError>) -> Self {
        Response { data: None, errors }
    }

    /// True when the response carries no errors at all.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
