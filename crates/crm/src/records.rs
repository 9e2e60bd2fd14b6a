use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A CRM record payload tagged with its object type, serialized the way the
/// composite create API expects (`attributes.type` plus flat fields).
#[derive(Clone, Debug, Serialize)]
pub struct SObject {
    attributes: Attributes,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize)]
struct Attributes {
    #[serde(rename = "type")]
    object_type: String,
}

impl SObject {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self { attributes: Attributes { object_type: object_type.into() }, fields: Map::new() }
    }

    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn object_type(&self) -> &str {
        &self.attributes.object_type
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Rows returned by a SOQL query.
#[derive(Clone, Debug, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "totalSize")]
    pub total_size: i64,
    pub done: bool,
    #[serde(default)]
    pub records: Vec<Value>,
}

/// Outcome for one record of a bulk create, in submission order.
#[derive(Clone, Debug, Deserialize)]
pub struct SaveResult {
    #[serde(default)]
    pub id: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<SaveError>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SaveError {
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl SaveResult {
    /// Message of the first reported error, used when a batch is failed on
    /// its first rejected record.
    pub fn first_error_message(&self) -> String {
        self.errors
            .first()
            .map(|error| error.message.clone())
            .unwrap_or_else(|| "crm reported a failure without detail".to_string())
    }
}
