//! Values handed to templates.

use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Block data key the export payload is stored under.
pub const VIEW_MODEL_KEY: &str = "view_model";

/// The caller's export payload, passed to the content block as one object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewModel(Map<String, Value>);

impl ViewModel {
    pub fn new(data: Map<String, Value>) -> Self {
        Self(data)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for ViewModel {
    fn from(data: Map<String, Value>) -> Self {
        Self(data)
    }
}

/// Fragments the page template is evaluated with.
///
/// Every field is already rendered markup and is emitted verbatim by the
/// page template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewVariables {
    pub head_content: String,
    pub html_attributes: String,
    pub head_attributes: String,
    pub body_attributes: String,
    pub layout_content: String,
}

impl ViewVariables {
    pub fn to_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}
