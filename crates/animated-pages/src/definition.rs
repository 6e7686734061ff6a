//! Page definitions
//!
//! A selection request names a template and optionally an id, a restamp
//! override and data for the page variable. Plain strings are shorthand for
//! `{ "templateName": <string> }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PagesError, PagesResult};

/// A page definition in object form
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub template_name: String,
    /// Defaults to the template name
    pub id: Option<String>,
    /// Defaults to the switcher's `restamp` setting
    pub restamp: Option<bool>,
    /// Value of the page variable
    pub data: Value,
}

impl PageSpec {
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_restamp(mut self, restamp: bool) -> Self {
        self.restamp = Some(restamp);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// What to select
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", untagged)]
pub enum PageDefinition {
    /// A template name; the id is the template name as well
    Name(String),
    Spec(PageSpec),
}

impl From<&str> for PageDefinition {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PageDefinition {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<PageSpec> for PageDefinition {
    fn from(spec: PageSpec) -> Self {
        Self::Spec(spec)
    }
}

impl TryFrom<Value> for PageDefinition {
    type Error = PagesError;

    fn try_from(value: Value) -> PagesResult<Self> {
        Self::from_json(&value)
    }
}

impl PageDefinition {
    /// Parse a definition from JSON
    ///
    /// A non-boolean `restamp` is ignored; a missing or empty `id` falls back
    /// to the template name.
    pub fn from_json(value: &Value) -> PagesResult<Self> {
        match value {
            Value::String(name) => Ok(Self::Name(name.clone())),
            Value::Object(obj) => {
                let template_name = match obj.get("templateName") {
                    Some(Value::String(name)) if !name.is_empty() => name.clone(),
                    _ => {
                        return Err(PagesError::invalid_definition(
                            "`templateName` must be a non-empty string",
                        ))
                    }
                };
                let id = match obj.get("id") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(id)) if id.is_empty() => None,
                    Some(Value::String(id)) => Some(id.clone()),
                    Some(_) => {
                        return Err(PagesError::invalid_definition(
                            "`id` must be a string or undefined",
                        ))
                    }
                };
                Ok(Self::Spec(PageSpec {
                    template_name,
                    id,
                    restamp: obj.get("restamp").and_then(Value::as_bool),
                    data: obj.get("data").cloned().unwrap_or(Value::Null),
                }))
            }
            _ => Err(PagesError::invalid_definition(
                "page definition must be a string or an object",
            )),
        }
    }

    /// Fill in defaults and validate
    pub(crate) fn normalize(self, default_restamp: bool) -> PagesResult<NormalizedDefinition> {
        let spec = match self {
            Self::Name(name) => PageSpec::new(name),
            Self::Spec(spec) => spec,
        };
        if spec.template_name.is_empty() {
            return Err(PagesError::invalid_definition(
                "`templateName` must be a non-empty string",
            ));
        }
        let id = match spec.id {
            Some(id) if !id.is_empty() => id,
            _ => spec.template_name.clone(),
        };
        Ok(NormalizedDefinition {
            id,
            restamp: spec.restamp.unwrap_or(default_restamp),
            template_name: spec.template_name,
            data: spec.data,
        })
    }
}

/// A definition with every default applied
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NormalizedDefinition {
    pub id: String,
    pub template_name: String,
    pub restamp: bool,
    pub data: Value,
}
