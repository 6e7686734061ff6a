//! Templates - named view factories
//!
//! A template stamps a fresh instance on demand. The page owning the
//! instance pushes its page variable into it through
//! [`TemplateInstance::set_property`].

mod element_template;
mod registry;

pub use element_template::ElementTemplate;
pub use registry::{ResolvedTemplate, TemplateSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::stage::Element;

/// Default name of the page variable inside a template instance
pub const DEFAULT_PAGE_AS: &str = "page";

/// Per-template options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateOptions {
    /// Discard the instance whenever a page using this template is hidden
    pub restamp: bool,
    /// Name of the instance property the page variable is bound to
    pub page_as: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            restamp: false,
            page_as: DEFAULT_PAGE_AS.to_string(),
        }
    }
}

/// A view factory
pub trait Template {
    /// Options applied to every page created from this template
    fn options(&self) -> TemplateOptions {
        TemplateOptions::default()
    }

    /// Create a new instance with the given initial properties
    fn stamp(&self, props: &Map<String, Value>) -> Box<dyn TemplateInstance>;
}

/// A stamped template
pub trait TemplateInstance {
    /// Top-level elements produced by the template
    fn roots(&self) -> Vec<Element>;

    /// Set a pending property (or dotted sub path)
    fn set_property(&mut self, path: &str, value: &Value);

    /// Apply pending property changes
    fn flush(&mut self) {}

    /// Called once when the page discards the instance
    fn destroy(&mut self) {}
}
