//! Single-element template

use serde_json::{Map, Value};

use super::{Template, TemplateInstance, TemplateOptions};
use crate::stage::Element;

/// Template stamping a single element
///
/// Properties are written into the element, so `element.property("page")`
/// reflects what the page variable was last synced to.
#[derive(Clone, Debug)]
pub struct ElementTemplate {
    tag: String,
    text: String,
    classes: Vec<String>,
    options: TemplateOptions,
}

impl ElementTemplate {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: String::new(),
            classes: Vec::new(),
            options: TemplateOptions::default(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Discard instances of this template whenever they are hidden
    pub fn restamp(mut self) -> Self {
        self.options.restamp = true;
        self
    }

    pub fn with_options(mut self, options: TemplateOptions) -> Self {
        self.options = options;
        self
    }
}

impl Template for ElementTemplate {
    fn options(&self) -> TemplateOptions {
        self.options.clone()
    }

    fn stamp(&self, props: &Map<String, Value>) -> Box<dyn TemplateInstance> {
        let element = Element::new(self.tag.clone()).with_text(self.text.clone());
        for class in &self.classes {
            element.add_class(class);
        }
        for (name, value) in props {
            element.set_property(name, value.clone());
        }
        Box::new(ElementInstance { element })
    }
}

struct ElementInstance {
    element: Element,
}

impl TemplateInstance for ElementInstance {
    fn roots(&self) -> Vec<Element> {
        vec![self.element.clone()]
    }

    fn set_property(&mut self, path: &str, value: &Value) {
        self.element.set_property(path, value.clone());
    }
}
