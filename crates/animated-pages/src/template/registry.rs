//! Template registry with memoized resolution

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::{Template, TemplateOptions};
use crate::error::{PagesError, PagesResult};

/// A template together with the options read when it was first resolved
pub struct ResolvedTemplate {
    pub name: String,
    pub template: Rc<dyn Template>,
    pub options: TemplateOptions,
}

impl fmt::Debug for ResolvedTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedTemplate")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Templates by name
#[derive(Default)]
pub struct TemplateSet {
    templates: HashMap<String, Rc<dyn Template>>,
    resolved: HashMap<String, Rc<ResolvedTemplate>>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any template with the same name
    ///
    /// Pages already created from the old template keep using it.
    pub fn register(&mut self, name: impl Into<String>, template: impl Template + 'static) {
        let name = name.into();
        debug!(template = %name, "registering template");
        self.resolved.remove(&name);
        self.templates.insert(name, Rc::new(template));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve a template, reading its options once
    pub fn resolve(&mut self, name: &str) -> PagesResult<Rc<ResolvedTemplate>> {
        if let Some(resolved) = self.resolved.get(name) {
            return Ok(Rc::clone(resolved));
        }

        let template = self
            .templates
            .get(name)
            .cloned()
            .ok_or_else(|| PagesError::UnknownTemplate(name.to_string()))?;

        let resolved = Rc::new(ResolvedTemplate {
            name: name.to_string(),
            options: template.options(),
            template,
        });
        self.resolved.insert(name.to_string(), Rc::clone(&resolved));
        Ok(resolved)
    }
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSet")
            .field("templates", &self.names())
            .finish()
    }
}
