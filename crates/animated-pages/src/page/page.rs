//! Page state and page-variable syncing

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::{trace, warn};

use super::PageHandle;
use crate::path;
use crate::stage::{Element, Stage};
use crate::template::{ResolvedTemplate, TemplateInstance};

/// A single page
///
/// Invariants:
/// - `element` is `None` until the page has been stamped, and again after
///   the instance is discarded
/// - an inserted page always has an element
/// - a restamping page that is not inserted has no element
pub struct Page {
    handle: PageHandle,
    id: Option<String>,
    template: Rc<ResolvedTemplate>,
    page_var_name: String,
    restamp: bool,
    visible: bool,
    inserted: bool,
    page_var: Value,
    /// Root page-variable change not yet pushed into the instance
    page_var_unsynced: bool,
    instance: Option<Box<dyn TemplateInstance>>,
    element: Option<Element>,
}

impl Page {
    pub(crate) fn new(handle: PageHandle, template: Rc<ResolvedTemplate>) -> Self {
        Self {
            handle,
            id: None,
            page_var_name: template.options.page_as.clone(),
            restamp: template.options.restamp,
            template,
            visible: true,
            inserted: false,
            page_var: Value::Null,
            page_var_unsynced: false,
            instance: None,
            element: None,
        }
    }

    #[inline]
    pub fn handle(&self) -> PageHandle {
        self.handle
    }

    /// Application-level id the page is registered under, if any
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub(crate) fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub fn template_name(&self) -> &str {
        &self.template.name
    }

    /// Whether the template was declared with `restamp`
    pub fn template_restamp(&self) -> bool {
        self.template.options.restamp
    }

    pub fn page_var_name(&self) -> &str {
        &self.page_var_name
    }

    /// The page's element, once stamped
    pub fn element(&self) -> Option<&Element> {
        self.element.as_ref()
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn is_inserted(&self) -> bool {
        self.inserted
    }

    #[inline]
    pub fn restamp(&self) -> bool {
        self.restamp
    }

    pub fn page_var(&self) -> &Value {
        &self.page_var
    }

    pub fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    #[inline]
    fn should_sync(&self) -> bool {
        self.visible && self.inserted
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Insert at the end if not inserted, then make visible
    pub fn show(&mut self, stage: &mut Stage) {
        if !self.inserted {
            self.insert_before(stage, None);
        }
        self.set_visible(true);
    }

    /// Detach when restamping, otherwise just hide the element
    pub fn hide(&mut self, stage: &mut Stage) {
        if self.restamp {
            self.detach(stage, false);
        } else {
            self.set_visible(false);
        }
    }

    /// Insert the element before `reference`, stamping it if necessary
    ///
    /// `None` appends. An inserted page is moved.
    pub fn insert_before(&mut self, stage: &mut Stage, reference: Option<&Element>) {
        self.sync_unsynced();
        let element = self.ensure_instance();
        stage.insert_before(&element, reference);
        self.inserted = true;
    }

    /// Remove the element from the stage
    ///
    /// The instance is discarded when `force_discard` or `restamp` is set.
    pub fn detach(&mut self, stage: &mut Stage, force_discard: bool) {
        if !self.inserted {
            return;
        }
        self.inserted = false;
        if let Some(element) = &self.element {
            stage.remove(element);
        }
        if force_discard || self.restamp {
            self.discard_instance();
        }
    }

    /// Toggle visibility; becoming visible flushes deferred changes
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if let Some(element) = &self.element {
            element.set_hidden(!visible);
        }
        if visible {
            self.sync_unsynced();
        }
    }

    /// Switching restamp on for a page that is not inserted discards its instance
    pub fn set_restamp(&mut self, restamp: bool) {
        if self.restamp == restamp {
            return;
        }
        self.restamp = restamp;
        if !self.inserted && restamp {
            self.discard_instance();
        }
    }

    // =========================================================================
    // Page variable
    // =========================================================================

    /// Replace the page variable
    ///
    /// Propagates immediately while visible and inserted, otherwise the change
    /// is deferred until the page is shown again.
    pub fn set_page_var(&mut self, value: Value) {
        self.page_var = value;
        if self.should_sync() {
            if let Some(instance) = self.instance.as_mut() {
                instance.set_property(&self.page_var_name, &self.page_var);
                instance.flush();
            }
        } else {
            self.page_var_unsynced = true;
        }
    }

    /// Forward a change of the page variable or one of its sub paths
    ///
    /// Root changes are deferred while the page is hidden. Deep changes are
    /// pushed right away whenever an instance exists, after any deferred root
    /// change.
    pub fn forward_page_var_change(&mut self, subpath: Option<&str>, value: Value) {
        let full_path = path::join(&self.page_var_name, subpath);
        let deep = path::is_deep(&full_path);

        if self.should_sync() {
            self.record_page_var(subpath, deep, &value);
            if let Some(instance) = self.instance.as_mut() {
                instance.set_property(&full_path, &value);
                instance.flush();
            }
        } else if self.instance.is_some() {
            self.record_page_var(subpath, deep, &value);
            if !deep {
                self.page_var_unsynced = true;
                return;
            }
            let unsynced = std::mem::take(&mut self.page_var_unsynced);
            if let Some(instance) = self.instance.as_mut() {
                if unsynced {
                    instance.set_property(&self.page_var_name, &self.page_var);
                    instance.flush();
                }
                instance.set_property(&full_path, &value);
                instance.flush();
            }
        }
    }

    fn record_page_var(&mut self, subpath: Option<&str>, deep: bool, value: &Value) {
        match subpath {
            Some(subpath) if deep => {
                if let Value::Object(map) = &mut self.page_var {
                    path::set(map, subpath, value.clone());
                }
            }
            _ => self.page_var = value.clone(),
        }
    }

    // =========================================================================
    // Template instance
    // =========================================================================

    fn sync_unsynced(&mut self) {
        let Some(instance) = self.instance.as_mut() else {
            return;
        };
        if self.page_var_unsynced {
            trace!(page = %self.handle, "flushing deferred page variable");
            instance.set_property(&self.page_var_name, &self.page_var);
            self.page_var_unsynced = false;
        }
        instance.flush();
    }

    fn ensure_instance(&mut self) -> Element {
        if let Some(element) = &self.element {
            return element.clone();
        }

        let mut props = Map::new();
        props.insert(self.page_var_name.clone(), self.page_var.clone());
        let instance = self.template.template.stamp(&props);

        let mut roots = instance.roots();
        if roots.len() != 1 {
            warn!(
                template = %self.template.name,
                found = roots.len(),
                "expected template to contain exactly one root element"
            );
        }
        let element = if roots.is_empty() {
            Element::new("placeholder")
        } else {
            roots.swap_remove(0)
        };
        element.set_hidden(!self.visible);

        trace!(page = %self.handle, element = %element.id(), "stamped template");
        self.instance = Some(instance);
        self.element = Some(element.clone());
        self.page_var_unsynced = false;
        element
    }

    fn discard_instance(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.destroy();
            trace!(page = %self.handle, "discarded template instance");
        }
        self.element = None;
        self.page_var_unsynced = false;
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("handle", &self.handle)
            .field("id", &self.id)
            .field("template", &self.template.name)
            .field("restamp", &self.restamp)
            .field("visible", &self.visible)
            .field("inserted", &self.inserted)
            .field("element", &self.element)
            .finish()
    }
}
