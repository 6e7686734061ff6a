//! Page container
//!
//! Owns the stage, the template registry and every page. Pages are addressed
//! by [`PageHandle`]; an optional id table maps application-level ids onto
//! handles.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::PagesResult;
use crate::page::{Page, PageHandle};
use crate::stage::{Element, Stage};
use crate::template::{Template, TemplateSet};

/// Owner of all pages and the stage they are rendered into
#[derive(Debug)]
pub struct PageContainer {
    stage: Stage,
    templates: TemplateSet,
    pages: HashMap<PageHandle, Page>,
    ids: HashMap<String, PageHandle>,
    next_handle: u64,
}

impl Default for PageContainer {
    fn default() -> Self {
        Self::new(Stage::default())
    }
}

impl PageContainer {
    /// Create an empty container rendering into `stage`
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            templates: TemplateSet::new(),
            pages: HashMap::new(),
            ids: HashMap::new(),
            next_handle: 1,
        }
    }

    #[inline]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[inline]
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    // =========================================================================
    // Templates
    // =========================================================================

    /// Register a template under `name`
    pub fn register_template(&mut self, name: impl Into<String>, template: impl Template + 'static) {
        self.templates.register(name, template);
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains(name)
    }

    /// Registered template names, sorted
    pub fn template_names(&self) -> Vec<String> {
        self.templates.names()
    }

    // =========================================================================
    // Pages
    // =========================================================================

    /// Create a page backed by the named template
    ///
    /// The page's element is not stamped until it is first shown or inserted.
    pub fn create_page(&mut self, template_name: &str) -> PagesResult<PageHandle> {
        let template = self.templates.resolve(template_name)?;

        let handle = PageHandle(self.next_handle);
        self.next_handle += 1;

        self.pages.insert(handle, Page::new(handle, template));
        debug!(page = %handle, template = template_name, "created page");
        Ok(handle)
    }

    /// Detach a page, discard its element and forget it
    ///
    /// Returns `false` if the page does not exist (anymore).
    pub fn delete_page(&mut self, handle: PageHandle) -> bool {
        let Some(mut page) = self.pages.remove(&handle) else {
            return false;
        };
        page.detach(&mut self.stage, true);
        if let Some(id) = page.id() {
            if self.ids.get(id) == Some(&handle) {
                self.ids.remove(id);
            }
        }
        debug!(page = %handle, "deleted page");
        true
    }

    /// Get a page by handle
    pub fn page(&self, handle: PageHandle) -> Option<&Page> {
        self.pages.get(&handle)
    }

    #[inline]
    pub fn contains(&self, handle: PageHandle) -> bool {
        self.pages.contains_key(&handle)
    }

    /// All page handles in creation order
    pub fn pages(&self) -> Vec<PageHandle> {
        let mut handles: Vec<PageHandle> = self.pages.keys().copied().collect();
        handles.sort();
        handles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The element of a page, if it has been stamped
    pub fn element(&self, handle: PageHandle) -> Option<Element> {
        self.page(handle).and_then(|p| p.element().cloned())
    }

    // =========================================================================
    // Id table
    // =========================================================================

    /// Find the page registered under `id`
    pub fn lookup(&self, id: &str) -> Option<PageHandle> {
        self.ids.get(id).copied()
    }

    /// Register `handle` under `id`
    ///
    /// Returns the page previously registered under that id. The previous page
    /// keeps existing but loses its id.
    pub fn bind_id(&mut self, id: impl Into<String>, handle: PageHandle) -> Option<PageHandle> {
        let id = id.into();
        if !self.pages.contains_key(&handle) {
            return None;
        }

        if let Some(old_id) = self.pages.get(&handle).and_then(|p| p.id().map(str::to_string)) {
            if old_id != id && self.ids.get(&old_id) == Some(&handle) {
                self.ids.remove(&old_id);
            }
        }

        let previous = self.ids.insert(id.clone(), handle).filter(|h| *h != handle);
        if let Some(previous) = previous {
            if let Some(page) = self.pages.get_mut(&previous) {
                page.set_id(None);
            }
        }
        if let Some(page) = self.pages.get_mut(&handle) {
            page.set_id(Some(id));
        }
        previous
    }

    /// Remove an id binding, the page itself is kept
    pub fn unbind_id(&mut self, id: &str) -> Option<PageHandle> {
        let handle = self.ids.remove(id)?;
        if let Some(page) = self.pages.get_mut(&handle) {
            page.set_id(None);
        }
        Some(handle)
    }

    // =========================================================================
    // Page operations
    // =========================================================================

    fn with_page(&mut self, handle: PageHandle, f: impl FnOnce(&mut Page, &mut Stage)) -> bool {
        match self.pages.get_mut(&handle) {
            Some(page) => {
                f(page, &mut self.stage);
                true
            }
            None => {
                trace!(page = %handle, "ignoring operation on unknown page");
                false
            }
        }
    }

    /// See [`Page::show`]
    pub fn show(&mut self, handle: PageHandle) -> bool {
        self.with_page(handle, |page, stage| page.show(stage))
    }

    /// See [`Page::hide`]
    pub fn hide(&mut self, handle: PageHandle) -> bool {
        self.with_page(handle, |page, stage| page.hide(stage))
    }

    /// See [`Page::insert_before`]
    pub fn insert_before(&mut self, handle: PageHandle, reference: Option<&Element>) -> bool {
        self.with_page(handle, |page, stage| page.insert_before(stage, reference))
    }

    /// See [`Page::detach`]
    pub fn detach(&mut self, handle: PageHandle, force_discard: bool) -> bool {
        self.with_page(handle, |page, stage| page.detach(stage, force_discard))
    }

    pub fn set_visible(&mut self, handle: PageHandle, visible: bool) -> bool {
        self.with_page(handle, |page, _| page.set_visible(visible))
    }

    pub fn set_restamp(&mut self, handle: PageHandle, restamp: bool) -> bool {
        self.with_page(handle, |page, _| page.set_restamp(restamp))
    }

    pub fn set_page_var(&mut self, handle: PageHandle, value: Value) -> bool {
        self.with_page(handle, |page, _| page.set_page_var(value))
    }

    /// See [`Page::forward_page_var_change`]
    pub fn forward_page_var_change(
        &mut self,
        handle: PageHandle,
        subpath: Option<&str>,
        value: Value,
    ) -> bool {
        self.with_page(handle, |page, _| page.forward_page_var_change(subpath, value))
    }
}
