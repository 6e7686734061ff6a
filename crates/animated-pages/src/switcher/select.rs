//! Page resolution and id bookkeeping

use tracing::{debug, error};

use super::change::Resolve;
use super::SwitcherState;
use crate::definition::NormalizedDefinition;
use crate::error::PagesResult;
use crate::page::PageHandle;

impl SwitcherState {
    /// Start phase: take the current page, resolve and show the next one
    pub(crate) fn begin_change(&mut self, resolve: Resolve) -> (Option<PageHandle>, Option<PageHandle>) {
        let page_a = self.current.take();

        let page_b = match resolve {
            Resolve::Select(definition) => self.resolve_selection(definition).map_err(anyhow::Error::from),
            Resolve::Custom(resolver) => resolver(&mut self.container),
        };
        let page_b = match page_b {
            Ok(page_b) => page_b,
            Err(err) => {
                error!(error = %err, "could not resolve page, changing to no page");
                None
            }
        };

        if let Some(page_b) = page_b {
            self.container.show(page_b);
        }
        (page_a, page_b)
    }

    /// Stop phase: hide the loser and make the survivor current
    pub(crate) fn end_change(&mut self, hidden: Option<PageHandle>, shown: Option<PageHandle>, reverted: bool) {
        if reverted {
            if let Some(shown) = shown {
                self.restore(shown);
            }
        }
        if let Some(hidden) = hidden {
            self.hide_page(hidden);
        }
        self.current = shown.filter(|h| self.container.contains(*h));
    }

    /// Find or create the page for a selection
    ///
    /// A page registered under the same id but created from another template
    /// is retired and replaced.
    fn resolve_selection(&mut self, definition: NormalizedDefinition) -> PagesResult<Option<PageHandle>> {
        let NormalizedDefinition {
            id,
            template_name,
            restamp,
            data,
        } = definition;

        let existing = self.container.lookup(&id).filter(|handle| {
            let same_template = self
                .container
                .page(*handle)
                .is_some_and(|page| page.template_name() == template_name);
            if !same_template {
                debug!(%id, page = %handle, "page template changed, replacing page");
            }
            same_template
        });

        let handle = match existing {
            Some(handle) => handle,
            None => {
                // Fail before touching the old page
                let handle = self.container.create_page(&template_name)?;
                if let Some(previous) = self.container.bind_id(id.clone(), handle) {
                    self.retire(previous, id);
                }
                handle
            }
        };

        let template_restamp = self
            .container
            .page(handle)
            .is_some_and(|page| page.template_restamp());
        self.container.set_restamp(handle, restamp || template_restamp);
        self.container.set_page_var(handle, data);
        Ok(Some(handle))
    }

    /// Delete a page that lost its id, or remember it until it is hidden
    fn retire(&mut self, handle: PageHandle, id: String) {
        let on_screen = self
            .container
            .page(handle)
            .is_some_and(|page| page.is_inserted() && page.is_visible());
        if on_screen {
            self.retired.insert(handle, id);
        } else {
            self.container.delete_page(handle);
        }
    }

    /// A reverted change keeps a retired page A: give its id back
    fn restore(&mut self, handle: PageHandle) {
        let Some(id) = self.retired.remove(&handle) else {
            return;
        };
        debug!(%id, page = %handle, "restoring page id after revert");
        if let Some(replacement) = self.container.bind_id(id.clone(), handle) {
            self.retire(replacement, id);
        }
    }

    fn hide_page(&mut self, handle: PageHandle) {
        self.container.hide(handle);
        if self.retired.remove(&handle).is_some() {
            self.container.delete_page(handle);
        }
    }
}
