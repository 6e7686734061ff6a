//! Page switcher
//!
//! Ties the container and the transition queue together. Every selection
//! becomes one transition:
//!
//! 1. The current page is taken as page A and the requested page B is
//!    resolved and shown
//! 2. A segue is requested if animations are enabled and the stage is visible
//! 3. `will-leave` / `will-enter` fire and the segue runs
//! 4. Once the transition stops the segue is stopped, `did-leave` /
//!    `did-enter` fire, the outgoing page is hidden and the survivor becomes
//!    current
//!
//! Without a segue the whole change happens before `select_page` returns.

mod change;
mod events;
mod report;
mod select;

pub use change::PageChangeRequest;
pub use events::{ListenerId, PageEvent, PageEventKind};
pub use report::{PageChange, PageChangeReport};

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::config::SwitcherConfig;
use crate::container::PageContainer;
use crate::definition::PageDefinition;
use crate::error::PagesResult;
use crate::page::PageHandle;
use crate::segue::SegueFactory;
use crate::stage::Stage;
use crate::template::Template;
use crate::transition::{Completion, Disposition, TransitionQueue};
use events::Listener;

/// Mutable switcher state
///
/// Never borrowed while segues, factories or listeners run.
pub(crate) struct SwitcherState {
    pub(crate) container: PageContainer,
    pub(crate) current: Option<PageHandle>,
    pub(crate) config: SwitcherConfig,
    pub(crate) initial_render: bool,
    pub(crate) segue_factory: Option<SegueFactory>,
    /// Pages that lost their id to a page with another template, with that id
    pub(crate) retired: HashMap<PageHandle, String>,
}

pub(crate) struct Shared {
    pub(crate) state: RefCell<SwitcherState>,
    transitioning: Cell<bool>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
    finished: watch::Sender<Option<PageChange>>,
    queue: TransitionQueue<PageChange>,
}

impl Shared {
    /// Notify listeners, no state borrow is held while they run
    pub(crate) fn emit(&self, kind: PageEventKind, page: Option<PageHandle>) {
        let Some(page) = page else {
            return;
        };
        let (event, prefix) = {
            let state = self.state.borrow();
            let event = PageEvent {
                kind,
                page,
                page_id: state
                    .container
                    .page(page)
                    .and_then(|p| p.id().map(str::to_string)),
                initial_render: state.initial_render,
            };
            (event, state.config.event_prefix.clone())
        };
        trace!(event = %kind.event_name(&prefix), %page, "page event");

        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    pub(crate) fn publish(&self, change: PageChange) {
        self.finished.send_replace(Some(change));
    }
}

/// Animated page switcher
///
/// `PageSwitcher` is a cheap handle; clones drive the same switcher. It must
/// be used from inside a `tokio::task::LocalSet`.
#[derive(Clone)]
pub struct PageSwitcher {
    shared: Rc<Shared>,
}

impl PageSwitcher {
    /// Create a connected switcher rendering into `stage`
    pub fn new(stage: Stage, config: SwitcherConfig) -> Self {
        let (finished, _) = watch::channel(None);
        let shared = Rc::new(Shared {
            state: RefCell::new(SwitcherState {
                container: PageContainer::new(stage),
                current: None,
                config,
                initial_render: true,
                segue_factory: None,
                retired: HashMap::new(),
            }),
            transitioning: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
            finished,
            queue: TransitionQueue::new(),
        });

        let weak = Rc::downgrade(&shared);
        shared.queue.set_on_start(move || {
            if let Some(shared) = weak.upgrade() {
                shared.transitioning.set(true);
            }
        });
        let weak = Rc::downgrade(&shared);
        shared.queue.set_on_stop(move || {
            if let Some(shared) = weak.upgrade() {
                shared.transitioning.set(false);
            }
        });

        Self { shared }
    }

    /// Register a template pages can be created from
    pub fn register_template(&self, name: impl Into<String>, template: impl Template + 'static) {
        self.shared
            .state
            .borrow_mut()
            .container
            .register_template(name, template);
    }

    /// Set the factory building segues for page changes
    pub fn set_segue_factory(&self, factory: Option<SegueFactory>) {
        self.shared.state.borrow_mut().segue_factory = factory;
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a page
    ///
    /// The definition is validated right away; everything else happens inside
    /// the transition. If no transition is running and no segue is played the
    /// returned completion is already resolved.
    pub fn select_page(
        &self,
        definition: impl Into<PageDefinition>,
    ) -> PagesResult<Completion<PageChange>> {
        let restamp = self.shared.state.borrow().config.restamp;
        let definition = definition.into().normalize(restamp)?;
        debug!(id = %definition.id, template = %definition.template_name, "selecting page");
        Ok(self.enqueue_page_change(PageChangeRequest::select(definition)))
    }

    /// Hide the current page without showing another one
    pub fn select_none(&self) -> Completion<PageChange> {
        debug!("selecting no page");
        self.enqueue_page_change(PageChangeRequest::new(|_| Ok(None)))
    }

    /// Enqueue an arbitrary page change
    pub fn enqueue_page_change(&self, request: PageChangeRequest) -> Completion<PageChange> {
        self.shared
            .queue
            .enqueue(change::callbacks(&self.shared, request))
    }

    /// Cancel the running page change
    ///
    /// `Disposition::Start` reverts to the page that was current before it.
    /// A waiting page change starts right after.
    pub fn cancel_current_transition(&self, disposition: Option<Disposition>) -> bool {
        self.shared.queue.cancel_current(disposition)
    }

    /// Drop the waiting page change, it resolves as skipped
    pub fn clear_upcoming_transition(&self) -> bool {
        self.shared.queue.clear_upcoming()
    }

    /// `true` while a page change runs or is about to run
    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.shared.transitioning.get()
    }

    /// The current page, `None` while a page change is running
    pub fn current_page(&self) -> Option<PageHandle> {
        self.shared.state.borrow().current
    }

    /// Receiver of the latest page change result
    pub fn finished(&self) -> watch::Receiver<Option<PageChange>> {
        self.shared.finished.subscribe()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn config(&self) -> SwitcherConfig {
        self.shared.state.borrow().config.clone()
    }

    /// Enable or disable segues
    ///
    /// Disabling animations jumps the running page change to its end.
    pub fn set_no_animations(&self, no_animations: bool) {
        {
            let mut state = self.shared.state.borrow_mut();
            if state.config.no_animations == no_animations {
                return;
            }
            state.config.no_animations = no_animations;
        }
        debug!(no_animations, "animations toggled");
        if no_animations {
            self.cancel_current_transition(Some(Disposition::End));
        }
    }

    pub fn set_restamp(&self, restamp: bool) {
        self.shared.state.borrow_mut().config.restamp = restamp;
    }

    // =========================================================================
    // Host lifecycle
    // =========================================================================

    /// Host attached; page changes run again
    pub fn connect(&self) {
        self.shared.state.borrow_mut().initial_render = true;
        self.shared.queue.set_paused(false);
    }

    /// Host detached; page changes are held back until reconnected
    pub fn disconnect(&self) {
        self.shared.state.borrow_mut().initial_render = false;
        self.shared.queue.set_paused(true);
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        !self.shared.queue.is_paused()
    }

    /// The host rendered its first frame since connecting
    pub fn frame_rendered(&self) {
        self.shared.state.borrow_mut().initial_render = false;
    }

    #[inline]
    pub fn is_initial_render(&self) -> bool {
        self.shared.state.borrow().initial_render
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register a lifecycle event listener
    ///
    /// Listeners may call back into the switcher.
    pub fn on_page_event(&self, listener: impl Fn(&PageEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.shared.next_listener.get());
        self.shared.next_listener.set(id.0 + 1);
        self.shared
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    pub fn remove_page_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.shared.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    // =========================================================================
    // Pages
    // =========================================================================

    /// Delete a page; deleting the current page leaves no page current
    pub fn delete_page(&self, handle: PageHandle) -> bool {
        let mut state = self.shared.state.borrow_mut();
        state.retired.remove(&handle);
        if state.current == Some(handle) {
            state.current = None;
        }
        state.container.delete_page(handle)
    }

    /// Borrow the container
    ///
    /// Do not hold the borrow across page changes.
    pub fn container(&self) -> Ref<'_, PageContainer> {
        Ref::map(self.shared.state.borrow(), |state| &state.container)
    }

    /// Mutably borrow the container
    ///
    /// Do not hold the borrow across page changes.
    pub fn container_mut(&self) -> RefMut<'_, PageContainer> {
        RefMut::map(self.shared.state.borrow_mut(), |state| &mut state.container)
    }
}

impl fmt::Debug for PageSwitcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("PageSwitcher")
            .field("current", &state.current)
            .field("config", &state.config)
            .field("transitioning", &self.shared.transitioning.get())
            .field("queue", &self.shared.queue)
            .finish()
    }
}
