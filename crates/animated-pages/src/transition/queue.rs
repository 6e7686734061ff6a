//! Single-slot transition queue

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, error, warn};

use super::{Completion, Disposition, Transition, TransitionCallbacks, TransitionState};

type Hook = Rc<dyn Fn()>;

struct QueueState<R> {
    /// Currently running transition
    active: Option<Transition<R>>,
    /// Transition waiting for the active one to stop
    pending: Option<Transition<R>>,
    /// `true` from the first start until the queue runs dry
    running: bool,
    paused: bool,
    on_start: Option<Hook>,
    on_stop: Option<Hook>,
}

/// Runs at most one transition at a time, keeps at most one waiting
///
/// Enqueuing while a transition is already waiting skips the waiting one:
/// only the latest request survives. `TransitionQueue` is a cheap handle;
/// clones refer to the same queue.
pub struct TransitionQueue<R> {
    inner: Rc<RefCell<QueueState<R>>>,
}

impl<R> Clone for TransitionQueue<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: 'static> Default for TransitionQueue<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: 'static> TransitionQueue<R> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueState {
                active: None,
                pending: None,
                running: false,
                paused: false,
                on_start: None,
                on_stop: None,
            })),
        }
    }

    /// Called when the queue goes from idle to busy
    pub fn set_on_start(&self, hook: impl Fn() + 'static) {
        self.inner.borrow_mut().on_start = Some(Rc::new(hook));
    }

    /// Called when the queue runs dry
    pub fn set_on_stop(&self, hook: impl Fn() + 'static) {
        self.inner.borrow_mut().on_stop = Some(Rc::new(hook));
    }

    /// `true` while a transition runs or is about to run
    #[inline]
    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    #[inline]
    pub fn has_active(&self) -> bool {
        self.inner.borrow().active.is_some()
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.inner.borrow().paused
    }

    /// Pause or resume the queue
    ///
    /// A paused queue keeps accepting transitions but starts none of them.
    pub fn set_paused(&self, paused: bool) {
        {
            let mut state = self.inner.borrow_mut();
            if state.paused == paused {
                return;
            }
            state.paused = paused;
        }
        debug!(paused, "transition queue paused state changed");
        if !paused {
            self.run_pending();
        }
    }

    /// Enqueue a transition, replacing any transition still waiting
    ///
    /// Starts it right away if the queue is idle.
    pub fn enqueue(&self, callbacks: TransitionCallbacks<R>) -> Completion<R> {
        let (transition, completion) = Transition::new(callbacks);
        debug!(transition = transition.id(), "enqueueing transition");

        self.clear_upcoming();
        self.inner.borrow_mut().pending = Some(transition);
        self.run_pending();
        completion
    }

    /// Start the waiting transition if nothing is running
    pub fn run_pending(&self) {
        let (transition, went_busy) = {
            let mut state = self.inner.borrow_mut();
            if state.active.is_some() || state.paused {
                return;
            }
            match state.pending.take() {
                Some(transition) => {
                    let went_busy = !state.running;
                    state.running = true;
                    state.active = Some(transition.clone());
                    (transition, went_busy)
                }
                None => {
                    if !state.running {
                        return;
                    }
                    state.running = false;
                    let hook = state.on_stop.clone();
                    drop(state);
                    debug!("transition queue idle");
                    if let Some(hook) = hook {
                        hook();
                    }
                    return;
                }
            }
        };

        if went_busy {
            let hook = self.inner.borrow().on_start.clone();
            if let Some(hook) = hook {
                hook();
            }
        }

        let id = transition.id();
        let queue: Weak<RefCell<QueueState<R>>> = Rc::downgrade(&self.inner);
        transition.set_on_stop(move || {
            if let Some(inner) = queue.upgrade() {
                TransitionQueue { inner }.release(id);
            }
        });

        if let Err(err) = transition.start() {
            error!(transition = id, %err, "could not start transition");
            self.release(id);
        }
    }

    /// Clear the active slot if it still holds transition `id`, then move on
    fn release(&self, id: u64) {
        {
            let mut state = self.inner.borrow_mut();
            if state.active.as_ref().map(Transition::id) == Some(id) {
                state.active = None;
            }
        }
        self.run_pending();
    }

    /// Cancel the running transition
    ///
    /// A waiting transition starts right after. Returns `false` if nothing
    /// was running, or if the active transition is already in its stop
    /// callback; it releases the slot itself once that returns.
    pub fn cancel_current(&self, disposition: Option<Disposition>) -> bool {
        let active = {
            let mut state = self.inner.borrow_mut();
            let stopping = state
                .active
                .as_ref()
                .filter(|transition| transition.state() == TransitionState::Stopped)
                .map(Transition::id);
            if let Some(id) = stopping {
                debug!(transition = id, "transition already stopping");
                return false;
            }
            state.active.take()
        };
        match active {
            Some(transition) => {
                debug!(transition = transition.id(), ?disposition, "canceling transition");
                if let Err(err) = transition.stop(disposition) {
                    warn!(transition = transition.id(), %err, "could not cancel transition");
                    self.run_pending();
                }
                true
            }
            None => false,
        }
    }

    /// Skip the waiting transition, the running one is left alone
    ///
    /// Returns `false` if nothing was waiting.
    pub fn clear_upcoming(&self) -> bool {
        let pending = self.inner.borrow_mut().pending.take();
        match pending {
            Some(transition) => {
                debug!(transition = transition.id(), "skipping transition");
                if let Err(err) = transition.stop(None) {
                    warn!(transition = transition.id(), %err, "could not skip transition");
                }
                true
            }
            None => false,
        }
    }
}

impl<R> fmt::Debug for TransitionQueue<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("TransitionQueue")
            .field("active", &state.active)
            .field("pending", &state.pending)
            .field("running", &state.running)
            .field("paused", &state.paused)
            .finish()
    }
}
