//! Transition state machine

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll, Waker};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, trace};

use super::{Completion, Disposition, Stop, TransitionState};
use crate::error::TransitionError;
use crate::segue::LocalBoxFuture;

static NEXT_TRANSITION_ID: AtomicU64 = AtomicU64::new(1);

/// Start operation of a transition
pub type StartFn = Box<dyn FnOnce() -> LocalBoxFuture<anyhow::Result<Option<Disposition>>>>;

/// Stop callback of a transition
pub type StopFn<R> = Box<dyn FnOnce(Stop) -> R>;

/// The two callbacks driving a transition
pub struct TransitionCallbacks<R> {
    start: StartFn,
    stop: StopFn<R>,
}

impl<R> TransitionCallbacks<R> {
    /// Create callbacks from a start operation and a stop callback
    ///
    /// The start operation's future resolves to the requested disposition,
    /// `None` meaning [`Disposition::End`].
    pub fn new<S, F, T>(start: S, stop: T) -> Self
    where
        S: FnOnce() -> F + 'static,
        F: Future<Output = anyhow::Result<Option<Disposition>>> + 'static,
        T: FnOnce(Stop) -> R + 'static,
    {
        Self {
            start: Box::new(move || Box::pin(start()) as LocalBoxFuture<_>),
            stop: Box::new(stop),
        }
    }

    /// Callbacks whose start operation completes immediately
    pub fn instant<T>(stop: T) -> Self
    where
        T: FnOnce(Stop) -> R + 'static,
    {
        Self::new(|| async { Ok(None) }, stop)
    }
}

struct Inner<R> {
    id: u64,
    state: Cell<TransitionState>,
    start: RefCell<Option<StartFn>>,
    stop: RefCell<Option<StopFn<R>>>,
    sender: RefCell<Option<oneshot::Sender<R>>>,
    task: RefCell<Option<JoinHandle<()>>>,
    on_stop: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl<R> Drop for Inner<R> {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

/// One start/stop state machine around one asynchronous operation
///
/// `Transition` is a cheap handle; clones refer to the same transition.
pub struct Transition<R> {
    inner: Rc<Inner<R>>,
}

impl<R> Clone for Transition<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: 'static> Transition<R> {
    /// Create a transition in the `Ready` state
    pub fn new(callbacks: TransitionCallbacks<R>) -> (Self, Completion<R>) {
        let (tx, rx) = oneshot::channel();
        let inner = Inner {
            id: NEXT_TRANSITION_ID.fetch_add(1, Ordering::Relaxed),
            state: Cell::new(TransitionState::Ready),
            start: RefCell::new(Some(callbacks.start)),
            stop: RefCell::new(Some(callbacks.stop)),
            sender: RefCell::new(Some(tx)),
            task: RefCell::new(None),
            on_stop: RefCell::new(None),
        };
        (
            Self {
                inner: Rc::new(inner),
            },
            Completion::new(rx),
        )
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    #[inline]
    pub fn state(&self) -> TransitionState {
        self.inner.state.get()
    }

    /// Hook run after the stop callback, once the completion is resolved
    pub(crate) fn set_on_stop(&self, hook: impl FnOnce() + 'static) {
        *self.inner.on_stop.borrow_mut() = Some(Box::new(hook));
    }

    /// Start the transition
    ///
    /// The start operation is invoked right away and polled once. If it is
    /// already complete the transition stops before this returns, otherwise it
    /// continues on the current `LocalSet`.
    pub fn start(&self) -> Result<(), TransitionError> {
        if self.state() != TransitionState::Ready {
            return Err(TransitionError::AlreadyStarted);
        }
        self.inner.state.set(TransitionState::Running);
        trace!(transition = self.id(), "starting transition");

        let start = self.inner.start.borrow_mut().take();
        let future: LocalBoxFuture<_> = match start {
            Some(start) => match panic::catch_unwind(AssertUnwindSafe(start)) {
                Ok(future) => future,
                Err(payload) => {
                    let err = panic_error(payload);
                    Box::pin(async move { Err(err) })
                }
            },
            None => Box::pin(async { Ok(None) }),
        };
        let mut future = catch_panic(future);

        let mut cx = Context::from_waker(Waker::noop());
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(result) => self.settle(result),
            Poll::Pending => {
                // Stopped from inside the start operation
                if self.state() != TransitionState::Running {
                    return Ok(());
                }
                let weak: Weak<Inner<R>> = Rc::downgrade(&self.inner);
                let task = tokio::task::spawn_local(async move {
                    let result = future.await;
                    if let Some(inner) = weak.upgrade() {
                        Transition { inner }.settle(result);
                    }
                });
                *self.inner.task.borrow_mut() = Some(task);
            }
        }
        Ok(())
    }

    /// Stop the transition
    ///
    /// A running transition is canceled and lands on `disposition` (default
    /// [`Disposition::End`]). A transition that never started is skipped.
    pub fn stop(&self, disposition: Option<Disposition>) -> Result<(), TransitionError> {
        match self.state() {
            TransitionState::Stopped => Err(TransitionError::AlreadyStopped),
            TransitionState::Ready => {
                let start = self.inner.start.borrow_mut().take();
                drop(start);
                self.finish(Stop::Skipped);
                Ok(())
            }
            TransitionState::Running => {
                let task = self.inner.task.borrow_mut().take();
                if let Some(task) = task {
                    task.abort();
                }
                self.finish(Stop::Completed {
                    canceled: true,
                    disposition: disposition.unwrap_or_default(),
                });
                Ok(())
            }
        }
    }

    fn settle(&self, result: anyhow::Result<Option<Disposition>>) {
        if self.state() != TransitionState::Running {
            return;
        }
        let disposition = match result {
            Ok(disposition) => disposition.unwrap_or_default(),
            Err(err) => {
                error!(transition = self.id(), error = %err, "transition start operation failed");
                Disposition::default()
            }
        };
        let task = self.inner.task.borrow_mut().take();
        drop(task);
        self.finish(Stop::Completed {
            canceled: false,
            disposition,
        });
    }

    fn finish(&self, stop: Stop) {
        self.inner.state.set(TransitionState::Stopped);
        trace!(transition = self.id(), ?stop, "transition stopped");

        let stop_fn = self.inner.stop.borrow_mut().take();
        if let Some(stop_fn) = stop_fn {
            let value = stop_fn(stop);
            let sender = self.inner.sender.borrow_mut().take();
            if let Some(sender) = sender {
                // The caller may have dropped its completion
                let _ = sender.send(value);
            }
        }

        let on_stop = self.inner.on_stop.borrow_mut().take();
        if let Some(on_stop) = on_stop {
            on_stop();
        }
    }
}

/// Turn a panic inside the start operation into an error so the transition
/// still stops
fn catch_panic(
    mut future: LocalBoxFuture<anyhow::Result<Option<Disposition>>>,
) -> LocalBoxFuture<anyhow::Result<Option<Disposition>>> {
    Box::pin(std::future::poll_fn(move |cx| {
        match panic::catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(cx))) {
            Ok(poll) => poll,
            Err(payload) => Poll::Ready(Err(panic_error(payload))),
        }
    }))
}

fn panic_error(payload: Box<dyn std::any::Any + Send>) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    anyhow::anyhow!("start operation panicked: {message}")
}

impl<R> fmt::Debug for Transition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("id", &self.inner.id)
            .field("state", &self.inner.state.get())
            .finish()
    }
}
