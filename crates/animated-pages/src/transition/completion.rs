//! Completion handle of a transition

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::TransitionError;

/// Resolves to the value returned by a transition's stop callback
///
/// Resolution happens exactly once. A transition dropped without ever being
/// stopped resolves to [`TransitionError::Abandoned`].
#[derive(Debug)]
#[must_use = "a completion does nothing unless polled or awaited"]
pub struct Completion<R> {
    rx: Option<oneshot::Receiver<R>>,
}

impl<R> Completion<R> {
    pub(crate) fn new(rx: oneshot::Receiver<R>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Take the result if the transition is already over
    ///
    /// Returns `None` while the transition is still pending. Once a result
    /// has been taken the completion is spent and reports
    /// [`TransitionError::Abandoned`].
    pub fn try_result(&mut self) -> Option<Result<R, TransitionError>> {
        let Some(rx) = self.rx.as_mut() else {
            return Some(Err(TransitionError::Abandoned));
        };
        let result = match rx.try_recv() {
            Ok(value) => Ok(value),
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(TransitionError::Abandoned),
        };
        self.rx = None;
        Some(result)
    }
}

impl<R> Future for Completion<R> {
    type Output = Result<R, TransitionError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(rx) = this.rx.as_mut() else {
            return Poll::Ready(Err(TransitionError::Abandoned));
        };
        match Pin::new(rx).poll(cx) {
            Poll::Ready(result) => {
                this.rx = None;
                Poll::Ready(result.map_err(|_| TransitionError::Abandoned))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
