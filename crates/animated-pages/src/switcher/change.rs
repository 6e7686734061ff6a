//! One page change: resolve, animate, finalize

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{error, warn};

use super::{PageChange, PageChangeReport, PageEventKind, Shared};
use crate::container::PageContainer;
use crate::definition::NormalizedDefinition;
use crate::page::PageHandle;
use crate::segue::{Segue, SegueContext, SegueFactory};
use crate::transition::{Disposition, Stop, TransitionCallbacks};

type Resolver = Box<dyn FnOnce(&mut PageContainer) -> anyhow::Result<Option<PageHandle>>>;

pub(crate) enum Resolve {
    Select(NormalizedDefinition),
    Custom(Resolver),
}

/// A page change to enqueue
///
/// The resolver runs when the change starts and picks page B. It gets
/// exclusive access to the container and must not call back into the
/// switcher.
pub struct PageChangeRequest {
    resolve: Resolve,
    segue_factory: Option<SegueFactory>,
    data: Value,
}

impl PageChangeRequest {
    /// A change to whatever page `resolve` returns, `None` for no page
    pub fn new<F>(resolve: F) -> Self
    where
        F: FnOnce(&mut PageContainer) -> anyhow::Result<Option<PageHandle>> + 'static,
    {
        Self {
            resolve: Resolve::Custom(Box::new(resolve)),
            segue_factory: None,
            data: Value::Null,
        }
    }

    pub(crate) fn select(definition: NormalizedDefinition) -> Self {
        Self {
            data: definition.data.clone(),
            resolve: Resolve::Select(definition),
            segue_factory: None,
        }
    }

    /// Use this factory instead of the switcher's for this change
    pub fn with_segue_factory(mut self, factory: SegueFactory) -> Self {
        self.segue_factory = Some(factory);
        self
    }

    /// Data handed to the segue factory
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

impl fmt::Debug for PageChangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolve = match &self.resolve {
            Resolve::Select(definition) => format!("select {}", definition.id),
            Resolve::Custom(_) => "custom".to_string(),
        };
        f.debug_struct("PageChangeRequest")
            .field("resolve", &resolve)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// State shared between the start and the stop phase of one change
#[derive(Default)]
struct ChangeState {
    page_a: Option<PageHandle>,
    page_b: Option<PageHandle>,
    segue: Option<Box<dyn Segue>>,
    animated: bool,
    /// The stop phase ran
    finalized: bool,
}

pub(crate) fn callbacks(shared: &Rc<Shared>, request: PageChangeRequest) -> TransitionCallbacks<PageChange> {
    let change = Rc::new(RefCell::new(ChangeState::default()));
    let start_change = Rc::clone(&change);
    let start_shared = Rc::downgrade(shared);
    let stop_shared = Rc::downgrade(shared);

    TransitionCallbacks::new(
        move || run(start_shared, request, start_change),
        move |stop| finish(&stop_shared, &change, stop),
    )
}

async fn run(
    shared: Weak<Shared>,
    request: PageChangeRequest,
    change: Rc<RefCell<ChangeState>>,
) -> anyhow::Result<Option<Disposition>> {
    let Some(shared) = shared.upgrade() else {
        return Ok(None);
    };
    let PageChangeRequest {
        resolve,
        segue_factory,
        data,
    } = request;

    let (page_a, page_b) = shared.state.borrow_mut().begin_change(resolve);
    {
        let mut change = change.borrow_mut();
        change.page_a = page_a;
        change.page_b = page_b;
    }

    let segue = create_segue(&shared, page_a, page_b, segue_factory, data);
    {
        let mut change = change.borrow_mut();
        change.animated = segue.is_some();
        change.segue = segue;
    }

    shared.emit(PageEventKind::WillLeave, page_a);
    // A `will-leave` listener may have canceled, the stop phase already
    // announced the outcome
    if !change.borrow().finalized {
        shared.emit(PageEventKind::WillEnter, page_b);
    }
    drop(shared);

    if change.borrow().finalized {
        return Ok(None);
    }
    let segue = change.borrow_mut().segue.take();
    let Some(mut segue) = segue else {
        return Ok(None);
    };

    let effect = segue.start();
    if change.borrow().finalized {
        // Canceled while starting, the stop phase never saw this segue
        stop_segue(segue.as_mut(), true);
        return Ok(None);
    }
    change.borrow_mut().segue = Some(segue);

    match effect.await {
        Ok(disposition) => Ok(disposition),
        Err(err) => {
            error!(error = %err, "segue failed, finishing without animation");
            change.borrow_mut().animated = false;
            Ok(None)
        }
    }
}

fn create_segue(
    shared: &Shared,
    page_a: Option<PageHandle>,
    page_b: Option<PageHandle>,
    factory: Option<SegueFactory>,
    data: Value,
) -> Option<Box<dyn Segue>> {
    let (factory, context) = {
        let state = shared.state.borrow();
        if state.config.no_animations || !state.container.stage().is_visible() {
            return None;
        }
        let factory = factory.or_else(|| state.segue_factory.clone())?;
        let outgoing = page_a.and_then(|h| state.container.page(h));
        let incoming = page_b.and_then(|h| state.container.page(h));
        let context = SegueContext {
            page_a,
            page_b,
            outgoing: page_a.and_then(|h| state.container.element(h)),
            incoming: incoming.and_then(|p| p.element().cloned()),
            outgoing_id: outgoing.and_then(|p| p.id().map(str::to_string)),
            outgoing_template_name: outgoing.map(|p| p.template_name().to_string()),
            outgoing_data: outgoing.map_or(Value::Null, |p| p.page_var().clone()),
            id: incoming.and_then(|p| p.id().map(str::to_string)),
            template_name: incoming.map(|p| p.template_name().to_string()),
            incoming_data: incoming.map_or(Value::Null, |p| p.page_var().clone()),
            data,
            initial_render: state.initial_render,
        };
        (factory, context)
    };

    match factory(&context) {
        Ok(segue) => segue,
        Err(err) => {
            warn!(error = %err, "segue factory failed, changing page without animation");
            None
        }
    }
}

fn stop_segue(segue: &mut dyn Segue, canceled: bool) {
    if let Err(err) = segue.stop(canceled) {
        error!(error = %err, canceled, "segue failed to stop");
    }
}

fn finish(shared: &Weak<Shared>, change: &RefCell<ChangeState>, stop: Stop) -> PageChange {
    let result = match stop {
        Stop::Skipped => PageChange::Skipped,
        Stop::Completed {
            canceled,
            disposition,
        } => {
            let (page_a, page_b, segue, animated) = {
                let mut change = change.borrow_mut();
                change.finalized = true;
                (change.page_a, change.page_b, change.segue.take(), change.animated)
            };
            if let Some(mut segue) = segue {
                stop_segue(segue.as_mut(), canceled);
            }

            let reverted = disposition.is_revert();
            if let Some(shared) = shared.upgrade() {
                finalize(&shared, page_a, page_b, reverted);
            }

            PageChange::Completed(PageChangeReport {
                page_a,
                page_b,
                canceled,
                animated,
                reverted,
            })
        }
    };

    if let Some(shared) = shared.upgrade() {
        shared.publish(result);
    }
    result
}

fn finalize(shared: &Shared, page_a: Option<PageHandle>, page_b: Option<PageHandle>, reverted: bool) {
    let (hidden, shown) = if reverted {
        (page_b, page_a)
    } else {
        (page_a, page_b)
    };
    // Re-selecting the current page must not hide it
    let hidden = hidden.filter(|h| Some(*h) != shown);

    if reverted {
        shared.emit(PageEventKind::WillLeave, hidden);
        shared.emit(PageEventKind::WillEnter, shown);
    }
    shared.emit(PageEventKind::DidLeave, hidden);
    shared.emit(PageEventKind::DidEnter, shown);

    shared.state.borrow_mut().end_change(hidden, shown, reverted);
}
