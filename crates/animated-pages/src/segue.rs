//! Segues - the visual effect played during a page change
//!
//! The switcher never animates anything itself. For every page change it
//! asks a [`SegueFactory`] for a [`Segue`], starts it and waits for the
//! returned future. Canceled segues are dropped mid-flight and then stopped,
//! so `stop` has to put the elements into a consistent state on its own.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde_json::Value;

use crate::page::PageHandle;
use crate::stage::Element;
use crate::transition::Disposition;

/// Boxed `!Send` future
pub type LocalBoxFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// A visual effect between an outgoing and an incoming page
pub trait Segue {
    /// Start the effect
    ///
    /// The future resolves once the effect is over. It may request a
    /// [`Disposition`]; `None` commits to the incoming page.
    fn start(&mut self) -> LocalBoxFuture<anyhow::Result<Option<Disposition>>>;

    /// Finish the effect, `canceled` if it was interrupted
    fn stop(&mut self, canceled: bool) -> anyhow::Result<()>;
}

/// Everything a factory knows about the page change it builds a segue for
#[derive(Clone, Debug, Default)]
pub struct SegueContext {
    pub page_a: Option<PageHandle>,
    pub page_b: Option<PageHandle>,
    /// Element of the outgoing page
    pub outgoing: Option<Element>,
    /// Element of the incoming page
    pub incoming: Option<Element>,
    /// Id of the outgoing page
    pub outgoing_id: Option<String>,
    pub outgoing_template_name: Option<String>,
    /// Page variable of the outgoing page
    pub outgoing_data: Value,
    /// Id of the incoming page
    pub id: Option<String>,
    /// Template of the incoming page
    pub template_name: Option<String>,
    /// Page variable of the incoming page
    pub incoming_data: Value,
    /// Data of the selection request
    pub data: Value,
    /// `true` while the host has not rendered its first frame
    pub initial_render: bool,
}

/// Builds the segue for a page change, `None` for an instant change
pub type SegueFactory = Rc<dyn Fn(&SegueContext) -> anyhow::Result<Option<Box<dyn Segue>>>>;

/// Wrap a closure as a [`SegueFactory`]
pub fn segue_factory<F>(factory: F) -> SegueFactory
where
    F: Fn(&SegueContext) -> anyhow::Result<Option<Box<dyn Segue>>> + 'static,
{
    Rc::new(factory)
}

impl fmt::Debug for dyn Segue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Segue")
    }
}
