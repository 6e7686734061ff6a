//! Page lifecycle events

use std::fmt;
use std::rc::Rc;

use crate::page::PageHandle;

/// Lifecycle event kinds, in the order they fire for one page change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageEventKind {
    WillLeave,
    WillEnter,
    DidLeave,
    DidEnter,
}

impl PageEventKind {
    /// Suffix of the event name
    pub fn suffix(self) -> &'static str {
        match self {
            Self::WillLeave => "will-leave",
            Self::WillEnter => "will-enter",
            Self::DidLeave => "did-leave",
            Self::DidEnter => "did-enter",
        }
    }

    /// Full event name, e.g. `animated-pages-page-will-enter`
    pub fn event_name(self, prefix: &str) -> String {
        format!("{prefix}-page-{}", self.suffix())
    }
}

impl fmt::Display for PageEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A lifecycle event of one page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageEvent {
    pub kind: PageEventKind,
    pub page: PageHandle,
    /// Id the page is registered under, if any
    pub page_id: Option<String>,
    /// `true` if the host had not rendered its first frame yet
    pub initial_render: bool,
}

/// Handle of a registered event listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

pub(crate) type Listener = Rc<dyn Fn(&PageEvent)>;
