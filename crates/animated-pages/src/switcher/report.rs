//! Page change results

use serde::Serialize;

use crate::page::PageHandle;

/// How a started page change ended
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageChangeReport {
    /// Page that was current when the change started
    pub page_a: Option<PageHandle>,
    /// Page the change was heading to
    pub page_b: Option<PageHandle>,
    /// Stopped before the segue finished
    pub canceled: bool,
    /// A segue was played
    pub animated: bool,
    /// `page_a` stayed current
    ///
    /// Independent of `canceled`: a segue that finishes naturally may still
    /// request a revert.
    pub reverted: bool,
}

/// Result of a page change request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum PageChange {
    /// Replaced by a later request before it could start
    Skipped,
    Completed(PageChangeReport),
}

impl PageChange {
    #[inline]
    pub fn started(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn report(&self) -> Option<&PageChangeReport> {
        match self {
            Self::Skipped => None,
            Self::Completed(report) => Some(report),
        }
    }

    pub fn canceled(&self) -> Option<bool> {
        self.report().map(|r| r.canceled)
    }

    pub fn animated(&self) -> Option<bool> {
        self.report().map(|r| r.animated)
    }

    pub fn reverted(&self) -> Option<bool> {
        self.report().map(|r| r.reverted)
    }
}
