//! Pages
//!
//! A page is one addressable view inside the container. Its element is
//! stamped lazily from a template the first time it is inserted and is either
//! kept or discarded when the page is hidden.

#[allow(clippy::module_inception)]
mod page;

pub use page::Page;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique page handle
///
/// Handles are never reused within a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageHandle(pub u64);

impl fmt::Display for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page-{}", self.0)
    }
}
