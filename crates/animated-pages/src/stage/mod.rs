//! Stage module
//!
//! The stage is the parent element page elements are inserted into. It keeps
//! its children in document order and knows whether it is currently visible.

mod element;
mod size;
#[allow(clippy::module_inception)]
mod stage;

pub use element::{Element, ElementId, Style};
pub use size::Size;
pub use stage::Stage;
