//! Animated page switching
//!
//! This crate provides the core of an animated page container:
//! - Page lifecycle (lazy stamping, show/hide, restamp vs. keep)
//! - A page container that owns every page and maps ids to pages
//! - A single-slot transition queue (one active, one pending transition)
//! - A page switcher that runs page changes through the queue and applies
//!   the lifecycle side effects once a segue is over
//!
//! ## Architecture
//!
//! - [`stage`]: The element tree pages are inserted into (`Stage`, `Element`)
//! - [`template`]: Named view factories that stamp page elements
//! - [`page`]: A single page and its deferred page-variable syncing
//! - [`container`]: Page ownership, template resolution and the id table
//! - [`transition`]: Transition state machine and transition queue
//! - [`segue`]: The pluggable visual effect contract
//! - [`switcher`]: The orchestration layer tying everything together
//!
//! ## Example
//!
//! ```rust
//! use animated_pages::{ElementTemplate, PageSwitcher, Size, Stage, SwitcherConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let local = tokio::task::LocalSet::new();
//! local.run_until(async {
//!     let switcher = PageSwitcher::new(Stage::new(Size::new(800.0, 600.0)), SwitcherConfig::default());
//!     switcher.register_template("home", ElementTemplate::new("div").with_text("Home"));
//!
//!     let change = switcher.select_page("home").unwrap().await.unwrap();
//!     assert!(change.started());
//! }).await;
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Everything is single-threaded. Transitions are spawned with
//! `tokio::task::spawn_local`, so a switcher has to be driven from inside a
//! `tokio::task::LocalSet`.

pub mod stage;
pub mod template;
pub mod page;
pub mod container;
pub mod transition;
pub mod segue;
pub mod switcher;

mod config;
mod definition;
mod error;
mod path;

pub use config::SwitcherConfig;
pub use container::PageContainer;
pub use definition::{PageDefinition, PageSpec};
pub use error::{PagesError, PagesResult, TransitionError};
pub use page::{Page, PageHandle};
pub use segue::{segue_factory, LocalBoxFuture, Segue, SegueContext, SegueFactory};
pub use stage::{Element, ElementId, Size, Stage, Style};
pub use switcher::{
    ListenerId, PageChange, PageChangeReport, PageChangeRequest, PageEvent, PageEventKind,
    PageSwitcher,
};
pub use template::{ElementTemplate, Template, TemplateInstance, TemplateOptions};
pub use transition::{
    Completion, Disposition, Stop, Transition, TransitionCallbacks, TransitionQueue,
    TransitionState,
};
