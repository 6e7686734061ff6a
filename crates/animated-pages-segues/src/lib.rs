//! Prebuilt segues for animated-pages
//!
//! - [`KeyframeSegue`]: Two-element keyframe effect with the `fade`, `swap`,
//!   `push` and `pop` presets
//! - [`ClassSegue`]: Marks both elements with a class for a fixed time
//! - [`Tween`]: Frame-driven interpolation writing an element's animation
//!   overlay, timed with `tokio::time`
//! - [`easing`]: Timing curves
//!
//! ```rust
//! use animated_pages::{ElementTemplate, PageSwitcher, Size, Stage, SwitcherConfig};
//! use animated_pages_segues::SegueSpec;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! tokio::task::LocalSet::new().run_until(async {
//!     let switcher = PageSwitcher::new(Stage::new(Size::new(800.0, 600.0)), SwitcherConfig::default());
//!     switcher.register_template("home", ElementTemplate::new("div"));
//!     switcher.set_segue_factory(Some(SegueSpec::Fade { duration_ms: Some(10) }.factory()));
//!
//!     let change = switcher.select_page("home").unwrap().await.unwrap();
//!     assert_eq!(change.animated(), Some(true));
//! }).await;
//! # }
//! ```

pub mod easing;

mod class_segue;
mod factory;
mod keyframe;
mod keyframe_segue;
mod tween;

pub use class_segue::{ClassConfig, ClassSegue, CLASS_DURATION_MS};
pub use easing::{CubicBezier, Easing};
pub use factory::{
    by_template, by_template_pair, class_factory, keyframe_factory, no_segue, skip_initial_render,
    SegueSpec,
};
pub use keyframe::{Effect, Keyframe};
pub use keyframe_segue::{
    KeyframeConfig, KeyframeSegue, FADE_DURATION_MS, STACK_DURATION_MS, SWAP_DURATION_MS,
};
pub use tween::{Tween, FRAME_INTERVAL};
