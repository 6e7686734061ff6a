//! Frame-driven tween writing an element's animation overlay

use std::time::Duration;

use animated_pages::Element;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

use crate::keyframe::Effect;

/// Frame interval of every tween (~60 fps)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Plays one [`Effect`] on one element
#[derive(Clone, Debug)]
pub struct Tween {
    element: Element,
    effect: Effect,
    duration: Duration,
}

impl Tween {
    pub fn new(element: Element, effect: Effect, duration: Duration) -> Self {
        Self {
            element,
            effect,
            duration,
        }
    }

    #[inline]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Get the progress (0.0 to 1.0)
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Write the frame for `elapsed`
    pub fn apply(&self, elapsed: Duration) -> f32 {
        let progress = self.progress(elapsed);
        self.element
            .set_animated_style(self.effect.sample(progress).into());
        progress
    }

    /// Run to completion, writing one frame per tick
    ///
    /// The first frame is written before the first await. Dropping the
    /// future stops the tween where it is.
    pub async fn run(self) {
        let started = Instant::now();
        if self.apply(Duration::ZERO) >= 1.0 {
            return;
        }

        let mut ticker = tokio::time::interval_at(started + FRAME_INTERVAL, FRAME_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if self.apply(started.elapsed()) >= 1.0 {
                break;
            }
        }
        trace!(element = %self.element.id(), "tween finished");
    }
}
