//! Two-element keyframe segues and their presets

use std::time::Duration;

use animated_pages::{Disposition, Element, LocalBoxFuture, Segue, SegueContext};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::easing::EASE_IN_OUT_CIRC;
use crate::keyframe::{Effect, Keyframe};
use crate::tween::Tween;

/// Duration of fade segues in milliseconds
pub const FADE_DURATION_MS: u64 = 300;

/// Duration of swap segues in milliseconds
pub const SWAP_DURATION_MS: u64 = 400;

/// Duration of push and pop segues in milliseconds
pub const STACK_DURATION_MS: u64 = 200;

/// Horizontal offset of swap segues in pixels
const SWAP_OFFSET: f32 = 50.0;

/// Depth offset of push and pop segues in pixels
const STACK_DEPTH: f32 = 100.0;

/// Effects for the outgoing and the incoming element
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyframeConfig {
    pub outgoing: Option<Effect>,
    pub incoming: Option<Effect>,
    pub duration_ms: u64,
}

impl Default for KeyframeConfig {
    fn default() -> Self {
        Self::fade()
    }
}

impl KeyframeConfig {
    /// Crossfade, the incoming page on top
    pub fn fade() -> Self {
        Self {
            outgoing: Some(Effect::new(
                Keyframe::resting(1),
                Keyframe::new(0.0, [0.0; 3], 1),
            )),
            incoming: Some(Effect::new(
                Keyframe::new(0.0, [0.0; 3], 2),
                Keyframe::resting(2),
            )),
            duration_ms: FADE_DURATION_MS,
        }
    }

    /// Fade while sliding out to and in from the right
    pub fn swap() -> Self {
        let aside = |z_index| Keyframe::new(0.0, [SWAP_OFFSET, 0.0, 0.0], z_index);
        Self {
            outgoing: Some(Effect::new(Keyframe::resting(1), aside(1)).with_easing(EASE_IN_OUT_CIRC)),
            incoming: Some(Effect::new(aside(2), Keyframe::resting(2)).with_easing(EASE_IN_OUT_CIRC)),
            duration_ms: SWAP_DURATION_MS,
        }
    }

    /// Outgoing page sinks back, incoming page drops in from the front
    pub fn push() -> Self {
        Self {
            outgoing: Some(
                Effect::new(Keyframe::resting(1), Keyframe::new(0.0, [0.0, 0.0, -STACK_DEPTH], 1))
                    .with_easing(EASE_IN_OUT_CIRC),
            ),
            incoming: Some(
                Effect::new(Keyframe::new(0.0, [0.0, 0.0, STACK_DEPTH], 2), Keyframe::resting(2))
                    .with_easing(EASE_IN_OUT_CIRC),
            ),
            duration_ms: STACK_DURATION_MS,
        }
    }

    /// Push played backwards: outgoing page lifts to the front, incoming page
    /// rises from the back
    pub fn pop() -> Self {
        Self {
            outgoing: Some(
                Effect::new(Keyframe::new(0.0, [0.0, 0.0, STACK_DEPTH], 1), Keyframe::resting(1))
                    .with_easing(EASE_IN_OUT_CIRC)
                    .reversed(),
            ),
            incoming: Some(
                Effect::new(Keyframe::resting(2), Keyframe::new(0.0, [0.0, 0.0, -STACK_DEPTH], 2))
                    .with_easing(EASE_IN_OUT_CIRC)
                    .reversed(),
            ),
            duration_ms: STACK_DURATION_MS,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Animates the outgoing and the incoming element side by side
///
/// Both elements carry an animation overlay while the segue plays; `stop`
/// removes it whether or not the segue was canceled.
#[derive(Debug)]
pub struct KeyframeSegue {
    config: KeyframeConfig,
    outgoing: Option<Element>,
    incoming: Option<Element>,
}

impl KeyframeSegue {
    pub fn new(config: KeyframeConfig, outgoing: Option<Element>, incoming: Option<Element>) -> Self {
        Self {
            config,
            outgoing,
            incoming,
        }
    }

    pub fn from_context(config: KeyframeConfig, ctx: &SegueContext) -> Self {
        Self::new(config, ctx.outgoing.clone(), ctx.incoming.clone())
    }

    #[inline]
    pub fn config(&self) -> &KeyframeConfig {
        &self.config
    }

    fn tween(&self, element: Option<&Element>, effect: Option<Effect>) -> Option<Tween> {
        Some(Tween::new(element.cloned()?, effect?, self.config.duration()))
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.outgoing.iter().chain(self.incoming.iter())
    }
}

impl Segue for KeyframeSegue {
    fn start(&mut self) -> LocalBoxFuture<anyhow::Result<Option<Disposition>>> {
        let outgoing = self.tween(self.outgoing.as_ref(), self.config.outgoing);
        let incoming = self.tween(self.incoming.as_ref(), self.config.incoming);
        debug!(
            duration_ms = self.config.duration_ms,
            outgoing = outgoing.is_some(),
            incoming = incoming.is_some(),
            "starting keyframe segue"
        );

        Box::pin(async move {
            tokio::join!(
                async {
                    if let Some(tween) = outgoing {
                        tween.run().await;
                    }
                },
                async {
                    if let Some(tween) = incoming {
                        tween.run().await;
                    }
                },
            );
            Ok(None)
        })
    }

    fn stop(&mut self, canceled: bool) -> anyhow::Result<()> {
        for element in self.elements() {
            element.clear_animated_style();
        }
        debug!(canceled, "keyframe segue stopped");
        Ok(())
    }
}
