//! Segue factories
//!
//! Helpers turning segue configurations into [`SegueFactory`] values for
//! `PageSwitcher::set_segue_factory` and `PageChangeRequest::with_segue_factory`.

use std::collections::HashMap;

use animated_pages::{segue_factory, Segue, SegueFactory};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::class_segue::{ClassConfig, ClassSegue};
use crate::keyframe_segue::{KeyframeConfig, KeyframeSegue};

/// Serializable choice of segue
///
/// ```
/// use animated_pages_segues::SegueSpec;
///
/// let spec: SegueSpec = serde_json::from_str(r#"{"kind": "push", "durationMs": 120}"#).unwrap();
/// assert_eq!(spec, SegueSpec::Push { duration_ms: Some(120) });
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SegueSpec {
    /// No animation
    None,
    Fade {
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    Swap {
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    Push {
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    Pop {
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    Keyframes(KeyframeConfig),
    Class(ClassConfig),
}

impl Default for SegueSpec {
    fn default() -> Self {
        SegueSpec::Fade { duration_ms: None }
    }
}

impl SegueSpec {
    /// Keyframe configuration for this segue kind, if it is keyframe based
    pub fn keyframes(&self) -> Option<KeyframeConfig> {
        let (preset, duration_ms) = match self {
            SegueSpec::Fade { duration_ms } => (KeyframeConfig::fade(), duration_ms),
            SegueSpec::Swap { duration_ms } => (KeyframeConfig::swap(), duration_ms),
            SegueSpec::Push { duration_ms } => (KeyframeConfig::push(), duration_ms),
            SegueSpec::Pop { duration_ms } => (KeyframeConfig::pop(), duration_ms),
            SegueSpec::Keyframes(config) => return Some(*config),
            SegueSpec::None | SegueSpec::Class(_) => return None,
        };
        Some(match duration_ms {
            Some(duration_ms) => preset.with_duration_ms(*duration_ms),
            None => preset,
        })
    }

    /// Factory building this segue for every page change
    pub fn factory(&self) -> SegueFactory {
        match self {
            SegueSpec::None => no_segue(),
            SegueSpec::Class(config) => class_factory(config.clone()),
            _ => keyframe_factory(self.keyframes().unwrap_or_default()),
        }
    }
}

/// Factory that never animates
pub fn no_segue() -> SegueFactory {
    segue_factory(|_| Ok(None))
}

pub fn keyframe_factory(config: KeyframeConfig) -> SegueFactory {
    segue_factory(move |ctx| {
        Ok(Some(
            Box::new(KeyframeSegue::from_context(config, ctx)) as Box<dyn Segue>
        ))
    })
}

pub fn class_factory(config: ClassConfig) -> SegueFactory {
    segue_factory(move |ctx| {
        Ok(Some(
            Box::new(ClassSegue::from_context(config.clone(), ctx)) as Box<dyn Segue>
        ))
    })
}

/// Skip the animation while the host renders its first frame
pub fn skip_initial_render(factory: SegueFactory) -> SegueFactory {
    segue_factory(move |ctx| {
        if ctx.initial_render {
            trace!("initial render, no segue");
            return Ok(None);
        }
        factory(ctx)
    })
}

/// Pick a factory by the incoming page's template
///
/// Changes to no page, or to templates without an entry, use `fallback`.
pub fn by_template(routes: HashMap<String, SegueFactory>, fallback: Option<SegueFactory>) -> SegueFactory {
    segue_factory(move |ctx| {
        let routed = ctx
            .template_name
            .as_deref()
            .and_then(|name| routes.get(name))
            .or(fallback.as_ref());
        match routed {
            Some(factory) => factory(ctx),
            None => Ok(None),
        }
    })
}

/// Pick a factory by the outgoing and the incoming page's template
///
/// Changes whose template pair has no entry use `fallback`, which may be a
/// [`by_template`] router.
pub fn by_template_pair(
    routes: HashMap<(String, String), SegueFactory>,
    fallback: Option<SegueFactory>,
) -> SegueFactory {
    segue_factory(move |ctx| {
        let routed = match (&ctx.outgoing_template_name, &ctx.template_name) {
            (Some(from), Some(to)) => routes.get(&(from.clone(), to.clone())),
            _ => None,
        };
        match routed.or(fallback.as_ref()) {
            Some(factory) => factory(ctx),
            None => Ok(None),
        }
    })
}
