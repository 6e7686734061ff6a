//! Switcher configuration

use serde::{Deserialize, Serialize};

/// Default prefix of lifecycle event names
pub const DEFAULT_EVENT_PREFIX: &str = "animated-pages";

/// Page switcher configuration
///
/// Every field has a default, so a partial JSON object is enough:
///
/// ```rust
/// use animated_pages::SwitcherConfig;
///
/// let config: SwitcherConfig = serde_json::from_str(r#"{ "noAnimations": true }"#).unwrap();
/// assert!(config.no_animations);
/// assert!(!config.restamp);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwitcherConfig {
    /// Never play segues
    pub no_animations: bool,
    /// Restamp pages whose definition does not say otherwise
    pub restamp: bool,
    /// Prefix of lifecycle event names (`<prefix>-page-will-enter`, ...)
    pub event_prefix: String,
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self {
            no_animations: false,
            restamp: false,
            event_prefix: DEFAULT_EVENT_PREFIX.to_string(),
        }
    }
}

impl SwitcherConfig {
    pub fn with_no_animations(mut self, no_animations: bool) -> Self {
        self.no_animations = no_animations;
        self
    }

    pub fn with_restamp(mut self, restamp: bool) -> Self {
        self.restamp = restamp;
        self
    }
}
