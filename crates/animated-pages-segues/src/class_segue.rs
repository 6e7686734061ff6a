//! Class segue - marks both elements with a class for a fixed time

use std::time::Duration;

use animated_pages::{Disposition, Element, LocalBoxFuture, Segue, SegueContext};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default duration of class segues in milliseconds
pub const CLASS_DURATION_MS: u64 = 300;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassConfig {
    /// Class added to the outgoing element
    pub outgoing_class: Option<String>,
    /// Class added to the incoming element
    pub incoming_class: Option<String>,
    pub duration_ms: u64,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            outgoing_class: None,
            incoming_class: None,
            duration_ms: CLASS_DURATION_MS,
        }
    }
}

impl ClassConfig {
    pub fn new(outgoing_class: impl Into<String>, incoming_class: impl Into<String>) -> Self {
        Self {
            outgoing_class: Some(outgoing_class.into()),
            incoming_class: Some(incoming_class.into()),
            ..Default::default()
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Adds the configured classes on start and removes them on stop
///
/// Whatever styling the classes stand for is up to the host.
#[derive(Debug)]
pub struct ClassSegue {
    config: ClassConfig,
    outgoing: Option<Element>,
    incoming: Option<Element>,
}

impl ClassSegue {
    pub fn new(config: ClassConfig, outgoing: Option<Element>, incoming: Option<Element>) -> Self {
        Self {
            config,
            outgoing,
            incoming,
        }
    }

    pub fn from_context(config: ClassConfig, ctx: &SegueContext) -> Self {
        Self::new(config, ctx.outgoing.clone(), ctx.incoming.clone())
    }

    fn marked(&self) -> impl Iterator<Item = (&Element, &str)> {
        let outgoing = self.outgoing.as_ref().zip(self.config.outgoing_class.as_deref());
        let incoming = self.incoming.as_ref().zip(self.config.incoming_class.as_deref());
        outgoing.into_iter().chain(incoming)
    }
}

impl Segue for ClassSegue {
    fn start(&mut self) -> LocalBoxFuture<anyhow::Result<Option<Disposition>>> {
        for (element, class) in self.marked() {
            element.add_class(class);
        }
        let duration = Duration::from_millis(self.config.duration_ms);
        debug!(duration_ms = self.config.duration_ms, "starting class segue");

        Box::pin(async move {
            tokio::time::sleep(duration).await;
            Ok(None)
        })
    }

    fn stop(&mut self, _canceled: bool) -> anyhow::Result<()> {
        for (element, class) in self.marked() {
            element.remove_class(class);
        }
        Ok(())
    }
}
