//! Demo script model
//!
//! A script is a JSON document:
//!
//! ```json
//! {
//!   "config": { "restamp": false },
//!   "stage": { "width": 800, "height": 600 },
//!   "templates": { "home": { "tag": "main", "text": "Home" } },
//!   "segue": { "kind": "fade" },
//!   "steps": [
//!     { "op": "select", "page": "home" },
//!     { "op": "settle" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use animated_pages::{
    Disposition, ElementTemplate, PageDefinition, Size, Stage, SwitcherConfig, TemplateOptions,
};
use animated_pages_segues::SegueSpec;
use anyhow::Context as _;
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Script {
    pub config: SwitcherConfig,
    pub stage: StageSpec,
    pub templates: BTreeMap<String, TemplateSpec>,
    pub segue: SegueSpec,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read script '{}'", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parse script '{}'", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct StageSpec {
    pub width: f32,
    pub height: f32,
    pub displayed: bool,
}

impl Default for StageSpec {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            displayed: true,
        }
    }
}

impl StageSpec {
    pub fn build(&self) -> Stage {
        let mut stage = Stage::new(Size::new(self.width, self.height));
        stage.set_displayed(self.displayed);
        stage
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateSpec {
    pub tag: String,
    pub text: Option<String>,
    pub classes: Vec<String>,
    #[serde(flatten)]
    pub options: TemplateOptions,
}

impl Default for TemplateSpec {
    fn default() -> Self {
        Self {
            tag: "div".to_string(),
            text: None,
            classes: Vec::new(),
            options: TemplateOptions::default(),
        }
    }
}

impl TemplateSpec {
    pub fn build(&self) -> ElementTemplate {
        let mut template = ElementTemplate::new(self.tag.clone()).with_options(self.options.clone());
        if let Some(text) = &self.text {
            template = template.with_text(text.clone());
        }
        for class in &self.classes {
            template = template.with_class(class.clone());
        }
        template
    }
}

/// One scripted action
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Step {
    /// Select a page by template name or page definition
    Select { page: PageDefinition },
    /// Hide the current page
    SelectNone,
    /// Let time pass
    Wait { ms: u64 },
    /// Await every outstanding page change
    Settle,
    /// Cancel the running page change
    Cancel {
        #[serde(default)]
        revert: bool,
    },
    /// Skip the waiting page change
    Clear,
    NoAnimations { value: bool },
    /// Replace the segue used from now on
    Segue { segue: SegueSpec },
    Disconnect,
    Connect,
    FrameRendered,
    /// Print the stage
    Snapshot,
}

impl Step {
    /// Disposition a cancel step lands on
    pub fn cancel_disposition(revert: bool) -> Disposition {
        Disposition::from_revert(revert)
    }
}
