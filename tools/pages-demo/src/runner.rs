//! Script runner
//!
//! Plays a [`Script`] against a fresh switcher. Must run inside a
//! `tokio::task::LocalSet`.

use std::time::Duration;

use animated_pages::{Completion, PageChange, PageSwitcher};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::script::{Script, Step};

/// Outcome of one page change started by a script step
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChangeOutcome {
    /// Index of the step that requested the change
    pub step: usize,
    /// Milliseconds since the script started
    pub at_ms: u64,
    pub change: PageChange,
}

/// One stage child as printed by `snapshot`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElementSnapshot {
    pub tag: String,
    pub text: String,
    pub hidden: bool,
    pub opacity: f32,
}

pub struct Runner {
    switcher: PageSwitcher,
    outstanding: Vec<(usize, Completion<PageChange>)>,
    outcomes: Vec<ChangeOutcome>,
    started: Instant,
    /// Print outcomes and snapshots as JSON lines
    echo: bool,
}

impl Runner {
    pub fn new(script: &Script, echo: bool) -> Self {
        let switcher = PageSwitcher::new(script.stage.build(), script.config.clone());
        for (name, template) in &script.templates {
            switcher.register_template(name.clone(), template.build());
        }
        switcher.set_segue_factory(Some(script.segue.factory()));
        let prefix = script.config.event_prefix.clone();
        switcher.on_page_event(move |event| {
            debug!(
                event = %event.kind.event_name(&prefix),
                page = %event.page,
                id = ?event.page_id,
                "page event"
            );
        });

        Self {
            switcher,
            outstanding: Vec::new(),
            outcomes: Vec::new(),
            started: Instant::now(),
            echo,
        }
    }

    #[inline]
    pub fn switcher(&self) -> &PageSwitcher {
        &self.switcher
    }

    /// Play every step, then wait for the changes still in flight
    pub async fn run(mut self, steps: &[Step]) -> anyhow::Result<Vec<ChangeOutcome>> {
        for (index, step) in steps.iter().enumerate() {
            self.step(index, step).await?;
        }
        self.settle().await;
        Ok(self.outcomes)
    }

    async fn step(&mut self, index: usize, step: &Step) -> anyhow::Result<()> {
        debug!(step = index, ?step, "running step");
        match step {
            Step::Select { page } => {
                let completion = self.switcher.select_page(page.clone())?;
                self.outstanding.push((index, completion));
            }
            Step::SelectNone => {
                let completion = self.switcher.select_none();
                self.outstanding.push((index, completion));
            }
            Step::Wait { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
            Step::Settle => self.settle().await,
            Step::Cancel { revert } => {
                if !self
                    .switcher
                    .cancel_current_transition(Some(Step::cancel_disposition(*revert)))
                {
                    info!(step = index, "nothing to cancel");
                }
            }
            Step::Clear => {
                if !self.switcher.clear_upcoming_transition() {
                    info!(step = index, "nothing to clear");
                }
            }
            Step::NoAnimations { value } => self.switcher.set_no_animations(*value),
            Step::Segue { segue } => self.switcher.set_segue_factory(Some(segue.factory())),
            Step::Disconnect => self.switcher.disconnect(),
            Step::Connect => self.switcher.connect(),
            Step::FrameRendered => self.switcher.frame_rendered(),
            Step::Snapshot => {
                let snapshot = self.snapshot();
                if self.echo {
                    println!("{}", serde_json::to_string(&snapshot)?);
                }
            }
        }
        self.collect_finished();
        Ok(())
    }

    /// Stage children in order
    pub fn snapshot(&self) -> Vec<ElementSnapshot> {
        self.switcher
            .container()
            .stage()
            .children()
            .iter()
            .map(|element| ElementSnapshot {
                tag: element.tag(),
                text: element.text(),
                hidden: element.is_hidden(),
                opacity: element.computed_style().opacity,
            })
            .collect()
    }

    /// Record changes that are already over without waiting
    fn collect_finished(&mut self) {
        let mut pending = Vec::with_capacity(self.outstanding.len());
        for (step, mut completion) in std::mem::take(&mut self.outstanding) {
            match completion.try_result() {
                Some(result) => self.record(step, result),
                None => pending.push((step, completion)),
            }
        }
        self.outstanding = pending;
    }

    async fn settle(&mut self) {
        for (step, completion) in std::mem::take(&mut self.outstanding) {
            let result = completion.await;
            self.record(step, result);
        }
    }

    fn record(&mut self, step: usize, result: Result<PageChange, animated_pages::TransitionError>) {
        let change = match result {
            Ok(change) => change,
            Err(err) => {
                warn!(step, %err, "page change never resolved");
                return;
            }
        };
        let outcome = ChangeOutcome {
            step,
            at_ms: self.started.elapsed().as_millis() as u64,
            change,
        };
        info!(step, ?change, "page change finished");
        if self.echo {
            match serde_json::to_string(&outcome) {
                Ok(line) => println!("{line}"),
                Err(err) => warn!(step, %err, "could not serialize outcome"),
            }
        }
        self.outcomes.push(outcome);
    }
}
