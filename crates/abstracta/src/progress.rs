// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of the four workflow steps.

use std::time::Duration;

use abstracta_core::{Step, StepId};
use abstracta_workflow::WorkflowEvent;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);

/// One spinner line per step, driven by [`WorkflowEvent`]s.
pub struct StepProgress {
    _multi: MultiProgress,
    bars: Vec<(StepId, ProgressBar)>,
}

impl StepProgress {
    /// `hidden` suppresses all drawing, e.g. for JSON output.
    pub fn new(steps: &[Step], hidden: bool) -> Self {
        let multi = if hidden {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let bars = steps
            .iter()
            .map(|step| {
                let bar = multi.add(ProgressBar::new_spinner());
                bar.set_style(style.clone());
                bar.set_prefix(format!("{:<22}", step.label));
                bar.set_message("pending");
                (step.id, bar)
            })
            .collect();

        Self {
            _multi: multi,
            bars,
        }
    }

    fn bar(&self, id: StepId) -> Option<&ProgressBar> {
        self.bars.iter().find(|(s, _)| *s == id).map(|(_, b)| b)
    }

    /// Applies one event. Returns `true` once the run has settled.
    pub fn apply(&self, event: &WorkflowEvent) -> bool {
        match event {
            WorkflowEvent::StepStarted { step, message, .. } => {
                if let Some(bar) = self.bar(*step) {
                    bar.enable_steady_tick(TICK);
                    bar.set_message(message.clone());
                }
                false
            }
            WorkflowEvent::StepCompleted { step, message, .. } => {
                if let Some(bar) = self.bar(*step) {
                    let text = message.clone().unwrap_or_else(|| "done".to_string());
                    bar.finish_with_message(format!("✓ {text}"));
                }
                false
            }
            WorkflowEvent::Failed { step, reason, .. } => {
                if let Some(bar) = self.bar(*step) {
                    bar.abandon_with_message(format!("✗ {reason}"));
                }
                self.abandon_pending();
                true
            }
            WorkflowEvent::Cancelled { .. } | WorkflowEvent::Reset => {
                self.abandon_pending();
                true
            }
            WorkflowEvent::Completed { .. } => true,
            WorkflowEvent::Started { .. } => false,
        }
    }

    /// Stops every spinner that has not finished.
    pub fn abandon_pending(&self) {
        for (_, bar) in &self.bars {
            if !bar.is_finished() {
                bar.abandon();
            }
        }
    }
}
