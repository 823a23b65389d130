// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end session testing.
//!
//! `TestHarness` assembles a [`Session`] over mock backends with instant
//! pipeline delays, and keeps handles to the mocks so tests can script
//! failures and inspect calls.

use std::sync::Arc;

use abstracta_config::{AbstractaConfig, ChatSendPolicy, PipelineConfig};
use abstracta_core::{AbstractaError, GenerationMode, RunId, WorkflowState};
use abstracta_workflow::{Backends, Session};

use crate::mock_backends::{MockAnswerer, MockExtractor, MockGenerator};

/// Builder for creating test sessions with configurable options.
pub struct TestHarnessBuilder {
    config: AbstractaConfig,
    extractor: MockExtractor,
    generator: MockGenerator,
    answerer: MockAnswerer,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = AbstractaConfig::default();
        config.pipeline = PipelineConfig::instant();
        config.chat.reply_delay_ms = 0;
        Self {
            config,
            extractor: MockExtractor::new(),
            generator: MockGenerator::new(),
            answerer: MockAnswerer::new(),
        }
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.config.session.mode = mode;
        self
    }

    /// Replaces the whole configuration. Pipeline delays are kept as given.
    pub fn with_config(mut self, config: AbstractaConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the drafts the mock generator returns, in order.
    pub fn with_mock_drafts(mut self, drafts: Vec<String>) -> Self {
        self.generator = MockGenerator::with_drafts(drafts);
        self
    }

    pub fn with_extractor(mut self, extractor: MockExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_generator(mut self, generator: MockGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_answerer(mut self, answerer: MockAnswerer) -> Self {
        self.answerer = answerer;
        self
    }

    pub fn with_chat_policy(mut self, policy: ChatSendPolicy) -> Self {
        self.config.chat.send_policy = policy;
        self
    }

    pub fn build(self) -> TestHarness {
        let extractor = Arc::new(self.extractor);
        let generator = Arc::new(self.generator);
        let answerer = Arc::new(self.answerer);
        let session = Session::new(
            &self.config,
            Backends {
                extractor: extractor.clone(),
                generator: generator.clone(),
                answerer: answerer.clone(),
            },
        );
        TestHarness {
            session,
            extractor,
            generator,
            answerer,
        }
    }
}

/// A session wired to mock backends.
pub struct TestHarness {
    pub session: Session,
    pub extractor: Arc<MockExtractor>,
    pub generator: Arc<MockGenerator>,
    pub answerer: Arc<MockAnswerer>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Pastes `text` and starts a run.
    pub fn generate_from_text(&mut self, text: &str) -> Result<RunId, AbstractaError> {
        self.session.input_mut().set_text(text);
        self.session.generate()
    }

    /// Pastes `text`, runs the workflow, and waits for it to settle.
    pub async fn run_text(&mut self, text: &str) -> Result<WorkflowState, AbstractaError> {
        self.generate_from_text(text)?;
        Ok(self.session.wait().await)
    }
}

/// A pasted paper long enough to clear the input threshold.
pub fn sample_paper_text() -> String {
    [
        "Introduction",
        "Scientific abstracts are hard to write well and easy to write badly.",
        "Methods",
        "We trained a section-aware summarizer on a corpus of open-access papers.",
        "Results",
        "Generated abstracts reached high coherence against author-written ones.",
        "Discussion",
        "Automated drafting can help researchers communicate findings faster.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn harness_runs_a_session_to_completion() {
        let mut harness = TestHarness::builder()
            .with_mock_drafts(vec!["A scripted abstract.".to_string()])
            .build();
        let state = harness.run_text(&sample_paper_text()).await.unwrap();
        assert_eq!(state, WorkflowState::Completed);
        assert_eq!(harness.session.result().unwrap().text, "A scripted abstract.");
    }
}
