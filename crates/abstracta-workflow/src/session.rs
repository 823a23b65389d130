// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One user session: mode, input, parameters, workflow, and chat together.

use std::sync::Arc;

use abstracta_config::AbstractaConfig;
use abstracta_core::{
    AbstractGenerator, AbstractStyle, AbstractaError, ChatMessage, DocumentExtractor,
    GeneratedAbstract, GenerationMode, GenerationParameters, QuestionAnswerer, RunId, Step,
    WordBudget, WorkflowState,
};
use tracing::{debug, info};

use crate::chat::{ChatContext, ChatSession, SendOutcome};
use crate::export::{export_abstract, ExportFormat};
use crate::input::InputSelector;
use crate::workflow::WorkflowController;

/// The three external collaborators a session talks to.
#[derive(Clone)]
pub struct Backends {
    pub extractor: Arc<dyn DocumentExtractor>,
    pub generator: Arc<dyn AbstractGenerator>,
    pub answerer: Arc<dyn QuestionAnswerer>,
}

/// Session state. The workflow and the chat each own their own state; a
/// failure in one never touches the other.
pub struct Session {
    mode: GenerationMode,
    input: InputSelector,
    params: GenerationParameters,
    workflow: WorkflowController,
    chat: ChatSession,
}

impl Session {
    pub fn new(config: &AbstractaConfig, backends: Backends) -> Self {
        Self {
            mode: config.session.mode,
            input: InputSelector::new(config.input.clone()),
            params: config.parameters.to_parameters(),
            workflow: WorkflowController::new(
                backends.extractor,
                backends.generator,
                config.pipeline.clone(),
            ),
            chat: ChatSession::new(backends.answerer, config.chat.clone()),
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GenerationMode) {
        if self.mode != mode {
            debug!(from = %self.mode, to = %mode, "mode changed");
            self.mode = mode;
        }
    }

    pub fn input(&self) -> &InputSelector {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputSelector {
        &mut self.input
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    pub fn set_word_budget(&mut self, budget: WordBudget) {
        self.params.word_budget = budget;
    }

    pub fn set_style(&mut self, style: AbstractStyle) {
        self.params.style = style;
    }

    pub fn set_ground_with_evidence(&mut self, enabled: bool) {
        self.params.ground_with_evidence = enabled;
    }

    /// Whether source grounding applies to the next run and to chat replies.
    pub fn grounding_active(&self) -> bool {
        self.params.grounding_active(self.mode)
    }

    pub fn workflow(&self) -> &WorkflowController {
        &self.workflow
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn state(&self) -> WorkflowState {
        self.workflow.state()
    }

    pub fn steps(&self) -> Vec<Step> {
        self.workflow.steps()
    }

    pub fn result(&self) -> Option<GeneratedAbstract> {
        self.workflow.result()
    }

    /// Starts generation from the resolved input with the current parameters.
    pub fn generate(&self) -> Result<RunId, AbstractaError> {
        let input = self.input.resolve()?;
        self.workflow.start(input, self.params, self.mode)
    }

    /// Waits for the current run to settle.
    pub async fn wait(&self) -> WorkflowState {
        self.workflow.wait().await
    }

    /// Back to idle. A pending chat request is abandoned; input, parameters
    /// and earlier chat messages stay.
    pub fn regenerate(&self) -> Result<(), AbstractaError> {
        self.chat.cancel();
        self.workflow.regenerate()?;
        info!("session reset for regeneration");
        Ok(())
    }

    /// Cancels the in-flight run and any pending chat reply.
    pub fn cancel(&self) {
        self.workflow.cancel();
        self.chat.cancel();
    }

    pub fn chat_available(&self) -> bool {
        self.mode == GenerationMode::Interactive && self.state() == WorkflowState::Completed
    }

    pub fn send_message(&self, text: &str) -> Result<SendOutcome, AbstractaError> {
        if !self.chat_available() {
            return Err(AbstractaError::ChatUnavailable);
        }
        Ok(self.chat.send_message(text, self.chat_context()))
    }

    pub fn retry_chat(&self) -> Result<bool, AbstractaError> {
        if !self.chat_available() {
            return Err(AbstractaError::ChatUnavailable);
        }
        self.chat.retry_last()
    }

    pub fn clear_chat(&self) -> Result<(), AbstractaError> {
        self.chat.clear_chat()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.chat.messages()
    }

    /// Renders the finished abstract. Only available once the workflow completed.
    pub fn export(&self, format: ExportFormat) -> Result<String, AbstractaError> {
        let result = self
            .workflow
            .result()
            .ok_or(AbstractaError::InvalidTransition {
                from: self.state(),
                action: "export",
            })?;
        Ok(export_abstract(&result, format))
    }

    fn chat_context(&self) -> ChatContext {
        ChatContext {
            document: self.workflow.document(),
            grounded: self.grounding_active(),
        }
    }
}
