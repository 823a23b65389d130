// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow controller: the idle -> processing -> completed state machine.
//!
//! A run walks the fixed step sequence (extract, analyze, summarize, finalize)
//! strictly one step at a time. Each step races its backend call against a
//! per-stage cancellation token and the configured step timeout. A failing
//! step moves the workflow to `error` and no later step runs.
//!
//! Writes from a run are tagged with its [`RunId`]; once a run is cancelled or
//! superseded its late writes are dropped.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use abstracta_config::PipelineConfig;
use abstracta_core::types::{ExtractedDocument, GenerationRequest};
use abstracta_core::{
    AbstractGenerator, AbstractaError, DocumentExtractor, DocumentInput, GeneratedAbstract,
    GenerationMode, GenerationParameters, MediaType, RunId, Step, StepId, StepStatus,
    WorkflowState,
};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

/// Progress notifications, delivered in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    Started { run_id: RunId },
    StepStarted { run_id: RunId, step: StepId, message: String },
    StepCompleted { run_id: RunId, step: StepId, message: Option<String> },
    Completed { run_id: RunId, word_count: usize },
    Failed { run_id: RunId, step: StepId, reason: String },
    Cancelled { run_id: RunId, step: Option<StepId> },
    /// Steps and result were cleared and the workflow is idle again.
    Reset,
}

#[derive(Debug, Default)]
struct Snapshot {
    state: WorkflowState,
    steps: Vec<Step>,
    run_id: Option<RunId>,
    result: Option<GeneratedAbstract>,
    document: Option<Arc<ExtractedDocument>>,
    error: Option<String>,
}

impl Snapshot {
    fn new() -> Self {
        Self {
            steps: Step::initial_sequence(),
            ..Default::default()
        }
    }

    fn reset(&mut self) {
        self.steps = Step::initial_sequence();
        self.run_id = None;
        self.result = None;
        self.document = None;
        self.error = None;
    }

    fn step_mut(&mut self, id: StepId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == id)
    }

    fn active_step(&self) -> Option<StepId> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::Active)
            .map(|s| s.id)
    }
}

/// State shared between the controller and its spawned run.
struct Shared {
    snapshot: Mutex<Snapshot>,
    state_tx: watch::Sender<WorkflowState>,
    events: broadcast::Sender<WorkflowEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Changes state; must be called with the snapshot lock held so the watch
    /// value never disagrees with the snapshot.
    fn set_state(&self, snap: &mut Snapshot, state: WorkflowState) {
        snap.state = state;
        self.state_tx.send_replace(state);
    }

    fn emit(&self, event: WorkflowEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Owns the workflow state and step list and drives generation runs.
pub struct WorkflowController {
    shared: Arc<Shared>,
    extractor: Arc<dyn DocumentExtractor>,
    generator: Arc<dyn AbstractGenerator>,
    config: PipelineConfig,
    current: Mutex<Option<CancellationToken>>,
}

impl WorkflowController {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        generator: Arc<dyn AbstractGenerator>,
        config: PipelineConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(WorkflowState::Idle);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                snapshot: Mutex::new(Snapshot::new()),
                state_tx,
                events,
            }),
            extractor,
            generator,
            config,
            current: Mutex::new(None),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.shared.lock().state
    }

    pub fn steps(&self) -> Vec<Step> {
        self.shared.lock().steps.clone()
    }

    pub fn active_step(&self) -> Option<StepId> {
        self.shared.lock().active_step()
    }

    /// The finished abstract, present only in `completed`.
    pub fn result(&self) -> Option<GeneratedAbstract> {
        self.shared.lock().result.clone()
    }

    /// The extracted document of the current run, once extraction finished.
    pub fn document(&self) -> Option<Arc<ExtractedDocument>> {
        self.shared.lock().document.clone()
    }

    /// Diagnostic of the failed step, present only in `error`.
    pub fn last_error(&self) -> Option<String> {
        self.shared.lock().error.clone()
    }

    pub fn run_id(&self) -> Option<RunId> {
        self.shared.lock().run_id.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.shared.events.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<WorkflowState> {
        self.shared.state_tx.subscribe()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Starts a run. Allowed from `idle` and, as a retry, from `error`.
    ///
    /// Must be called from within a Tokio runtime; the run is spawned and this
    /// returns as soon as the workflow is `processing`.
    pub fn start(
        &self,
        input: DocumentInput,
        params: GenerationParameters,
        mode: GenerationMode,
    ) -> Result<RunId, AbstractaError> {
        let run_id = RunId::generate();
        {
            let mut snap = self.shared.lock();
            match snap.state {
                WorkflowState::Idle | WorkflowState::Error => {}
                from => {
                    return Err(AbstractaError::InvalidTransition {
                        from,
                        action: "start generation",
                    });
                }
            }
            snap.reset();
            snap.run_id = Some(run_id.clone());
            self.shared.set_state(&mut snap, WorkflowState::Processing);
        }

        let token = CancellationToken::new();
        if let Some(previous) = self.lock_current().replace(token.clone()) {
            previous.cancel();
        }

        let grounded = params.grounding_active(mode);
        info!(
            run_id = %run_id,
            source = %input.source(),
            word_budget = params.word_budget.words(),
            style = %params.style,
            grounded,
            "generation started"
        );
        self.shared.emit(WorkflowEvent::Started {
            run_id: run_id.clone(),
        });

        let run = PipelineRun {
            shared: self.shared.clone(),
            extractor: self.extractor.clone(),
            generator: self.generator.clone(),
            config: self.config.clone(),
            run_id: run_id.clone(),
            token,
            input,
            params,
            grounded,
        };
        tokio::spawn(run.execute());

        Ok(run_id)
    }

    /// Aborts the in-flight run, if any, and returns the workflow to `idle`
    /// with all steps pending. Returns whether a run was cancelled.
    pub fn cancel(&self) -> bool {
        if let Some(token) = self.lock_current().take() {
            token.cancel();
        }

        let mut snap = self.shared.lock();
        if snap.state != WorkflowState::Processing {
            return false;
        }
        let step = snap.active_step();
        let run_id = snap.run_id.clone();
        snap.reset();
        self.shared.set_state(&mut snap, WorkflowState::Idle);
        drop(snap);

        if let Some(run_id) = run_id {
            info!(run_id = %run_id, step = ?step, "generation cancelled");
            self.shared.emit(WorkflowEvent::Cancelled { run_id, step });
        }
        true
    }

    /// Returns to `idle`: steps back to pending without messages and the
    /// result cleared. An in-flight run is cancelled first.
    pub fn regenerate(&self) -> Result<(), AbstractaError> {
        self.cancel();

        let mut snap = self.shared.lock();
        match snap.state {
            WorkflowState::Idle if snap.run_id.is_none() && snap.result.is_none() => {
                return Ok(());
            }
            WorkflowState::Processing => {
                return Err(AbstractaError::InvalidTransition {
                    from: WorkflowState::Processing,
                    action: "regenerate",
                });
            }
            _ => {}
        }
        snap.reset();
        self.shared.set_state(&mut snap, WorkflowState::Idle);
        drop(snap);

        debug!("workflow reset for regeneration");
        self.shared.emit(WorkflowEvent::Reset);
        Ok(())
    }

    /// Waits until the workflow is no longer `processing` and returns the state
    /// it settled in.
    pub async fn wait(&self) -> WorkflowState {
        let mut rx = self.shared.state_tx.subscribe();
        match rx.wait_for(|s| *s != WorkflowState::Processing).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkflowController {
    fn drop(&mut self) {
        if let Some(token) = self.lock_current().take() {
            token.cancel();
        }
    }
}

/// One spawned generation run.
struct PipelineRun {
    shared: Arc<Shared>,
    extractor: Arc<dyn DocumentExtractor>,
    generator: Arc<dyn AbstractGenerator>,
    config: PipelineConfig,
    run_id: RunId,
    token: CancellationToken,
    input: DocumentInput,
    params: GenerationParameters,
    grounded: bool,
}

/// Intermediate products handed from one step to the next.
#[derive(Default)]
struct RunContext {
    document: Option<Arc<ExtractedDocument>>,
    draft: Option<GeneratedAbstract>,
}

impl PipelineRun {
    async fn execute(self) {
        let mut ctx = RunContext::default();

        for step in StepId::ORDER {
            let message = self.activation_message(step);
            let activated = self.update(|snap| {
                if let Some(s) = snap.step_mut(step) {
                    s.status = StepStatus::Active;
                    s.message = Some(message.clone());
                }
            });
            if !activated {
                return;
            }
            debug!(run_id = %self.run_id, step = %step, "step started");
            self.shared.emit(WorkflowEvent::StepStarted {
                run_id: self.run_id.clone(),
                step,
                message,
            });

            match self.run_step(step, &mut ctx).await {
                Ok(completion) => {
                    let document = ctx.document.clone();
                    let completed = self.update(|snap| {
                        if let Some(s) = snap.step_mut(step) {
                            s.status = StepStatus::Completed;
                            if let Some(m) = &completion {
                                s.message = Some(m.clone());
                            }
                        }
                        if document.is_some() {
                            snap.document = document;
                        }
                    });
                    if !completed {
                        return;
                    }
                    debug!(run_id = %self.run_id, step = %step, "step completed");
                    self.shared.emit(WorkflowEvent::StepCompleted {
                        run_id: self.run_id.clone(),
                        step,
                        message: completion,
                    });
                }
                Err(AbstractaError::Cancelled) => {
                    debug!(run_id = %self.run_id, step = %step, "step aborted by cancellation");
                    return;
                }
                Err(err) => {
                    self.fail(step, err);
                    return;
                }
            }
        }

        self.finish(ctx.draft);
    }

    /// Runs one step's backend call and returns its completion message.
    async fn run_step(
        &self,
        step: StepId,
        ctx: &mut RunContext,
    ) -> Result<Option<String>, AbstractaError> {
        match step {
            StepId::Extract => {
                let document = self.guarded(self.extractor.extract(&self.input)).await?;
                let message = extraction_message(&self.input, &document);
                ctx.document = Some(Arc::new(document));
                Ok(Some(message))
            }
            StepId::Analyze => {
                let document = require(&ctx.document, "analyze")?;
                let sections = self
                    .guarded(self.extractor.detect_sections(document.as_ref()))
                    .await?;
                let message = format!(
                    "Detected: {}",
                    sections
                        .iter()
                        .map(|s| s.title.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                let mut analyzed = ExtractedDocument::clone(&document);
                analyzed.sections = sections;
                ctx.document = Some(Arc::new(analyzed));
                Ok(Some(message))
            }
            StepId::Summarize => {
                let document = require(&ctx.document, "summarize")?;
                let request = GenerationRequest {
                    document,
                    word_budget: self.params.word_budget,
                    style: self.params.style,
                    grounded: self.grounded,
                };
                let draft = self.guarded(self.generator.generate(request)).await?;
                ctx.draft = Some(draft);
                Ok(None)
            }
            StepId::Finalize => {
                let draft = ctx.draft.take().ok_or_else(|| {
                    AbstractaError::Internal("finalize ran without a draft".to_string())
                })?;
                let finalized = self
                    .guarded(self.generator.finalize(draft, &self.params, self.grounded))
                    .await?;
                ctx.draft = Some(finalized);
                Ok(Some("Abstract generated successfully".to_string()))
            }
        }
    }

    /// Races a stage against its cancellation token and the step timeout.
    async fn guarded<T>(
        &self,
        stage: impl Future<Output = Result<T, AbstractaError>>,
    ) -> Result<T, AbstractaError> {
        let stage_token = self.token.child_token();
        let timeout = self.config.step_timeout();
        tokio::select! {
            biased;
            _ = stage_token.cancelled() => Err(AbstractaError::Cancelled),
            outcome = tokio::time::timeout(timeout, stage) => match outcome {
                Ok(result) => result,
                Err(_) => Err(AbstractaError::Timeout { duration: timeout }),
            },
        }
    }

    fn activation_message(&self, step: StepId) -> String {
        match step {
            StepId::Extract => match &self.input {
                DocumentInput::File(file) => format!("Reading {}", file.name),
                DocumentInput::Text(_) => "Reading pasted text".to_string(),
            },
            StepId::Analyze => "Detecting document sections".to_string(),
            StepId::Summarize => {
                "Using section-aware summarization to preserve fidelity".to_string()
            }
            StepId::Finalize => format!("Fitting abstract to {}", self.params.word_budget),
        }
    }

    /// Applies `f` if this run is still the current, processing run.
    fn update(&self, f: impl FnOnce(&mut Snapshot)) -> bool {
        let mut snap = self.shared.lock();
        if snap.state != WorkflowState::Processing || snap.run_id.as_ref() != Some(&self.run_id)
        {
            return false;
        }
        f(&mut snap);
        true
    }

    fn fail(&self, step: StepId, err: AbstractaError) {
        let reason = err.to_string();
        let mut snap = self.shared.lock();
        if snap.state != WorkflowState::Processing || snap.run_id.as_ref() != Some(&self.run_id) {
            return;
        }
        if let Some(s) = snap.step_mut(step) {
            s.status = StepStatus::Failed;
            s.message = Some(reason.clone());
        }
        snap.error = Some(reason.clone());
        self.shared.set_state(&mut snap, WorkflowState::Error);
        drop(snap);

        warn!(run_id = %self.run_id, step = %step, error = %reason, "generation failed");
        self.shared.emit(WorkflowEvent::Failed {
            run_id: self.run_id.clone(),
            step,
            reason,
        });
    }

    fn finish(&self, result: Option<GeneratedAbstract>) {
        let Some(result) = result else {
            self.fail(
                StepId::Finalize,
                AbstractaError::Internal("run finished without an abstract".to_string()),
            );
            return;
        };
        let word_count = result.word_count;

        let mut snap = self.shared.lock();
        if snap.state != WorkflowState::Processing || snap.run_id.as_ref() != Some(&self.run_id) {
            return;
        }
        snap.result = Some(result);
        self.shared.set_state(&mut snap, WorkflowState::Completed);
        drop(snap);

        info!(run_id = %self.run_id, word_count, "generation completed");
        self.shared.emit(WorkflowEvent::Completed {
            run_id: self.run_id.clone(),
            word_count,
        });
    }
}

fn require(
    document: &Option<Arc<ExtractedDocument>>,
    step: &str,
) -> Result<Arc<ExtractedDocument>, AbstractaError> {
    document
        .clone()
        .ok_or_else(|| AbstractaError::Internal(format!("{step} ran before extraction")))
}

fn extraction_message(input: &DocumentInput, document: &ExtractedDocument) -> String {
    match (input, document.media_type) {
        (DocumentInput::Text(_), _) => "Pasted text loaded successfully".to_string(),
        (_, Some(MediaType::Pdf)) => "PDF parsed successfully".to_string(),
        (_, Some(MediaType::Docx)) => "DOCX parsed successfully".to_string(),
        (_, Some(MediaType::PlainText)) => "Text file loaded successfully".to_string(),
        (DocumentInput::File(_), None) => "Document parsed successfully".to_string(),
    }
}
