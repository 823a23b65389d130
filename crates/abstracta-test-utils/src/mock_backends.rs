// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock backend adapters for deterministic testing.
//!
//! Each mock can be given a latency, a persistent failure, or one-shot
//! failures popped from a FIFO queue. Call counters and captured requests let
//! tests assert what the workflow asked for.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use abstracta_core::traits::{
    AbstractGenerator, BackendAdapter, DocumentExtractor, QuestionAnswerer,
};
use abstracta_core::types::{
    AssistantTurn, ExtractedDocument, GenerationRequest, QuestionRequest, Section, SourceExcerpt,
};
use abstracta_core::{
    AbstractaError, AdapterType, DocumentInput, GeneratedAbstract, HealthStatus,
};

const DEFAULT_SECTIONS: [&str; 4] = ["Introduction", "Methods", "Results", "Discussion"];

/// Scripted failures shared by all mocks.
#[derive(Default)]
struct FailureScript {
    always: Option<String>,
    next: Mutex<VecDeque<String>>,
}

impl FailureScript {
    fn take(&self) -> Option<String> {
        if let Some(message) = &self.always {
            return Some(message.clone());
        }
        self.next.lock().ok().and_then(|mut q| q.pop_front())
    }

    fn push(&self, message: &str) {
        if let Ok(mut q) = self.next.lock() {
            q.push_back(message.to_string());
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

macro_rules! mock_adapter {
    ($ty:ty, $name:literal, $kind:expr) => {
        #[async_trait]
        impl BackendAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                $kind
            }

            async fn health_check(&self) -> Result<HealthStatus, AbstractaError> {
                Ok(HealthStatus::Healthy)
            }
        }
    };
}

/// Mock extraction service. Pasted text passes through; files are decoded
/// lossily as UTF-8.
#[derive(Default)]
pub struct MockExtractor {
    delay: Duration,
    sections: Option<Vec<String>>,
    failures: FailureScript,
    calls: Arc<AtomicUsize>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// An extractor whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failures: FailureScript {
                always: Some(message.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Section titles reported by the analyze step.
    pub fn with_sections(mut self, titles: &[&str]) -> Self {
        self.sections = Some(titles.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Makes the next `extract` call fail with `message`.
    pub fn fail_next(&self, message: &str) {
        self.failures.push(message);
    }

    /// Counts `extract` calls.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

mock_adapter!(MockExtractor, "mock-extractor", AdapterType::Extraction);

#[async_trait]
impl DocumentExtractor for MockExtractor {
    async fn extract(&self, input: &DocumentInput) -> Result<ExtractedDocument, AbstractaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        if let Some(message) = self.failures.take() {
            return Err(AbstractaError::extraction(message));
        }
        Ok(match input {
            DocumentInput::Text(text) => ExtractedDocument {
                text: text.clone(),
                media_type: None,
                sections: Vec::new(),
            },
            DocumentInput::File(file) => ExtractedDocument {
                text: String::from_utf8_lossy(&file.bytes).into_owned(),
                media_type: file.media_type(),
                sections: Vec::new(),
            },
        })
    }

    async fn detect_sections(
        &self,
        document: &ExtractedDocument,
    ) -> Result<Vec<Section>, AbstractaError> {
        let titles = match &self.sections {
            Some(titles) => titles.clone(),
            None => DEFAULT_SECTIONS.iter().map(|t| t.to_string()).collect(),
        };
        Ok(titles
            .into_iter()
            .map(|title| Section {
                offset: document.text.find(&title).unwrap_or(0),
                title,
            })
            .collect())
    }
}

/// Mock summarization backend. Drafts are popped from a FIFO queue; when the
/// queue is empty a default draft is returned.
pub struct MockGenerator {
    delay: Duration,
    drafts: Mutex<VecDeque<String>>,
    sources: Vec<SourceExcerpt>,
    failures: FailureScript,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            drafts: Mutex::new(VecDeque::new()),
            sources: vec![SourceExcerpt {
                id: "1".to_string(),
                section: "Methods §2.1".to_string(),
                snippet: "Mock methods excerpt.".to_string(),
            }],
            failures: FailureScript::default(),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator pre-loaded with the given drafts.
    pub fn with_drafts(drafts: Vec<String>) -> Self {
        Self {
            drafts: Mutex::new(VecDeque::from(drafts)),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failures: FailureScript {
                always: Some(message.to_string()),
                ..Default::default()
            },
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_sources(mut self, sources: Vec<SourceExcerpt>) -> Self {
        self.sources = sources;
        self
    }

    pub fn fail_next(&self, message: &str) {
        self.failures.push(message);
    }

    /// Counts `generate` calls.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Every request passed to `generate`, in order.
    pub fn requests(&self) -> Arc<Mutex<Vec<GenerationRequest>>> {
        Arc::clone(&self.requests)
    }

    fn next_draft(&self) -> String {
        self.drafts
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| "Mock abstract describing the submitted paper.".to_string())
    }
}

mock_adapter!(MockGenerator, "mock-generator", AdapterType::Generation);

#[async_trait]
impl AbstractGenerator for MockGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedAbstract, AbstractaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        pause(self.delay).await;
        if let Some(message) = self.failures.take() {
            return Err(AbstractaError::generation(message));
        }
        let text = self.next_draft();
        Ok(GeneratedAbstract {
            word_count: text.split_whitespace().count(),
            text,
            style: request.style,
            word_budget: request.word_budget,
            sources: self.sources.clone(),
        })
    }
}

/// Mock question-answering backend.
pub struct MockAnswerer {
    delay: Duration,
    reply: String,
    citations: Vec<String>,
    failures: FailureScript,
    requests: Arc<Mutex<Vec<QuestionRequest>>>,
}

impl Default for MockAnswerer {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            reply: "mock reply".to_string(),
            citations: vec!["Results §3.4".to_string()],
            failures: FailureScript::default(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockAnswerer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = reply.to_string();
        self
    }

    /// Citations attached to grounded replies.
    pub fn with_citations(mut self, citations: &[&str]) -> Self {
        self.citations = citations.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_next(&self, message: &str) {
        self.failures.push(message);
    }

    /// Every request passed to `answer`, in order.
    pub fn requests(&self) -> Arc<Mutex<Vec<QuestionRequest>>> {
        Arc::clone(&self.requests)
    }
}

mock_adapter!(MockAnswerer, "mock-answerer", AdapterType::QuestionAnswering);

#[async_trait]
impl QuestionAnswerer for MockAnswerer {
    async fn answer(&self, request: QuestionRequest) -> Result<AssistantTurn, AbstractaError> {
        let grounded = request.grounded;
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request);
        }
        pause(self.delay).await;
        if let Some(message) = self.failures.take() {
            return Err(AbstractaError::chat(message));
        }
        Ok(AssistantTurn {
            content: self.reply.clone(),
            citations: if grounded { self.citations.clone() } else { Vec::new() },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_shot_failure_is_consumed() {
        let extractor = MockExtractor::new();
        extractor.fail_next("boom");
        let input = DocumentInput::Text("hello".into());
        assert!(extractor.extract(&input).await.is_err());
        let doc = extractor.extract(&input).await.unwrap();
        assert_eq!(doc.text, "hello");
        assert_eq!(extractor.call_counter().load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn drafts_are_served_in_order() {
        let generator = MockGenerator::with_drafts(vec!["first draft".into()]);
        let request = GenerationRequest {
            document: Arc::new(ExtractedDocument {
                text: String::new(),
                media_type: None,
                sections: vec![],
            }),
            word_budget: Default::default(),
            style: Default::default(),
            grounded: false,
        };
        assert_eq!(generator.generate(request.clone()).await.unwrap().text, "first draft");
        assert!(generator.generate(request).await.unwrap().text.starts_with("Mock abstract"));
    }

    #[tokio::test]
    async fn citations_only_when_grounded() {
        let answerer = MockAnswerer::new();
        let ask = |grounded| QuestionRequest {
            question: "q".into(),
            history: vec![],
            document: None,
            grounded,
        };
        assert!(answerer.answer(ask(false)).await.unwrap().citations.is_empty());
        assert_eq!(answerer.answer(ask(true)).await.unwrap().citations.len(), 1);
    }
}
