// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the workflow controller, the chat sub-flow, and the
//! backend adapters.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by backend health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is operational but experiencing issues.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}

/// Identifies which external collaborator a backend adapter stands in for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Extraction,
    Generation,
    QuestionAnswering,
}

// --- Workflow ---

/// Overall state of the generation workflow. Exactly one is active at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    #[default]
    Idle,
    Processing,
    Completed,
    Error,
}

/// The four pipeline stages, in execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    Extract,
    Analyze,
    Summarize,
    Finalize,
}

impl StepId {
    /// Fixed execution order of the pipeline.
    pub const ORDER: [StepId; 4] = [
        StepId::Extract,
        StepId::Analyze,
        StepId::Summarize,
        StepId::Finalize,
    ];

    /// Human-readable label shown next to the step.
    pub fn label(self) -> &'static str {
        match self {
            StepId::Extract => "Extracting document",
            StepId::Analyze => "Analyzing sections",
            StepId::Summarize => "Summarizing",
            StepId::Finalize => "Finalizing abstract",
        }
    }
}

/// Status of a single pipeline step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Active,
    Completed,
    /// The step aborted the run; later steps stay pending.
    Failed,
}

/// One named stage of the pipeline with its status and optional status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub label: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Step {
    pub fn pending(id: StepId) -> Self {
        Self {
            id,
            label: id.label().to_string(),
            status: StepStatus::Pending,
            message: None,
        }
    }

    /// The full step list in pipeline order, all pending.
    pub fn initial_sequence() -> Vec<Step> {
        StepId::ORDER.iter().copied().map(Step::pending).collect()
    }
}

// --- Generation parameters ---

/// Operating mode. `Interactive` enables grounding and the post-generation chat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Fast, deterministic abstracts with stable phrasing.
    #[default]
    Transformer,
    /// Conversational abstracts with follow-up questions about the paper.
    #[serde(alias = "llm")]
    #[strum(to_string = "interactive", serialize = "llm")]
    Interactive,
}

impl GenerationMode {
    pub fn description(self) -> &'static str {
        match self {
            GenerationMode::Transformer => {
                "Fast, deterministic abstracts optimized for scientific language; best when you want stable, repeatable outputs."
            }
            GenerationMode::Interactive => {
                "Conversational abstracts with the ability to ask questions about the paper; best when you want interactive exploration."
            }
        }
    }
}

/// Target length of the abstract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum WordBudget {
    Words150,
    #[default]
    Words220,
    Words300,
    Words400,
}

impl WordBudget {
    pub const ALL: [WordBudget; 4] = [
        WordBudget::Words150,
        WordBudget::Words220,
        WordBudget::Words300,
        WordBudget::Words400,
    ];

    pub fn words(self) -> u32 {
        match self {
            WordBudget::Words150 => 150,
            WordBudget::Words220 => 220,
            WordBudget::Words300 => 300,
            WordBudget::Words400 => 400,
        }
    }
}

impl TryFrom<u32> for WordBudget {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        WordBudget::ALL
            .into_iter()
            .find(|b| b.words() == value)
            .ok_or_else(|| format!("word budget must be one of 150, 220, 300, 400; got {value}"))
    }
}

impl From<WordBudget> for u32 {
    fn from(value: WordBudget) -> Self {
        value.words()
    }
}

impl std::fmt::Display for WordBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "~{} words", self.words())
    }
}

/// Publication style the abstract is phrased for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AbstractStyle {
    #[default]
    Generic,
    Ieee,
    Arxiv,
    Nature,
}

impl AbstractStyle {
    pub fn label(self) -> &'static str {
        match self {
            AbstractStyle::Generic => "Generic",
            AbstractStyle::Ieee => "IEEE-concise",
            AbstractStyle::Arxiv => "arXiv-neutral",
            AbstractStyle::Nature => "Nature-compact",
        }
    }
}

/// User-editable generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub word_budget: WordBudget,
    pub style: AbstractStyle,
    /// Only honoured in interactive mode.
    pub ground_with_evidence: bool,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            word_budget: WordBudget::default(),
            style: AbstractStyle::default(),
            ground_with_evidence: true,
        }
    }
}

impl GenerationParameters {
    /// Grounding only applies when the interactive mode is selected.
    pub fn grounding_active(&self, mode: GenerationMode) -> bool {
        self.ground_with_evidence && mode == GenerationMode::Interactive
    }
}

// --- Input ---

/// Document types the extraction backend accepts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Pdf,
    Docx,
    #[strum(serialize = "text")]
    #[serde(rename = "text")]
    PlainText,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [MediaType::Pdf, MediaType::Docx, MediaType::PlainText];

    pub fn mime(self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            MediaType::PlainText => "text/plain",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        MediaType::ALL
            .into_iter()
            .find(|m| m.mime().eq_ignore_ascii_case(essence))
    }

    /// Guess a media type from a file name's extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(MediaType::Pdf),
            "docx" => Some(MediaType::Docx),
            "txt" => Some(MediaType::PlainText),
            _ => None,
        }
    }
}

/// An uploaded document: name, the media type it was declared with, and its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub name: String,
    pub declared_type: String,
    pub bytes: Arc<[u8]>,
}

impl DocumentFile {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Build a file whose declared type is inferred from its extension.
    /// Unknown extensions are declared as `application/octet-stream`.
    pub fn from_named_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let declared = MediaType::from_file_name(&name)
            .map(MediaType::mime)
            .unwrap_or("application/octet-stream");
        Self::new(name, declared, bytes)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::from_mime(&self.declared_type)
    }
}

/// Which input source feeds generation when both are present.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    #[default]
    File,
    Text,
}

/// The resolved input handed to the extraction backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    File(DocumentFile),
    Text(String),
}

impl DocumentInput {
    pub fn source(&self) -> InputSource {
        match self {
            DocumentInput::File(_) => InputSource::File,
            DocumentInput::Text(_) => InputSource::Text,
        }
    }
}

// --- Extraction and generation ---

/// A detected section boundary inside the extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Byte offset of the heading in [`ExtractedDocument::text`].
    pub offset: usize,
}

/// Output of the extraction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub text: String,
    /// `None` for pasted text.
    pub media_type: Option<MediaType>,
    pub sections: Vec<Section>,
}

/// A supporting excerpt tied to a document section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceExcerpt {
    pub id: String,
    pub section: String,
    pub snippet: String,
}

/// Input to the summarization backend.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub document: Arc<ExtractedDocument>,
    pub word_budget: WordBudget,
    pub style: AbstractStyle,
    pub grounded: bool,
}

/// A generated abstract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAbstract {
    pub text: String,
    pub word_count: usize,
    pub style: AbstractStyle,
    pub word_budget: WordBudget,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceExcerpt>,
}

// --- Chat ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
    /// Set on an assistant turn that reports a backend failure.
    #[serde(default)]
    pub failed: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            role: ChatRole::User,
            content: content.into(),
            citations: Vec::new(),
            failed: false,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(turn: AssistantTurn) -> Self {
        Self {
            id: MessageId::generate(),
            role: ChatRole::Assistant,
            content: turn.content,
            citations: turn.citations,
            failed: false,
            created_at: Utc::now(),
        }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            role: ChatRole::Assistant,
            content: diagnostic.into(),
            citations: Vec::new(),
            failed: true,
            created_at: Utc::now(),
        }
    }
}

/// Input to the question-answering backend.
#[derive(Debug, Clone)]
pub struct QuestionRequest {
    pub question: String,
    /// Conversation so far, excluding failed turns and the question itself.
    pub history: Vec<ChatMessage>,
    pub document: Option<Arc<ExtractedDocument>>,
    pub grounded: bool,
}

/// One assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssistantTurn {
    pub content: String,
    #[serde(default)]
    pub citations: Vec<String>,
}
