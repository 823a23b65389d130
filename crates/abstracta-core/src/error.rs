// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Abstracta workflow.

use thiserror::Error;

use crate::types::WorkflowState;

/// The primary error type used across backend traits, the workflow controller,
/// and the chat sub-flow.
#[derive(Debug, Error)]
pub enum AbstractaError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A document was offered whose declared media type is not accepted.
    #[error("unsupported file type `{declared}` for {name}; accepted: PDF, DOCX, plain text")]
    UnsupportedMediaType { name: String, declared: String },

    /// A document exceeds the configured size limit.
    #[error("{name} is {size} bytes, larger than the {limit} byte limit")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    /// A document has no content at all.
    #[error("{name} is empty")]
    EmptyFile { name: String },

    /// Generation was requested before a usable input was selected.
    #[error("input not ready: {reason}")]
    InputNotReady { reason: String },

    /// Document extraction or section analysis failed.
    #[error("extraction failed: {message}")]
    Extraction {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The summarization backend failed.
    #[error("generation failed: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The question-answering backend failed.
    #[error("chat backend failed: {message}")]
    Chat {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An operation is not valid in the current workflow state.
    #[error("cannot {action} while workflow is {from}")]
    InvalidTransition {
        from: WorkflowState,
        action: &'static str,
    },

    /// Chat was used before the workflow completed in interactive mode.
    #[error("chat is only available after an interactive generation has completed")]
    ChatUnavailable,

    /// A chat operation was attempted while a reply is still pending.
    #[error("a chat reply is still pending")]
    ChatBusy,

    /// The operation was cancelled before it finished.
    #[error("operation cancelled")]
    Cancelled,

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AbstractaError {
    /// Shorthand for an extraction failure without an underlying source.
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a generation failure without an underlying source.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a chat backend failure without an underlying source.
    pub fn chat(message: impl Into<String>) -> Self {
        Self::Chat {
            message: message.into(),
            source: None,
        }
    }

    /// Whether the input was refused before any processing step could start.
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMediaType { .. }
                | Self::FileTooLarge { .. }
                | Self::EmptyFile { .. }
                | Self::InputNotReady { .. }
        )
    }
}
