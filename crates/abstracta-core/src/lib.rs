// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Abstracta.
//!
//! This crate provides the error type, the domain types of the abstract
//! generation workflow, and the adapter traits for its external collaborators
//! (document extraction, summarization, question answering).

pub mod error;
pub mod text;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::AbstractaError;
pub use types::{
    AbstractStyle, AdapterType, ChatMessage, ChatRole, DocumentFile, DocumentInput,
    GeneratedAbstract, GenerationMode, GenerationParameters, HealthStatus, InputSource,
    MediaType, MessageId, RunId, Step, StepId, StepStatus, WordBudget, WorkflowState,
};

// Re-export all adapter traits at crate root.
pub use traits::{AbstractGenerator, BackendAdapter, DocumentExtractor, QuestionAnswerer};
