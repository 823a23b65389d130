// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Question-answering backend for the post-generation chat.

use async_trait::async_trait;

use crate::error::AbstractaError;
use crate::traits::adapter::BackendAdapter;
use crate::types::{AssistantTurn, QuestionRequest};

/// Adapter for the question-answering backend.
#[async_trait]
pub trait QuestionAnswerer: BackendAdapter {
    /// Produces exactly one assistant turn for the question, with optional citations.
    async fn answer(&self, request: QuestionRequest) -> Result<AssistantTurn, AbstractaError>;
}
