// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarization backend.

use async_trait::async_trait;

use crate::error::AbstractaError;
use crate::text::finalize_abstract;
use crate::traits::adapter::BackendAdapter;
use crate::types::{GeneratedAbstract, GenerationParameters, GenerationRequest};

/// Adapter for the summarization/generation backend.
///
/// Backs the *summarize* and *finalize* pipeline steps.
#[async_trait]
pub trait AbstractGenerator: BackendAdapter {
    /// Produces a draft abstract for the extracted document.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedAbstract, AbstractaError>;

    /// Turns a draft into the final abstract. The default enforces the word
    /// budget and strips sources when grounding is off.
    async fn finalize(
        &self,
        draft: GeneratedAbstract,
        params: &GenerationParameters,
        grounded: bool,
    ) -> Result<GeneratedAbstract, AbstractaError> {
        Ok(finalize_abstract(draft, params, grounded))
    }
}
