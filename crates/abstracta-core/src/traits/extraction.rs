// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document extraction service: raw bytes in, text and section boundaries out.

use async_trait::async_trait;

use crate::error::AbstractaError;
use crate::traits::adapter::BackendAdapter;
use crate::types::{DocumentInput, ExtractedDocument, Section};

/// Adapter for the document extraction service.
///
/// Backs the *extract* and *analyze* pipeline steps.
#[async_trait]
pub trait DocumentExtractor: BackendAdapter {
    /// Extracts plain text from the input. Returns [`AbstractaError::Extraction`]
    /// with a diagnostic when the document cannot be read.
    async fn extract(&self, input: &DocumentInput) -> Result<ExtractedDocument, AbstractaError>;

    /// Detects section boundaries in extracted text.
    async fn detect_sections(
        &self,
        document: &ExtractedDocument,
    ) -> Result<Vec<Section>, AbstractaError>;
}
