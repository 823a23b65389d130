// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input selection: an uploaded document, pasted text, or both.
//!
//! The selector decides whether generation can start and which source feeds
//! it. Sources are never merged.

use std::sync::LazyLock;

use abstracta_config::InputConfig;
use abstracta_core::{AbstractaError, DocumentFile, DocumentInput, InputSource};
use regex::Regex;
use tracing::{debug, warn};

static LEADING_LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\s*").expect("valid line number pattern"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Tracks the uploaded file, the pasted text, and which of the two is active.
#[derive(Debug, Clone)]
pub struct InputSelector {
    config: InputConfig,
    file: Option<DocumentFile>,
    text: String,
    active_source: InputSource,
}

impl InputSelector {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            file: None,
            text: String::new(),
            active_source: InputSource::default(),
        }
    }

    /// Offers a document. Unsupported, oversized, or empty documents are
    /// refused with a reason and the previous selection is kept.
    pub fn select_file(&mut self, file: DocumentFile) -> Result<(), AbstractaError> {
        if !self.config.accepts(&file.declared_type) {
            warn!(name = %file.name, declared = %file.declared_type, "rejected unsupported file type");
            return Err(AbstractaError::UnsupportedMediaType {
                name: file.name,
                declared: file.declared_type,
            });
        }

        let size = file.size();
        if size > self.config.max_file_bytes {
            warn!(name = %file.name, size, limit = self.config.max_file_bytes, "rejected oversized file");
            return Err(AbstractaError::FileTooLarge {
                name: file.name,
                size,
                limit: self.config.max_file_bytes,
            });
        }

        if size == 0 {
            warn!(name = %file.name, "rejected empty file");
            return Err(AbstractaError::EmptyFile { name: file.name });
        }

        debug!(name = %file.name, size, "file selected");
        self.file = Some(file);
        Ok(())
    }

    pub fn clear_file(&mut self) {
        self.file = None;
    }

    pub fn file(&self) -> Option<&DocumentFile> {
        self.file.as_ref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn active_source(&self) -> InputSource {
        self.active_source
    }

    pub fn set_active_source(&mut self, source: InputSource) {
        self.active_source = source;
    }

    /// Character count of the pasted text after trimming surrounding whitespace.
    pub fn text_len(&self) -> usize {
        self.text.trim().chars().count()
    }

    /// Whether the pasted text alone is long enough to generate from.
    pub fn text_is_sufficient(&self) -> bool {
        self.text_len() > self.config.min_text_chars
    }

    /// True iff a file is present or the pasted text exceeds the threshold.
    pub fn can_generate(&self) -> bool {
        self.file.is_some() || self.text_is_sufficient()
    }

    /// Both sources hold something, so the caller has to pick one.
    pub fn needs_source_choice(&self) -> bool {
        self.file.is_some() && !self.text.trim().is_empty()
    }

    /// Resolves the input to generate from.
    ///
    /// The active source wins when it is usable; otherwise the other source is
    /// used if it is usable on its own.
    pub fn resolve(&self) -> Result<DocumentInput, AbstractaError> {
        let from_file = || self.file.clone().map(DocumentInput::File);
        let from_text = || {
            self.text_is_sufficient()
                .then(|| DocumentInput::Text(self.text.trim().to_string()))
        };

        let resolved = match self.active_source {
            InputSource::File => from_file().or_else(from_text),
            InputSource::Text => from_text().or_else(from_file),
        };

        resolved.ok_or_else(|| AbstractaError::InputNotReady {
            reason: format!(
                "select a document or paste more than {} characters of text",
                self.config.min_text_chars
            ),
        })
    }

    /// Cleans pasted text: strips leading line numbers, collapses whitespace
    /// runs to a single space, and trims.
    pub fn clean_formatting(&mut self) {
        self.text = clean_text(&self.text);
    }
}

/// The text transformation behind [`InputSelector::clean_formatting`].
pub fn clean_text(text: &str) -> String {
    let without_numbers = LEADING_LINE_NUMBER.replace_all(text, "");
    WHITESPACE_RUN
        .replace_all(&without_numbers, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use abstracta_core::MediaType;
    use proptest::prelude::*;

    fn selector() -> InputSelector {
        InputSelector::new(InputConfig::default())
    }

    fn pdf(bytes: usize) -> DocumentFile {
        DocumentFile::new("paper.pdf", MediaType::Pdf.mime(), vec![b'%'; bytes])
    }

    #[test]
    fn empty_selector_cannot_generate() {
        let s = selector();
        assert!(!s.can_generate());
        assert!(matches!(s.resolve(), Err(AbstractaError::InputNotReady { .. })));
    }

    #[test]
    fn threshold_boundary_is_strict() {
        let mut s = selector();
        s.set_text("a".repeat(100));
        assert!(!s.can_generate());
        s.set_text("a".repeat(101));
        assert!(s.can_generate());
    }

    #[test]
    fn surrounding_whitespace_does_not_count() {
        let mut s = selector();
        s.set_text(format!("   {}\n\n", "a".repeat(100)));
        assert!(!s.can_generate());
    }

    #[test]
    fn file_alone_enables_generation() {
        let mut s = selector();
        s.select_file(pdf(10)).unwrap();
        assert!(s.can_generate());
        assert!(matches!(s.resolve(), Ok(DocumentInput::File(_))));
    }

    #[test]
    fn unsupported_type_is_rejected_with_reason() {
        let mut s = selector();
        let err = s
            .select_file(DocumentFile::new("image.png", "image/png", vec![1]))
            .unwrap_err();
        assert!(matches!(err, AbstractaError::UnsupportedMediaType { ref declared, .. } if declared == "image/png"));
        assert!(s.file().is_none());
    }

    #[test]
    fn rejection_keeps_previous_file() {
        let mut s = selector();
        s.select_file(pdf(10)).unwrap();
        let too_big = pdf(InputConfig::default().max_file_bytes as usize + 1);
        assert!(matches!(
            s.select_file(too_big),
            Err(AbstractaError::FileTooLarge { .. })
        ));
        assert_eq!(s.file().map(|f| f.size()), Some(10));
    }

    #[test]
    fn empty_file_is_rejected() {
        let mut s = selector();
        assert!(matches!(
            s.select_file(pdf(0)),
            Err(AbstractaError::EmptyFile { .. })
        ));
    }

    #[test]
    fn file_is_the_default_source_when_both_present() {
        let mut s = selector();
        s.select_file(pdf(10)).unwrap();
        s.set_text("b".repeat(150));
        assert!(s.needs_source_choice());
        assert!(matches!(s.resolve(), Ok(DocumentInput::File(_))));

        s.set_active_source(InputSource::Text);
        match s.resolve() {
            Ok(DocumentInput::Text(t)) => assert_eq!(t.len(), 150),
            other => panic!("expected text input, got {other:?}"),
        }
    }

    #[test]
    fn short_active_text_falls_back_to_file() {
        let mut s = selector();
        s.select_file(pdf(10)).unwrap();
        s.set_text("too short");
        s.set_active_source(InputSource::Text);
        assert!(matches!(s.resolve(), Ok(DocumentInput::File(_))));
    }

    #[test]
    fn clearing_is_independent() {
        let mut s = selector();
        s.select_file(pdf(10)).unwrap();
        s.set_text("c".repeat(120));
        s.clear_file();
        assert!(s.can_generate());
        assert_eq!(s.text_len(), 120);
        s.clear_text();
        assert!(!s.can_generate());
    }

    #[test]
    fn clean_formatting_strips_numbers_and_whitespace() {
        let mut s = selector();
        s.set_text("1 Introduction\n2   We study   things.\n\n3\tResults follow.  ");
        s.clean_formatting();
        assert_eq!(s.text(), "Introduction We study things. Results follow.");
    }

    proptest! {
        #[test]
        fn can_generate_matches_threshold(len in 0usize..300, with_file in any::<bool>()) {
            let mut s = selector();
            s.set_text("x".repeat(len));
            if with_file {
                s.select_file(pdf(1)).unwrap();
            }
            prop_assert_eq!(s.can_generate(), with_file || len > 100);
        }
    }
}
