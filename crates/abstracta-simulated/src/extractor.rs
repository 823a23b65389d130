// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated document extraction and section detection.

use std::sync::LazyLock;
use std::time::Duration;

use abstracta_config::PipelineConfig;
use abstracta_core::traits::{BackendAdapter, DocumentExtractor};
use abstracta_core::types::{ExtractedDocument, Section};
use abstracta_core::{
    AbstractaError, AdapterType, DocumentFile, DocumentInput, HealthStatus, MediaType, StepId,
};
use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::sample::SAMPLE_PAPER;
use crate::simulate_latency;

/// A heading on its own line, optionally numbered ("2.", "3.1").
static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^[ \t]*(?:\d+(?:\.\d+)*\.?[ \t]+)?(introduction|background|related work|methodology|methods|results|discussion|conclusions?|limitations)[ \t]*:?[ \t]*$",
    )
    .expect("valid section heading pattern")
});

const FALLBACK_SECTIONS: [&str; 4] = ["Introduction", "Methods", "Results", "Discussion"];

/// Extraction backend that decodes plain text and substitutes sample text
/// for PDF and DOCX files.
pub struct SimulatedExtractor {
    extract_delay: Duration,
    analyze_delay: Duration,
}

impl SimulatedExtractor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            extract_delay: config.step_delay(StepId::Extract),
            analyze_delay: config.step_delay(StepId::Analyze),
        }
    }

    fn extract_file(file: &DocumentFile) -> Result<ExtractedDocument, AbstractaError> {
        let media_type = file.media_type().ok_or_else(|| {
            AbstractaError::extraction(format!(
                "{} has unsupported type `{}`",
                file.name, file.declared_type
            ))
        })?;

        let text = match media_type {
            MediaType::PlainText => std::str::from_utf8(&file.bytes)
                .map_err(|e| AbstractaError::Extraction {
                    message: format!("{} is not valid UTF-8 text", file.name),
                    source: Some(Box::new(e)),
                })?
                .to_string(),
            MediaType::Pdf | MediaType::Docx => SAMPLE_PAPER.to_string(),
        };

        if text.trim().is_empty() {
            return Err(AbstractaError::extraction(format!(
                "{} contains no readable text",
                file.name
            )));
        }

        Ok(ExtractedDocument {
            text,
            media_type: Some(media_type),
            sections: Vec::new(),
        })
    }
}

#[async_trait]
impl BackendAdapter for SimulatedExtractor {
    fn name(&self) -> &str {
        "simulated-extractor"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Extraction
    }

    async fn health_check(&self) -> Result<HealthStatus, AbstractaError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl DocumentExtractor for SimulatedExtractor {
    async fn extract(&self, input: &DocumentInput) -> Result<ExtractedDocument, AbstractaError> {
        simulate_latency(self.extract_delay).await;
        let document = match input {
            DocumentInput::File(file) => Self::extract_file(file)?,
            DocumentInput::Text(text) => ExtractedDocument {
                text: text.clone(),
                media_type: None,
                sections: Vec::new(),
            },
        };
        debug!(chars = document.text.len(), "document extracted");
        Ok(document)
    }

    async fn detect_sections(
        &self,
        document: &ExtractedDocument,
    ) -> Result<Vec<Section>, AbstractaError> {
        simulate_latency(self.analyze_delay).await;
        let sections = find_sections(&document.text);
        debug!(count = sections.len(), "sections detected");
        Ok(sections)
    }
}

/// Finds well-known section headings in order of appearance. When none are
/// present the conventional four are reported at offset zero.
pub fn find_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    for caps in SECTION_HEADING.captures_iter(text) {
        let Some(name) = caps.get(1) else { continue };
        let title = canonical_title(name.as_str());
        if sections.iter().any(|s| s.title == title) {
            continue;
        }
        sections.push(Section {
            title,
            offset: name.start(),
        });
    }

    if sections.is_empty() {
        return FALLBACK_SECTIONS
            .iter()
            .map(|title| Section {
                title: title.to_string(),
                offset: 0,
            })
            .collect();
    }
    sections
}

fn canonical_title(heading: &str) -> String {
    match heading.to_ascii_lowercase().as_str() {
        "methodology" | "methods" => "Methods".to_string(),
        "related work" => "Related Work".to_string(),
        "conclusion" | "conclusions" => "Conclusion".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(text: &str) -> Vec<String> {
        find_sections(text).into_iter().map(|s| s.title).collect()
    }

    #[test]
    fn numbered_and_cased_headings_are_found() {
        let text = "1. INTRODUCTION\nbody\n2 Methodology\nbody\n3.1 Results:\nbody\nConclusions\n";
        assert_eq!(titles(text), vec!["Introduction", "Methods", "Results", "Conclusion"]);
    }

    #[test]
    fn heading_words_inside_sentences_are_ignored() {
        let text = "Our results and discussion follow in the next part.";
        assert_eq!(titles(text), FALLBACK_SECTIONS.to_vec());
    }

    #[test]
    fn offsets_point_at_headings() {
        let sections = find_sections(SAMPLE_PAPER);
        assert_eq!(sections.len(), 4);
        for s in sections {
            assert_eq!(&SAMPLE_PAPER[s.offset..s.offset + s.title.len()], s.title);
        }
    }

    #[tokio::test]
    async fn invalid_utf8_text_file_fails_extraction() {
        let extractor = SimulatedExtractor::new(&PipelineConfig::instant());
        let file = DocumentFile::new("notes.txt", "text/plain", vec![0xff, 0xfe, 0x00]);
        let err = extractor.extract(&DocumentInput::File(file)).await.unwrap_err();
        assert!(matches!(err, AbstractaError::Extraction { source: Some(_), .. }));
    }

    #[tokio::test]
    async fn pdf_yields_sample_paper() {
        let extractor = SimulatedExtractor::new(&PipelineConfig::instant());
        let file = DocumentFile::new("paper.pdf", "application/pdf", b"%PDF-1.7".to_vec());
        let doc = extractor.extract(&DocumentInput::File(file)).await.unwrap();
        assert_eq!(doc.media_type, Some(MediaType::Pdf));
        assert!(doc.text.contains("section-aware analysis"));
    }

    #[tokio::test(start_paused = true)]
    async fn extraction_waits_configured_latency() {
        let extractor = SimulatedExtractor::new(&PipelineConfig::default());
        let start = tokio::time::Instant::now();
        extractor
            .extract(&DocumentInput::Text("text".into()))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }
}
