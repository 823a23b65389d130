// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Export of a finished abstract as plain text or a LaTeX block.

use abstracta_core::GeneratedAbstract;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
pub enum ExportFormat {
    #[default]
    #[strum(to_string = "txt", serialize = "text")]
    #[serde(rename = "txt")]
    PlainText,
    #[strum(to_string = "tex", serialize = "latex")]
    #[serde(rename = "tex")]
    Latex,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::PlainText => "txt",
            ExportFormat::Latex => "tex",
        }
    }
}

/// Renders the abstract text in the given format. Sources are never included.
pub fn export_abstract(abstract_: &GeneratedAbstract, format: ExportFormat) -> String {
    match format {
        ExportFormat::PlainText => abstract_.text.clone(),
        ExportFormat::Latex => format!("\\begin{{abstract}}\n{}\n\\end{{abstract}}", abstract_.text),
    }
}

pub fn suggested_file_name(format: ExportFormat) -> String {
    format!("abstract.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use abstracta_core::{AbstractStyle, WordBudget};

    fn sample() -> GeneratedAbstract {
        GeneratedAbstract {
            text: "We study 50% of cases.".to_string(),
            word_count: 5,
            style: AbstractStyle::Generic,
            word_budget: WordBudget::Words150,
            sources: vec![],
        }
    }

    #[test]
    fn plain_text_is_verbatim() {
        assert_eq!(export_abstract(&sample(), ExportFormat::PlainText), "We study 50% of cases.");
    }

    #[test]
    fn latex_wraps_in_abstract_environment() {
        assert_eq!(
            export_abstract(&sample(), ExportFormat::Latex),
            "\\begin{abstract}\nWe study 50% of cases.\n\\end{abstract}"
        );
    }

    #[test]
    fn file_names_and_parsing() {
        assert_eq!(suggested_file_name(ExportFormat::PlainText), "abstract.txt");
        assert_eq!(suggested_file_name(ExportFormat::Latex), "abstract.tex");
        assert_eq!(ExportFormat::from_str("latex").unwrap(), ExportFormat::Latex);
        assert_eq!(ExportFormat::Latex.to_string(), "tex");
    }
}
