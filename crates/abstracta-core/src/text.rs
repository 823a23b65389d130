// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Word counting and the budget trimming applied by the finalize step.

use crate::types::{GeneratedAbstract, GenerationParameters};

/// Counts whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Cuts `text` down to at most `limit` words.
///
/// Prefers ending on the last complete sentence inside the limit; falls back to
/// a hard cut marked with an ellipsis.
pub fn truncate_to_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return words.join(" ");
    }

    let kept = &words[..limit];
    let last_sentence_end = kept
        .iter()
        .rposition(|w| w.ends_with('.') || w.ends_with('!') || w.ends_with('?'));

    match last_sentence_end {
        Some(idx) => kept[..=idx].join(" "),
        None => format!("{}...", kept.join(" ")),
    }
}

/// Applies the finalize step to a draft: enforce the word budget, recount
/// words, and drop source excerpts when grounding is off.
pub fn finalize_abstract(
    mut draft: GeneratedAbstract,
    params: &GenerationParameters,
    grounded: bool,
) -> GeneratedAbstract {
    draft.text = truncate_to_words(&draft.text, params.word_budget.words() as usize);
    draft.word_count = count_words(&draft.text);
    draft.style = params.style;
    draft.word_budget = params.word_budget;
    if !grounded {
        draft.sources.clear();
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AbstractStyle, SourceExcerpt, WordBudget};

    fn draft(text: &str) -> GeneratedAbstract {
        GeneratedAbstract {
            text: text.to_string(),
            word_count: 0,
            style: AbstractStyle::Generic,
            word_budget: WordBudget::Words400,
            sources: vec![SourceExcerpt {
                id: "1".into(),
                section: "Methods §2.1".into(),
                snippet: "We developed...".into(),
            }],
        }
    }

    #[test]
    fn counts_words_across_mixed_whitespace() {
        assert_eq!(count_words("  one\ttwo\n\nthree  "), 3);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn short_text_is_left_alone_but_normalized() {
        assert_eq!(truncate_to_words("a  b\nc.", 10), "a b c.");
    }

    #[test]
    fn truncation_prefers_sentence_boundary() {
        let text = "First sentence here. Second sentence runs on and on";
        assert_eq!(truncate_to_words(text, 6), "First sentence here.");
    }

    #[test]
    fn truncation_without_boundary_marks_the_cut() {
        assert_eq!(truncate_to_words("one two three four", 2), "one two...");
    }

    #[test]
    fn finalize_recounts_and_applies_parameters() {
        let words = vec!["word."; 200].join(" ");
        let params = GenerationParameters {
            word_budget: WordBudget::Words150,
            style: AbstractStyle::Nature,
            ground_with_evidence: true,
        };
        let out = finalize_abstract(draft(&words), &params, true);
        assert_eq!(out.word_count, 150);
        assert_eq!(out.style, AbstractStyle::Nature);
        assert_eq!(out.word_budget, WordBudget::Words150);
        assert_eq!(out.sources.len(), 1);
    }

    #[test]
    fn finalize_drops_sources_when_not_grounded() {
        let out = finalize_abstract(draft("Short abstract."), &GenerationParameters::default(), false);
        assert!(out.sources.is_empty());
        assert_eq!(out.word_count, 2);
    }
}
