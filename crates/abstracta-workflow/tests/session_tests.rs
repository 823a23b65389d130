// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end session tests over mock backends.

use std::time::Duration;

use abstracta_core::{
    AbstractStyle, AbstractaError, ChatRole, DocumentFile, GenerationMode, InputSource, StepId, StepStatus,
    WordBudget, WorkflowState,
};
use abstracta_test_utils::{sample_paper_text, MockAnswerer, MockExtractor, TestHarness};
use abstracta_workflow::{ExportFormat, SendOutcome, WorkflowEvent};

#[tokio::test(start_paused = true)]
async fn steps_advance_one_at_a_time_in_order() {
    let mut harness = TestHarness::builder().build();
    let mut events = harness.session.workflow().subscribe();

    assert_eq!(harness.run_text(&sample_paper_text()).await.unwrap(), WorkflowState::Completed);

    let mut started = Vec::new();
    let mut completed = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            WorkflowEvent::StepStarted { step, .. } => {
                // The previous step must have completed before the next starts.
                assert_eq!(started.len(), completed.len());
                started.push(step);
            }
            WorkflowEvent::StepCompleted { step, .. } => completed.push(step),
            _ => {}
        }
    }
    assert_eq!(started, StepId::ORDER.to_vec());
    assert_eq!(completed, StepId::ORDER.to_vec());
}

#[tokio::test(start_paused = true)]
async fn status_messages_describe_each_step() {
    let extractor = MockExtractor::new().with_sections(&["Introduction", "Methods"]);
    let mut harness = TestHarness::builder().with_extractor(extractor).build();
    harness
        .session
        .input_mut()
        .select_file(DocumentFile::new("paper.pdf", "application/pdf", b"%PDF".to_vec()))
        .unwrap();
    harness.session.generate().unwrap();
    harness.session.wait().await;

    let messages: Vec<String> = harness
        .session
        .steps()
        .into_iter()
        .map(|s| s.message.unwrap_or_default())
        .collect();
    assert_eq!(messages[0], "PDF parsed successfully");
    assert_eq!(messages[1], "Detected: Introduction, Methods");
    assert_eq!(messages[2], "Using section-aware summarization to preserve fidelity");
    assert_eq!(messages[3], "Abstract generated successfully");
}

#[tokio::test(start_paused = true)]
async fn abstract_respects_budget_and_style() {
    let long_draft = "Sentence number one is here. ".repeat(60);
    let mut harness = TestHarness::builder().with_mock_drafts(vec![long_draft]).build();
    harness.session.set_word_budget(WordBudget::Words150);
    harness.session.set_style(AbstractStyle::Nature);
    harness.run_text(&sample_paper_text()).await.unwrap();

    let result = harness.session.result().unwrap();
    assert!(result.word_count <= 150);
    assert_eq!(result.style, AbstractStyle::Nature);
    assert_eq!(result.word_budget, WordBudget::Words150);
}

#[tokio::test(start_paused = true)]
async fn sources_are_kept_only_when_grounded() {
    let mut harness = TestHarness::builder()
        .with_mode(GenerationMode::Transformer)
        .build();
    harness.run_text(&sample_paper_text()).await.unwrap();
    assert!(harness.session.result().unwrap().sources.is_empty());

    let mut harness = TestHarness::builder()
        .with_mode(GenerationMode::Interactive)
        .build();
    harness.run_text(&sample_paper_text()).await.unwrap();
    assert!(!harness.session.result().unwrap().sources.is_empty());
}

#[tokio::test(start_paused = true)]
async fn regenerate_keeps_input_and_parameters() {
    let mut harness = TestHarness::builder().build();
    harness.session.set_word_budget(WordBudget::Words300);
    harness.run_text(&sample_paper_text()).await.unwrap();

    harness.session.regenerate().unwrap();
    assert_eq!(harness.session.state(), WorkflowState::Idle);
    assert!(harness.session.result().is_none());
    assert!(harness
        .session
        .steps()
        .iter()
        .all(|s| s.status == StepStatus::Pending && s.message.is_none()));
    assert_eq!(harness.session.params().word_budget, WordBudget::Words300);
    assert!(harness.session.input().can_generate());

    harness.session.generate().unwrap();
    assert_eq!(harness.session.wait().await, WorkflowState::Completed);
}

#[tokio::test(start_paused = true)]
async fn pasted_text_is_used_when_selected() {
    let mut harness = TestHarness::builder().build();
    harness
        .session
        .input_mut()
        .select_file(DocumentFile::new("notes.txt", "text/plain", b"file body".to_vec()))
        .unwrap();
    harness.session.input_mut().set_text(sample_paper_text());
    harness.session.input_mut().set_active_source(InputSource::Text);
    harness.session.generate().unwrap();
    harness.session.wait().await;

    assert_eq!(
        harness.session.steps()[0].message.as_deref(),
        Some("Pasted text loaded successfully")
    );
    let document = harness.session.workflow().document().unwrap();
    assert!(document.text.starts_with("Introduction"));
}

#[tokio::test(start_paused = true)]
async fn interactive_chat_after_completion() {
    let answerer = MockAnswerer::new()
        .with_reply("The key finding is coherence.")
        .with_citations(&["Results §3.4"]);
    let mut harness = TestHarness::builder()
        .with_mode(GenerationMode::Interactive)
        .with_answerer(answerer)
        .build();

    assert!(matches!(
        harness.session.send_message("too early"),
        Err(AbstractaError::ChatUnavailable)
    ));

    harness.run_text(&sample_paper_text()).await.unwrap();
    let outcome = harness.session.send_message("What did you find?").unwrap();
    assert!(matches!(outcome, SendOutcome::Accepted(_)));
    harness.session.chat().wait_idle().await;

    let messages = harness.session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].citations, vec!["Results §3.4".to_string()]);

    let requests = harness.answerer.requests();
    let seen = requests.lock().unwrap();
    assert!(seen[0].grounded);
    assert!(seen[0].document.is_some());
}

#[tokio::test(start_paused = true)]
async fn regenerate_abandons_pending_chat_reply() {
    let answerer = MockAnswerer::new().with_delay(Duration::from_secs(2));
    let mut harness = TestHarness::builder()
        .with_mode(GenerationMode::Interactive)
        .with_answerer(answerer)
        .build();
    harness.run_text(&sample_paper_text()).await.unwrap();
    harness.session.send_message("question").unwrap();
    assert!(harness.session.chat().is_loading());

    harness.session.regenerate().unwrap();
    assert!(!harness.session.chat().is_loading());
    tokio::time::sleep(Duration::from_secs(5)).await;
    let messages = harness.session.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[1].failed);

    harness.session.generate().unwrap();
    assert_eq!(harness.session.wait().await, WorkflowState::Completed);
    harness.session.send_message("second").unwrap();
    harness.session.chat().wait_idle().await;

    let roles: Vec<ChatRole> = harness.session.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![ChatRole::User, ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
    );
}

#[tokio::test(start_paused = true)]
async fn chat_history_survives_a_failed_regeneration() {
    let mut harness = TestHarness::builder()
        .with_mode(GenerationMode::Interactive)
        .build();
    harness.run_text(&sample_paper_text()).await.unwrap();
    harness.session.send_message("first question").unwrap();
    harness.session.chat().wait_idle().await;

    harness.session.regenerate().unwrap();
    harness.extractor.fail_next("corrupt upload");
    harness.session.generate().unwrap();
    assert_eq!(harness.session.wait().await, WorkflowState::Error);

    assert_eq!(harness.session.messages().len(), 2);
    assert!(harness.session.workflow().last_error().unwrap().contains("corrupt upload"));
}

#[tokio::test(start_paused = true)]
async fn export_after_completion() {
    let mut harness = TestHarness::builder()
        .with_mock_drafts(vec!["Short abstract.".to_string()])
        .build();
    harness.run_text(&sample_paper_text()).await.unwrap();

    assert_eq!(harness.session.export(ExportFormat::PlainText).unwrap(), "Short abstract.");
    assert_eq!(
        harness.session.export(ExportFormat::Latex).unwrap(),
        "\\begin{abstract}\nShort abstract.\n\\end{abstract}"
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_mid_run_allows_a_fresh_start() {
    let extractor = MockExtractor::new().with_delay(Duration::from_secs(3));
    let mut harness = TestHarness::builder().with_extractor(extractor).build();
    harness.generate_from_text(&sample_paper_text()).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    harness.session.cancel();
    assert_eq!(harness.session.state(), WorkflowState::Idle);

    harness.session.generate().unwrap();
    assert_eq!(harness.session.wait().await, WorkflowState::Completed);
}
