// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat REPL shown after an interactive generation.
//!
//! Questions are sent to the session's chat; slash commands control the
//! conversation and the workflow.

use std::time::Duration;

use abstracta_core::{AbstractaError, ChatMessage};
use abstracta_workflow::{SendOutcome, Session};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::generate::{print_result, run_once};

/// A parsed line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Clear,
    Retry,
    Regenerate,
    Help,
    Unknown(&'a str),
    Ask(&'a str),
    Empty,
}

fn parse_line(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => Command::Empty,
        "/quit" | "/exit" => Command::Quit,
        "/clear" => Command::Clear,
        "/retry" => Command::Retry,
        "/regenerate" => Command::Regenerate,
        "/help" => Command::Help,
        other if other.starts_with('/') => Command::Unknown(other),
        other => Command::Ask(other),
    }
}

/// Runs the chat REPL until the user quits.
pub async fn run_chat(session: &Session, cancel: &CancellationToken) -> Result<(), AbstractaError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| AbstractaError::Internal(format!("failed to initialize readline: {e}")))?;

    println!();
    println!("{}", "Ask about this paper".bold().green());
    print_help();

    let prompt = format!("{}> ", "abstracta".green());
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        match parse_line(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Unknown(cmd) => {
                eprintln!("{} {cmd}; type {} for commands", "unknown command".yellow(), "/help".yellow());
            }
            Command::Clear => match session.clear_chat() {
                Ok(()) => println!("{}", "conversation cleared".dimmed()),
                Err(e) => eprintln!("{}: {e}", "error".red()),
            },
            Command::Retry => match session.retry_chat() {
                Ok(true) => await_reply(session, cancel).await,
                Ok(false) => println!("{}", "nothing to retry".dimmed()),
                Err(e) => eprintln!("{}: {e}", "error".red()),
            },
            Command::Regenerate => {
                if let Err(e) = session.regenerate() {
                    eprintln!("{}: {e}", "error".red());
                    continue;
                }
                match run_once(session, cancel, false).await {
                    Ok(result) => print_result(&result, false)?,
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            Command::Ask(question) => {
                let _ = rl.add_history_entry(question);
                match session.send_message(question) {
                    Ok(SendOutcome::Accepted(_)) => await_reply(session, cancel).await,
                    Ok(SendOutcome::Queued) => println!("{}", "queued".dimmed()),
                    Ok(SendOutcome::Rejected) => {
                        println!("{}", "still waiting for the previous reply".yellow())
                    }
                    Ok(SendOutcome::Ignored) => {}
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
        }
    }

    debug!("chat REPL closed");
    Ok(())
}

/// Shows a spinner until the pending reply lands, then prints it. A signal on
/// `cancel` abandons the reply instead.
async fn await_reply(session: &Session, cancel: &CancellationToken) {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg:.dim}") {
        spinner.set_style(style);
    }
    spinner.set_message("thinking");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let interrupted = wait_for_reply(session, cancel).await;
    spinner.finish_and_clear();
    if interrupted {
        eprintln!("{}", "reply cancelled".yellow());
        return;
    }

    if let Some(reply) = session.messages().last() {
        print_reply(reply);
    }
}

/// Returns `true` when `cancel` fired before the reply arrived.
async fn wait_for_reply(session: &Session, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = session.chat().wait_idle() => false,
        _ = cancel.cancelled() => {
            session.chat().cancel();
            true
        }
    }
}

fn print_reply(reply: &ChatMessage) {
    if reply.failed {
        eprintln!("{}: {}", "reply failed".red(), reply.content);
        eprintln!("type {} to ask again", "/retry".yellow());
        return;
    }
    println!("{}", reply.content);
    if !reply.citations.is_empty() {
        println!("{} {}", "sources:".dimmed(), reply.citations.join(", ").cyan());
    }
}

fn print_help() {
    println!(
        "Commands: {} {} {} {}",
        "/clear".yellow(),
        "/retry".yellow(),
        "/regenerate".yellow(),
        "/quit".yellow()
    );
}

#[cfg(test)]
mod tests {
    use abstracta_core::{GenerationMode, WorkflowState};
    use abstracta_test_utils::{sample_paper_text, MockAnswerer, TestHarness};

    use super::*;

    async fn session_with_slow_reply() -> TestHarness {
        let mut harness = TestHarness::builder()
            .with_mode(GenerationMode::Interactive)
            .with_answerer(MockAnswerer::new().with_delay(Duration::from_secs(30)))
            .build();
        let state = harness.run_text(&sample_paper_text()).await.unwrap();
        assert_eq!(state, WorkflowState::Completed);
        harness
    }

    #[tokio::test(start_paused = true)]
    async fn signal_abandons_a_pending_reply() {
        let harness = session_with_slow_reply().await;
        harness.session.send_message("question").unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        assert!(wait_for_reply(&harness.session, &cancel).await);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!harness.session.chat().is_loading());
        assert!(harness.session.messages().last().unwrap().failed);
    }

    #[tokio::test(start_paused = true)]
    async fn reply_arrives_without_a_signal() {
        let harness = session_with_slow_reply().await;
        harness.session.send_message("question").unwrap();
        assert!(!wait_for_reply(&harness.session, &CancellationToken::new()).await);
        assert!(!harness.session.messages().last().unwrap().failed);
    }

    #[test]
    fn slash_commands_are_recognized() {
        assert_eq!(parse_line(" /quit "), Command::Quit);
        assert_eq!(parse_line("/exit"), Command::Quit);
        assert_eq!(parse_line("/clear"), Command::Clear);
        assert_eq!(parse_line("/retry"), Command::Retry);
        assert_eq!(parse_line("/regenerate"), Command::Regenerate);
        assert_eq!(parse_line("/bogus"), Command::Unknown("/bogus"));
    }

    #[test]
    fn other_lines_are_questions() {
        assert_eq!(parse_line("  What are the limits?  "), Command::Ask("What are the limits?"));
        assert_eq!(parse_line("   "), Command::Empty);
    }
}
