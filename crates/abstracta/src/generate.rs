// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `abstracta generate` command implementation.
//!
//! Builds a session over the simulated backends, applies the command line
//! overrides, runs the workflow with a progress display, and prints or writes
//! the result. Interactive runs continue into the chat REPL.

use std::io::Read;
use std::path::{Path, PathBuf};

use abstracta_config::AbstractaConfig;
use abstracta_core::{
    AbstractStyle, AbstractaError, DocumentFile, GeneratedAbstract, GenerationMode, InputSource,
    WordBudget, WorkflowState,
};
use abstracta_simulated::SimulatedBackends;
use abstracta_workflow::{suggested_file_name, Backends, ExportFormat, Session};
use clap::Args;
use colored::Colorize;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::progress::StepProgress;
use crate::shutdown;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Paper to summarize (PDF, DOCX or plain text).
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Pasted paper text.
    #[arg(long, conflicts_with_all = ["text_file", "stdin"])]
    pub text: Option<String>,

    /// Read pasted text from a file.
    #[arg(long, value_name = "PATH", conflicts_with = "stdin")]
    pub text_file: Option<PathBuf>,

    /// Read pasted text from standard input.
    #[arg(long)]
    pub stdin: bool,

    /// Which input to use when both a file and text are given (file, text).
    #[arg(long)]
    pub source: Option<InputSource>,

    /// Target length in words (150, 220, 300, 400).
    #[arg(long, value_parser = parse_budget)]
    pub budget: Option<WordBudget>,

    /// Output style (generic, ieee, arxiv, nature).
    #[arg(long)]
    pub style: Option<AbstractStyle>,

    /// Generation mode (transformer, interactive).
    #[arg(long)]
    pub mode: Option<GenerationMode>,

    /// Do not attach supporting source excerpts.
    #[arg(long)]
    pub no_grounding: bool,

    /// Strip line numbers and collapse whitespace in pasted text.
    #[arg(long)]
    pub clean: bool,

    /// Export format (txt, tex).
    #[arg(long)]
    pub export: Option<ExportFormat>,

    /// Write the export to this path instead of the suggested file name.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Skip the chat prompt after an interactive run.
    #[arg(long)]
    pub no_chat: bool,
}

fn parse_budget(value: &str) -> Result<WordBudget, String> {
    let words: u32 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    WordBudget::try_from(words)
}

/// Runs `abstracta generate`.
pub async fn run_generate(config: AbstractaConfig, args: GenerateArgs) -> Result<(), AbstractaError> {
    let backends = SimulatedBackends::new(&config);
    let mut session = Session::new(
        &config,
        Backends {
            extractor: backends.extractor,
            generator: backends.generator,
            answerer: backends.answerer,
        },
    );

    apply_overrides(&mut session, &args);
    load_input(&mut session, &args).await?;

    let cancel = shutdown::install_signal_handler();
    let result = run_once(&session, &cancel, args.json).await?;

    print_result(&result, args.json)?;

    if args.export.is_some() || args.output.is_some() {
        let format = export_format(args.export, args.output.as_deref());
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(suggested_file_name(format)));
        write_export(&session, format, &path)?;
    }

    if session.mode() == GenerationMode::Interactive && !args.no_chat && !args.json {
        crate::chat::run_chat(&session, &cancel).await?;
    }
    Ok(())
}

fn apply_overrides(session: &mut Session, args: &GenerateArgs) {
    if let Some(mode) = args.mode {
        session.set_mode(mode);
    }
    if let Some(budget) = args.budget {
        session.set_word_budget(budget);
    }
    if let Some(style) = args.style {
        session.set_style(style);
    }
    if args.no_grounding {
        session.set_ground_with_evidence(false);
    }
}

async fn load_input(session: &mut Session, args: &GenerateArgs) -> Result<(), AbstractaError> {
    if let Some(path) = &args.file {
        let bytes = tokio::fs::read(path).await.map_err(|e| AbstractaError::InputNotReady {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        session
            .input_mut()
            .select_file(DocumentFile::from_named_bytes(name, bytes))?;
    }

    let text = if let Some(text) = &args.text {
        Some(text.clone())
    } else if let Some(path) = &args.text_file {
        Some(tokio::fs::read_to_string(path).await.map_err(|e| {
            AbstractaError::InputNotReady {
                reason: format!("cannot read {}: {e}", path.display()),
            }
        })?)
    } else if args.stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| AbstractaError::InputNotReady {
                reason: format!("cannot read standard input: {e}"),
            })?;
        Some(buf)
    } else {
        None
    };

    let input = session.input_mut();
    if let Some(text) = text {
        input.set_text(text);
        if args.clean {
            input.clean_formatting();
        }
        if args.file.is_none() {
            input.set_active_source(InputSource::Text);
        }
    }
    if let Some(source) = args.source {
        input.set_active_source(source);
    }
    if input.needs_source_choice() {
        info!(source = %input.active_source(), "both a file and text were given");
    }
    debug!(chars = input.text_len(), file = input.file().is_some(), "input loaded");
    Ok(())
}

/// Runs the workflow once with a progress display and returns the abstract.
///
/// A signal on `cancel` aborts the run and returns [`AbstractaError::Cancelled`].
pub async fn run_once(
    session: &Session,
    cancel: &CancellationToken,
    quiet: bool,
) -> Result<GeneratedAbstract, AbstractaError> {
    let mut events = session.workflow().subscribe();
    let progress = StepProgress::new(&session.steps(), quiet);
    session.generate()?;

    let settled = async {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if progress.apply(&event) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "progress events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
        session.wait().await
    };

    let state = tokio::select! {
        state = settled => state,
        _ = cancel.cancelled() => {
            session.cancel();
            progress.abandon_pending();
            return Err(AbstractaError::Cancelled);
        }
    };

    match state {
        WorkflowState::Completed => session.result().ok_or_else(|| {
            AbstractaError::Internal("completed run has no result".to_string())
        }),
        WorkflowState::Error => Err(AbstractaError::generation(
            session
                .workflow()
                .last_error()
                .unwrap_or_else(|| "unknown failure".to_string()),
        )),
        other => Err(AbstractaError::InvalidTransition {
            from: other,
            action: "finish generation",
        }),
    }
}

pub fn print_result(result: &GeneratedAbstract, json: bool) -> Result<(), AbstractaError> {
    if json {
        let rendered = serde_json::to_string_pretty(result)
            .map_err(|e| AbstractaError::Internal(format!("failed to encode result: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    println!();
    println!(
        "{} {}",
        "Abstract".bold().green(),
        format!(
            "({} words, {}, {})",
            result.word_count,
            result.word_budget,
            result.style.label()
        )
        .dimmed()
    );
    println!("{}", result.text);

    if !result.sources.is_empty() {
        println!();
        println!("{}", "Supporting sources".bold());
        for source in &result.sources {
            println!("  [{}] {} {}", source.id, source.section.cyan(), source.snippet.dimmed());
        }
    }
    Ok(())
}

/// The explicit format wins; otherwise a `.tex` output path selects LaTeX.
fn export_format(explicit: Option<ExportFormat>, output: Option<&Path>) -> ExportFormat {
    if let Some(format) = explicit {
        return format;
    }
    match output.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tex") => ExportFormat::Latex,
        _ => ExportFormat::PlainText,
    }
}

fn write_export(session: &Session, format: ExportFormat, path: &Path) -> Result<(), AbstractaError> {
    let content = session.export(format)?;
    std::fs::write(path, content)
        .map_err(|e| AbstractaError::Internal(format!("failed to write {}: {e}", path.display())))?;
    eprintln!("{} {}", "wrote".green(), path.display());
    Ok(())
}
