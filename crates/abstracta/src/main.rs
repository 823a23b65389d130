// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Abstracta - scientific abstract generation from the command line.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chat;
mod generate;
mod progress;
mod shutdown;

use std::path::PathBuf;

use abstracta_config::AbstractaConfig;
use abstracta_core::{AbstractaError, GenerationMode};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::generate::GenerateArgs;

/// Abstracta - generate abstracts for scientific papers.
#[derive(Parser, Debug)]
#[command(name = "abstracta", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an abstract from a document or pasted text.
    Generate(GenerateArgs),
    /// Print the effective configuration as TOML.
    Config,
    /// List the generation modes.
    Modes,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => abstracta_config::load_and_validate_path(path),
        None => abstracta_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            abstracta_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.session.log_level);

    let result = match cli.command {
        Some(Commands::Generate(args)) => generate::run_generate(config, args).await,
        Some(Commands::Config) => print_config(&config),
        Some(Commands::Modes) => {
            print_modes();
            Ok(())
        }
        None => {
            println!("abstracta: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

fn print_config(config: &AbstractaConfig) -> Result<(), AbstractaError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| AbstractaError::Config(format!("failed to render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}

fn print_modes() {
    for mode in [GenerationMode::Transformer, GenerationMode::Interactive] {
        println!("{:<12} {}", mode.to_string().bold(), mode.description());
    }
}

/// Logs go to stderr so stdout carries only the abstract.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("abstracta={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::try_parse_from([
            "abstracta",
            "--config",
            "custom.toml",
            "generate",
            "--text",
            "pasted",
            "--budget",
            "300",
            "--style",
            "ieee",
            "--mode",
            "llm",
            "--export",
            "tex",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        let Some(Commands::Generate(args)) = cli.command else {
            panic!("expected generate command");
        };
        assert_eq!(args.budget.map(|b| b.words()), Some(300));
        assert_eq!(args.mode, Some(GenerationMode::Interactive));
    }

    #[test]
    fn unsupported_budget_is_rejected() {
        assert!(Cli::try_parse_from(["abstracta", "generate", "--budget", "250"]).is_err());
    }

    #[test]
    fn text_sources_conflict() {
        let parsed =
            Cli::try_parse_from(["abstracta", "generate", "--text", "a", "--stdin"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn default_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&AbstractaConfig::default()).unwrap();
        assert!(rendered.contains("[pipeline]"));
        assert!(rendered.contains("summarize_delay_ms = 2000"));
    }
}
