// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Abstracta.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use abstracta_core::{AbstractStyle, GenerationMode, GenerationParameters, MediaType, StepId, WordBudget};
use serde::{Deserialize, Serialize};

/// Top-level Abstracta configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AbstractaConfig {
    /// Session-wide settings (logging, default mode).
    #[serde(default)]
    pub session: SessionConfig,

    /// Input acceptance policy.
    #[serde(default)]
    pub input: InputConfig,

    /// Default generation parameters.
    #[serde(default)]
    pub parameters: ParametersConfig,

    /// Pipeline step latencies and timeouts.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Chat sub-flow settings.
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Session-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Mode a new session starts in.
    #[serde(default)]
    pub mode: GenerationMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            mode: GenerationMode::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Input acceptance configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Pasted text must be strictly longer than this many characters
    /// (after trimming) to be usable on its own.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Maximum accepted document size in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Accepted MIME types for uploaded documents.
    #[serde(default = "default_accepted_media_types")]
    pub accepted_media_types: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
            max_file_bytes: default_max_file_bytes(),
            accepted_media_types: default_accepted_media_types(),
        }
    }
}

impl InputConfig {
    /// Whether `declared` is one of the accepted media types.
    pub fn accepts(&self, declared: &str) -> bool {
        match MediaType::from_mime(declared) {
            Some(media_type) => self
                .accepted_media_types
                .iter()
                .any(|m| m.eq_ignore_ascii_case(media_type.mime())),
            None => false,
        }
    }
}

fn default_min_text_chars() -> usize {
    100
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_accepted_media_types() -> Vec<String> {
    MediaType::ALL.iter().map(|m| m.mime().to_string()).collect()
}

/// Default generation parameters for new sessions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParametersConfig {
    /// Target abstract length: 150, 220, 300 or 400 words.
    #[serde(default)]
    pub word_budget: WordBudget,

    /// Output style: generic, ieee, arxiv or nature.
    #[serde(default)]
    pub style: AbstractStyle,

    /// Attach cited source excerpts (interactive mode only).
    #[serde(default = "default_ground_with_evidence")]
    pub ground_with_evidence: bool,
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            word_budget: WordBudget::default(),
            style: AbstractStyle::default(),
            ground_with_evidence: default_ground_with_evidence(),
        }
    }
}

impl ParametersConfig {
    pub fn to_parameters(&self) -> GenerationParameters {
        GenerationParameters {
            word_budget: self.word_budget,
            style: self.style,
            ground_with_evidence: self.ground_with_evidence,
        }
    }
}

fn default_ground_with_evidence() -> bool {
    true
}

/// Pipeline latency and timeout configuration.
///
/// The per-step delays drive the simulated backends; the timeout bounds every
/// step regardless of backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default = "default_extract_delay_ms")]
    pub extract_delay_ms: u64,

    #[serde(default = "default_analyze_delay_ms")]
    pub analyze_delay_ms: u64,

    #[serde(default = "default_summarize_delay_ms")]
    pub summarize_delay_ms: u64,

    #[serde(default = "default_finalize_delay_ms")]
    pub finalize_delay_ms: u64,

    /// Upper bound on a single step before the run moves to `error`.
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extract_delay_ms: default_extract_delay_ms(),
            analyze_delay_ms: default_analyze_delay_ms(),
            summarize_delay_ms: default_summarize_delay_ms(),
            finalize_delay_ms: default_finalize_delay_ms(),
            step_timeout_secs: default_step_timeout_secs(),
        }
    }
}

impl PipelineConfig {
    /// Configuration with every synthetic delay set to zero.
    pub fn instant() -> Self {
        Self {
            extract_delay_ms: 0,
            analyze_delay_ms: 0,
            summarize_delay_ms: 0,
            finalize_delay_ms: 0,
            step_timeout_secs: default_step_timeout_secs(),
        }
    }

    pub fn step_delay(&self, step: StepId) -> Duration {
        let ms = match step {
            StepId::Extract => self.extract_delay_ms,
            StepId::Analyze => self.analyze_delay_ms,
            StepId::Summarize => self.summarize_delay_ms,
            StepId::Finalize => self.finalize_delay_ms,
        };
        Duration::from_millis(ms)
    }

    /// Sum of all step delays, the nominal latency of one run.
    pub fn total_delay(&self) -> Duration {
        StepId::ORDER.iter().map(|s| self.step_delay(*s)).sum()
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }
}

fn default_extract_delay_ms() -> u64 {
    1000
}

fn default_analyze_delay_ms() -> u64 {
    1500
}

fn default_summarize_delay_ms() -> u64 {
    2000
}

fn default_finalize_delay_ms() -> u64 {
    1000
}

fn default_step_timeout_secs() -> u64 {
    30
}

/// What to do with a chat message sent while a reply is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSendPolicy {
    /// Drop the new message; the caller may resend after the reply.
    #[default]
    Reject,
    /// Hold the new message and send it once the pending reply arrives.
    Queue,
}

/// Chat sub-flow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Simulated reply latency in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// Policy for sends while a reply is pending.
    #[serde(default)]
    pub send_policy: ChatSendPolicy,

    /// Maximum number of held messages under the `queue` policy.
    #[serde(default = "default_max_queued")]
    pub max_queued: usize,

    /// Upper bound on a single reply before it is reported as failed.
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            send_policy: ChatSendPolicy::default(),
            max_queued: default_max_queued(),
            reply_timeout_secs: default_reply_timeout_secs(),
        }
    }
}

impl ChatConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }
}

fn default_reply_delay_ms() -> u64 {
    2000
}

fn default_max_queued() -> usize {
    4
}

fn default_reply_timeout_secs() -> u64 {
    60
}
