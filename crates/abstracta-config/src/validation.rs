// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as recognised media types, non-zero limits, and simulated delays that
//! fit within their timeouts.

use abstracta_core::MediaType;

use crate::diagnostic::ConfigError;
use crate::model::{AbstractaConfig, ChatSendPolicy};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &AbstractaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.session.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "session.log_level `{}` must be one of: {}",
                config.session.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.input.min_text_chars == 0 {
        errors.push(ConfigError::Validation {
            message: "input.min_text_chars must be at least 1".to_string(),
        });
    }

    if config.input.max_file_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "input.max_file_bytes must be at least 1".to_string(),
        });
    }

    if config.input.accepted_media_types.is_empty() {
        errors.push(ConfigError::Validation {
            message: "input.accepted_media_types must list at least one type".to_string(),
        });
    }

    for mime in &config.input.accepted_media_types {
        if MediaType::from_mime(mime).is_none() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "input.accepted_media_types entry `{mime}` is not a supported document type"
                ),
            });
        }
    }

    if config.pipeline.step_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "pipeline.step_timeout_secs must be at least 1".to_string(),
        });
    } else {
        let limit_ms = config.pipeline.step_timeout_secs.saturating_mul(1000);
        let pipeline = &config.pipeline;
        for (key, delay_ms) in [
            ("extract_delay_ms", pipeline.extract_delay_ms),
            ("analyze_delay_ms", pipeline.analyze_delay_ms),
            ("summarize_delay_ms", pipeline.summarize_delay_ms),
            ("finalize_delay_ms", pipeline.finalize_delay_ms),
        ] {
            if delay_ms >= limit_ms {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "pipeline.{key} ({delay_ms} ms) must be shorter than \
                         pipeline.step_timeout_secs ({} s)",
                        pipeline.step_timeout_secs
                    ),
                });
            }
        }
    }

    if config.chat.reply_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.reply_timeout_secs must be at least 1".to_string(),
        });
    } else if config.chat.reply_delay_ms >= config.chat.reply_timeout_secs.saturating_mul(1000) {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.reply_delay_ms ({} ms) must be shorter than chat.reply_timeout_secs ({} s)",
                config.chat.reply_delay_ms, config.chat.reply_timeout_secs
            ),
        });
    }

    if config.chat.send_policy == ChatSendPolicy::Queue && config.chat.max_queued == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.max_queued must be at least 1 when chat.send_policy is `queue`"
                .to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
