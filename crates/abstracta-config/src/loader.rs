// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./abstracta.toml` > `~/.config/abstracta/abstracta.toml` >
//! `/etc/abstracta/abstracta.toml` with environment variable overrides via `ABSTRACTA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::AbstractaConfig;

/// Config sections, in the order used for env var key mapping.
const SECTIONS: [&str; 5] = ["session", "input", "parameters", "pipeline", "chat"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/abstracta/abstracta.toml` (system-wide)
/// 3. `~/.config/abstracta/abstracta.toml` (user XDG config)
/// 4. `./abstracta.toml` (local directory)
/// 5. `ABSTRACTA_*` environment variables
pub fn load_config() -> Result<AbstractaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<AbstractaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AbstractaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AbstractaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AbstractaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for XDG config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AbstractaConfig::default()))
        .merge(Toml::file(system_config_path()))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(local_config_path()))
        .merge(env_provider())
}

pub(crate) fn system_config_path() -> &'static Path {
    Path::new("/etc/abstracta/abstracta.toml")
}

pub(crate) fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("abstracta/abstracta.toml"))
}

pub(crate) fn local_config_path() -> &'static Path {
    Path::new("abstracta.toml")
}

/// Create the environment variable provider mapping only the first `_` after a
/// section name to a dot.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `ABSTRACTA_CHAT_SEND_POLICY`
/// must map to `chat.send_policy`, not `chat.send.policy`.
fn env_provider() -> Env {
    Env::prefixed("ABSTRACTA_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_section_then_field() {
        assert_eq!(map_env_key("chat_send_policy"), "chat.send_policy");
        assert_eq!(map_env_key("input_min_text_chars"), "input.min_text_chars");
        assert_eq!(map_env_key("pipeline_step_timeout_secs"), "pipeline.step_timeout_secs");
        assert_eq!(map_env_key("unknown_key"), "unknown_key");
    }
}
