// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated question-answering backend.

use std::time::Duration;

use abstracta_config::ChatConfig;
use abstracta_core::traits::{BackendAdapter, QuestionAnswerer};
use abstracta_core::types::{AssistantTurn, QuestionRequest};
use abstracta_core::{AbstractaError, AdapterType, HealthStatus};
use async_trait::async_trait;
use tracing::debug;

use crate::sample::{SAMPLE_CHAT_REPLY, SAMPLE_CITATIONS};
use crate::simulate_latency;

/// Answers every question with the same canned reply.
pub struct SimulatedAnswerer {
    reply_delay: Duration,
}

impl SimulatedAnswerer {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            reply_delay: config.reply_delay(),
        }
    }
}

#[async_trait]
impl BackendAdapter for SimulatedAnswerer {
    fn name(&self) -> &str {
        "simulated-answerer"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::QuestionAnswering
    }

    async fn health_check(&self) -> Result<HealthStatus, AbstractaError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl QuestionAnswerer for SimulatedAnswerer {
    async fn answer(&self, request: QuestionRequest) -> Result<AssistantTurn, AbstractaError> {
        simulate_latency(self.reply_delay).await;
        debug!(history = request.history.len(), grounded = request.grounded, "chat reply produced");
        let citations = if request.grounded {
            SAMPLE_CITATIONS.iter().map(|c| c.to_string()).collect()
        } else {
            Vec::new()
        };
        Ok(AssistantTurn {
            content: SAMPLE_CHAT_REPLY.to_string(),
            citations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(grounded: bool) -> QuestionRequest {
        QuestionRequest {
            question: "What are the key findings?".into(),
            history: vec![],
            document: None,
            grounded,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn grounded_reply_cites_three_sections() {
        let answerer = SimulatedAnswerer::new(&ChatConfig::default());
        let start = tokio::time::Instant::now();
        let turn = answerer.answer(question(true)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(2000));
        assert_eq!(turn.citations.len(), 3);
        assert!(turn.content.starts_with("Based on your uploaded paper"));
    }

    #[tokio::test]
    async fn ungrounded_reply_has_no_citations() {
        let config = ChatConfig {
            reply_delay_ms: 0,
            ..Default::default()
        };
        let turn = SimulatedAnswerer::new(&config).answer(question(false)).await.unwrap();
        assert!(turn.citations.is_empty());
    }
}
