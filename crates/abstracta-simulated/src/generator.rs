// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated summarization backend.

use std::time::Duration;

use abstracta_config::PipelineConfig;
use abstracta_core::text::{count_words, finalize_abstract};
use abstracta_core::traits::{AbstractGenerator, BackendAdapter};
use abstracta_core::types::GenerationRequest;
use abstracta_core::{
    AbstractaError, AdapterType, GeneratedAbstract, GenerationParameters, HealthStatus, StepId,
};
use async_trait::async_trait;
use tracing::debug;

use crate::sample::{sample_sources, SAMPLE_ABSTRACT};
use crate::simulate_latency;

/// Returns the sample abstract with its three supporting excerpts.
pub struct SimulatedGenerator {
    summarize_delay: Duration,
    finalize_delay: Duration,
}

impl SimulatedGenerator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            summarize_delay: config.step_delay(StepId::Summarize),
            finalize_delay: config.step_delay(StepId::Finalize),
        }
    }
}

#[async_trait]
impl BackendAdapter for SimulatedGenerator {
    fn name(&self) -> &str {
        "simulated-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, AbstractaError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl AbstractGenerator for SimulatedGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedAbstract, AbstractaError> {
        simulate_latency(self.summarize_delay).await;
        debug!(
            sections = request.document.sections.len(),
            style = %request.style,
            "draft abstract produced"
        );
        Ok(GeneratedAbstract {
            text: SAMPLE_ABSTRACT.to_string(),
            word_count: count_words(SAMPLE_ABSTRACT),
            style: request.style,
            word_budget: request.word_budget,
            sources: sample_sources(),
        })
    }

    async fn finalize(
        &self,
        draft: GeneratedAbstract,
        params: &GenerationParameters,
        grounded: bool,
    ) -> Result<GeneratedAbstract, AbstractaError> {
        simulate_latency(self.finalize_delay).await;
        Ok(finalize_abstract(draft, params, grounded))
    }
}
