// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated backends for the Abstracta workflow.
//!
//! These adapters stand in for a real extraction service, summarization
//! model, and question-answering model. They wait the configured latency and
//! return fixed sample content, so the full workflow can run end to end
//! without any external service.

pub mod answerer;
pub mod extractor;
pub mod generator;
pub mod sample;

use std::sync::Arc;

use abstracta_config::AbstractaConfig;

pub use answerer::SimulatedAnswerer;
pub use extractor::SimulatedExtractor;
pub use generator::SimulatedGenerator;

/// The three simulated adapters, built from one configuration.
pub struct SimulatedBackends {
    pub extractor: Arc<SimulatedExtractor>,
    pub generator: Arc<SimulatedGenerator>,
    pub answerer: Arc<SimulatedAnswerer>,
}

impl SimulatedBackends {
    pub fn new(config: &AbstractaConfig) -> Self {
        Self {
            extractor: Arc::new(SimulatedExtractor::new(&config.pipeline)),
            generator: Arc::new(SimulatedGenerator::new(&config.pipeline)),
            answerer: Arc::new(SimulatedAnswerer::new(&config.chat)),
        }
    }
}

async fn simulate_latency(delay: std::time::Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
