// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Abstracta integration tests.
//!
//! Provides scripted mock backends and a session harness for fast,
//! deterministic tests without real extraction or model services.
//!
//! # Components
//!
//! - [`MockExtractor`], [`MockGenerator`], [`MockAnswerer`] - scripted backends
//! - [`TestHarness`] - a [`Session`](abstracta_workflow::Session) wired to the mocks

pub mod harness;
pub mod mock_backends;

pub use harness::{sample_paper_text, TestHarness, TestHarnessBuilder};
pub use mock_backends::{MockAnswerer, MockExtractor, MockGenerator};
