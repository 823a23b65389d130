// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend adapter traits for the external collaborators of the workflow.
//!
//! All adapters extend the [`BackendAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod answering;
pub mod extraction;
pub mod generation;

pub use adapter::BackendAdapter;
pub use answering::QuestionAnswerer;
pub use extraction::DocumentExtractor;
pub use generation::AbstractGenerator;
