// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Abstract generation workflow for Abstracta.
//!
//! - [`input`]: which document or pasted text feeds generation
//! - [`workflow`]: the idle/processing/completed/error state machine and its
//!   four sequential steps
//! - [`chat`]: follow-up questions once an interactive run completed
//! - [`session`]: ties the above together for one user
//! - [`export`]: plain text and LaTeX renderings of the result

pub mod chat;
pub mod export;
pub mod input;
pub mod session;
pub mod workflow;

pub use chat::{ChatContext, ChatSession, SendOutcome, CANCELLED_REPLY};
pub use export::{export_abstract, suggested_file_name, ExportFormat};
pub use input::{clean_text, InputSelector};
pub use session::{Backends, Session};
pub use workflow::{WorkflowController, WorkflowEvent};
