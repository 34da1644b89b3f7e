//! ailamb-core: AI-assisted SAST report generation library
//!
//! Turns a semi-structured SAST findings document into a styled HTML report:
//! findings are extracted, bucketed by severity, narrated via an LLM
//! completion service (with deterministic fallbacks when the service is
//! unavailable), and rendered as a single self-contained document.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod categorize;
pub mod config;
pub mod error;
pub mod extract;
pub mod findings;
pub mod narrative;
pub mod providers;
pub mod render;
pub mod report;

pub use error::{Error, Result};
