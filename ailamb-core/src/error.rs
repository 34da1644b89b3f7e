//! Error types for ailamb-core

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using ailamb Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for ailamb
///
/// Completion-service failures are deliberately absent here: they are
/// recovered locally by the narrative stages (see
/// [`crate::providers::CompletionError`]) and never abort a pipeline run.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(ailamb::config))]
    Config(String),

    #[error("Malformed findings document: {0}")]
    #[diagnostic(
        code(ailamb::input),
        help("expected at least one severity section heading (Critical, High, Medium or Low) with numbered finding blocks beneath it")
    )]
    MalformedInput(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(ailamb::io))]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    #[diagnostic(code(ailamb::toml))]
    Toml(#[from] toml::de::Error),

    #[error("Failed to write report to {path}: {source}")]
    #[diagnostic(code(ailamb::output))]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
