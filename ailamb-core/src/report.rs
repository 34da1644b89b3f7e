//! Report assembly pipeline
//!
//! Extractor -> Categorization -> {Executive Summary, Recommendations} ->
//! Renderer. One run builds one immutable [`Report`]; no state is shared or
//! cached across runs.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::categorize::CategorySummary;
use crate::extract::extract;
use crate::findings::Finding;
use crate::narrative::{generate_all, ReportSection};
use crate::providers::CompletionClient;
use crate::render::render;
use crate::{Error, Result};

/// The terminal artifact of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub findings: Vec<Finding>,
    pub summary: CategorySummary,
    /// Narrative sections in fixed order, each with its provenance
    pub sections: Vec<ReportSection>,
    /// Captured once at generation time; the single source of render
    /// nondeterminism
    pub generated_at: DateTime<Utc>,
}

/// Run the full pipeline over a findings document. `max_tokens` caps each
/// narrative completion and comes from the provider configuration.
///
/// Fails only on malformed input; completion-service failures are absorbed
/// into fallback sections by the narrative stages.
pub async fn generate(
    document: &str,
    client: &dyn CompletionClient,
    max_tokens: u32,
) -> Result<Report> {
    let findings = extract(document)?;
    let summary = CategorySummary::categorize(&findings);
    tracing::info!(
        total = summary.total(),
        critical = summary.counts().critical,
        high = summary.counts().high,
        "findings categorized"
    );

    let sections = generate_all(client, &summary, max_tokens).await;

    Ok(Report {
        findings,
        summary,
        sections,
        generated_at: Utc::now(),
    })
}

/// Render a report to HTML
pub fn to_html(report: &Report) -> String {
    render(report)
}

/// Write rendered HTML to its destination in one shot
pub fn write_html(html: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, html).map_err(|source| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = html.len(), "report written");
    Ok(())
}
