//! Finding data model

use serde::{Deserialize, Serialize};

/// Severity of a finding. The variant order is most-severe-first, so the
/// derived `Ord` ranks Critical ahead of High ahead of Medium ahead of Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severities in display order (most severe first)
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    /// Parse a severity label, case-insensitive. Only the four fixed labels
    /// are recognized; nothing is ever inferred from surrounding text.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed vulnerability record from the findings document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Sequence number, assigned in document order at extraction time
    pub id: u32,
    /// Short label, e.g. "XML External Entity (XXE) Injection"
    pub title: String,
    /// Severity declared by the document section the finding appeared under
    pub severity: Severity,
    /// Free-text path/line reference; not validated against a filesystem
    pub location: String,
    pub description: String,
    pub impact: String,
    /// Optional code excerpt; treated as untrusted text throughout
    pub code_snippet: Option<String>,
}
