//! Severity categorization of extracted findings

use serde::{Deserialize, Serialize};

use crate::findings::{Finding, Severity};

/// Finding counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Findings grouped by severity, with per-severity counts
///
/// Every severity bucket is always present, possibly empty, so the rendered
/// report shows all four rows. Extraction order is preserved within each
/// bucket. Categorization never fails: an empty input is a valid clean scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    buckets: Vec<(Severity, Vec<Finding>)>,
    counts: SeverityCounts,
}

impl CategorySummary {
    /// Group findings by severity, preserving extraction order per bucket
    pub fn categorize(findings: &[Finding]) -> Self {
        let mut buckets: Vec<(Severity, Vec<Finding>)> = Severity::ALL
            .iter()
            .map(|&sev| (sev, Vec::new()))
            .collect();

        for finding in findings {
            if let Some((_, bucket)) = buckets.iter_mut().find(|(sev, _)| *sev == finding.severity)
            {
                bucket.push(finding.clone());
            }
        }

        let mut counts = SeverityCounts::default();
        for (sev, bucket) in &buckets {
            match sev {
                Severity::Critical => counts.critical = bucket.len(),
                Severity::High => counts.high = bucket.len(),
                Severity::Medium => counts.medium = bucket.len(),
                Severity::Low => counts.low = bucket.len(),
            }
        }

        Self { buckets, counts }
    }

    pub fn counts(&self) -> SeverityCounts {
        self.counts
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.counts.get(severity)
    }

    pub fn total(&self) -> usize {
        self.counts.total()
    }

    /// Findings in one severity bucket, in extraction order
    pub fn findings_for(&self, severity: Severity) -> &[Finding] {
        self.buckets
            .iter()
            .find(|(sev, _)| *sev == severity)
            .map(|(_, bucket)| bucket.as_slice())
            .unwrap_or(&[])
    }

    /// The `n` highest-severity findings, most severe first.
    ///
    /// Ties within a severity are broken by original document order, which
    /// the buckets already preserve.
    pub fn top_findings(&self, n: usize) -> Vec<&Finding> {
        self.buckets
            .iter()
            .flat_map(|(_, bucket)| bucket.iter())
            .take(n)
            .collect()
    }
}
