//! HTML report rendering
//!
//! Deterministic template substitution: the same [`Report`] always renders
//! to byte-identical output. Every extracted free-text field is HTML-escaped
//! before insertion; the findings document is attacker-influenced text and
//! the rendered report must never execute it.

use crate::findings::{Finding, Severity};
use crate::narrative::{ReportSection, SectionSource};
use crate::report::Report;

const TEMPLATE: &str = include_str!("templates/report.html");

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Render a complete report as a single self-contained HTML document
pub fn render(report: &Report) -> String {
    let severity_rows = build_severity_rows(report);
    let total = report.summary.total().to_string();
    let tool = format!("ailamb v{}", env!("CARGO_PKG_VERSION"));
    let timestamp = report.generated_at.format(TIMESTAMP_FORMAT).to_string();
    let sections = build_sections(&report.sections);
    let findings = build_finding_cards(&report.findings);

    fill(
        TEMPLATE,
        &[
            ("{{SEVERITY_ROWS}}", &severity_rows),
            ("{{TOTAL}}", &total),
            ("{{TOOL}}", &tool),
            ("{{TIMESTAMP}}", &timestamp),
            ("{{SECTIONS}}", &sections),
            ("{{FINDINGS}}", &findings),
        ],
    )
}

/// Substitute every placeholder in a single pass over the template.
/// Substituted values are never rescanned, so a placeholder marker inside
/// section or finding text stays literal instead of expanding.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((pos, key_len, value)) = values
        .iter()
        .filter_map(|(key, value)| rest.find(key).map(|pos| (pos, key.len(), *value)))
        .min_by_key(|(pos, _, _)| *pos)
    {
        out.push_str(&rest[..pos]);
        out.push_str(value);
        rest = &rest[pos + key_len..];
    }
    out.push_str(rest);
    out
}

/// One row per severity, always all four, empty buckets included
fn build_severity_rows(report: &Report) -> String {
    let mut rows = String::new();
    for severity in Severity::ALL {
        rows.push_str(&format!(
            "                <tr><td>{}</td><td>{}</td></tr>\n",
            severity,
            report.summary.count(severity)
        ));
    }
    rows
}

fn build_sections(sections: &[ReportSection]) -> String {
    let mut html = String::new();
    for section in sections {
        let (class, label) = match section.source {
            SectionSource::Generated => ("generated", "AI-generated"),
            SectionSource::Fallback => ("fallback", "Template fallback"),
        };
        html.push_str(&format!(
            concat!(
                "        <div class=\"section\" data-source=\"{class}\">\n",
                "            <h2>{name}<span class=\"provenance {class}\">{label}</span></h2>\n",
                "            <p>{text}</p>\n",
                "        </div>\n",
            ),
            class = class,
            label = label,
            name = escape_html(&section.name),
            text = multiline(&escape_html(&section.text)),
        ));
    }
    html
}

fn build_finding_cards(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "            <p>No findings were identified in this scan.</p>\n".to_string();
    }

    let mut html = String::new();
    for finding in findings {
        let severity_class = finding.severity.as_str().to_lowercase();
        html.push_str(&format!(
            concat!(
                "            <div class=\"vulnerability {class}\">\n",
                "                <h3>{id}. {title}<span class=\"badge {class}\">{severity}</span></h3>\n",
            ),
            class = severity_class,
            id = finding.id,
            title = escape_html(&finding.title),
            severity = finding.severity,
        ));

        if !finding.location.is_empty() {
            html.push_str(&format!(
                "                <div class=\"location\">{}</div>\n",
                escape_html(&finding.location)
            ));
        }
        if !finding.description.is_empty() {
            html.push_str(&format!(
                "                <p>{}</p>\n",
                multiline(&escape_html(&finding.description))
            ));
        }
        if !finding.impact.is_empty() {
            html.push_str(&format!(
                "                <p><strong>Impact:</strong> {}</p>\n",
                multiline(&escape_html(&finding.impact))
            ));
        }
        if let Some(ref code) = finding.code_snippet {
            html.push_str(&format!(
                "                <pre><code>{}</code></pre>\n",
                escape_html(code)
            ));
        }
        html.push_str("            </div>\n");
    }
    html
}

fn multiline(escaped: &str) -> String {
    escaped.replace('\n', "<br>\n")
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::CategorySummary;
    use crate::narrative::SectionSource;
    use chrono::TimeZone;

    fn finding(id: u32, title: &str, severity: Severity) -> Finding {
        Finding {
            id,
            title: title.to_string(),
            severity,
            location: "src/app.py:10".to_string(),
            description: "desc".to_string(),
            impact: "impact".to_string(),
            code_snippet: None,
        }
    }

    fn report(findings: Vec<Finding>, sections: Vec<ReportSection>) -> Report {
        let summary = CategorySummary::categorize(&findings);
        Report {
            findings,
            summary,
            sections,
            generated_at: chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_escape_html_encodes_special_chars() {
        assert_eq!(escape_html("hello"), "hello");
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_all_severity_rows_present() {
        let html = render(&report(
            vec![finding(1, "XXE", Severity::Critical)],
            vec![],
        ));
        assert!(html.contains("<tr><td>Critical</td><td>1</td></tr>"));
        assert!(html.contains("<tr><td>High</td><td>0</td></tr>"));
        assert!(html.contains("<tr><td>Medium</td><td>0</td></tr>"));
        assert!(html.contains("<tr><td>Low</td><td>0</td></tr>"));
        assert!(html.contains("<th>Total</th><th>1</th>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let r = report(
            vec![finding(1, "XXE", Severity::Critical)],
            vec![ReportSection {
                name: "Executive Summary".to_string(),
                text: "all good".to_string(),
                source: SectionSource::Generated,
            }],
        );
        assert_eq!(render(&r), render(&r));
    }

    #[test]
    fn test_markup_in_fields_renders_inert() {
        let mut f = finding(1, "<script>alert(1)</script>", Severity::High);
        f.description = "{{SEVERITY_ROWS}} <img src=x onerror=alert(1)>".to_string();
        f.code_snippet = Some("</div><script>evil()</script>".to_string());

        let html = render(&report(vec![f], vec![]));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(html.contains("&lt;/div&gt;&lt;script&gt;evil()&lt;/script&gt;"));
    }

    #[test]
    fn test_placeholder_in_section_text_stays_literal() {
        let html = render(&report(
            vec![finding(1, "XXE", Severity::Critical)],
            vec![ReportSection {
                name: "Executive Summary".to_string(),
                text: "see {{FINDINGS}} below".to_string(),
                source: SectionSource::Generated,
            }],
        ));
        assert!(html.contains("see {{FINDINGS}} below"));
        // The real findings block expands exactly once.
        assert_eq!(html.matches("class=\"vulnerability critical\"").count(), 1);
    }

    #[test]
    fn test_placeholder_in_finding_text_stays_literal() {
        let mut f = finding(1, "XXE", Severity::Critical);
        f.description = "{{SECTIONS}} and {{TIMESTAMP}}".to_string();
        let html = render(&report(vec![f], vec![]));
        assert!(html.contains("{{SECTIONS}} and {{TIMESTAMP}}"));
    }

    #[test]
    fn test_section_provenance_markers() {
        let html = render(&report(
            vec![],
            vec![
                ReportSection {
                    name: "Executive Summary".to_string(),
                    text: "generated text".to_string(),
                    source: SectionSource::Generated,
                },
                ReportSection {
                    name: "Recommendations".to_string(),
                    text: "fallback text".to_string(),
                    source: SectionSource::Fallback,
                },
            ],
        ));
        assert!(html.contains("data-source=\"generated\""));
        assert!(html.contains("data-source=\"fallback\""));
        assert!(html.contains("AI-generated"));
        assert!(html.contains("Template fallback"));
    }

    #[test]
    fn test_empty_findings_message() {
        let html = render(&report(vec![], vec![]));
        assert!(html.contains("No findings were identified"));
    }

    #[test]
    fn test_timestamp_isolated_to_footer() {
        let html = render(&report(vec![], vec![]));
        assert_eq!(html.matches("2024-06-01 12:00 UTC").count(), 1);
        assert!(html.contains("Report generated by ailamb v"));
    }
}
