//! Finding extraction from semi-structured SAST documents
//!
//! Parsing is line-oriented and label-driven rather than grammar-strict: a
//! severity section starts at a heading whose leading word is one of the four
//! severity labels, a finding block starts at a numbered or bulleted
//! sub-heading inside a section, and fields are recognized by a
//! `Label: value` prefix. Text between recognized labels belongs to the most
//! recent field.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::findings::{Finding, Severity};
use crate::{Error, Result};

/// Heading line introducing a severity section, e.g. `## Critical Severity Findings`
static SEVERITY_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*#{0,6}\s*(critical|high|medium|low)(?:\s+(?:severity|risk|findings|issues|vulnerabilities))*\s*:?\s*$",
    )
    .expect("Hardcoded regex pattern should be valid")
});

/// Numbered or bulleted sub-heading introducing one finding block
static FINDING_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| {
        Regex::new(r"^\s*#{0,6}\s*(?:\d+[.)]\s+|[-*]\s+)(.+?)\s*$")
            .expect("Hardcoded regex pattern should be valid")
    });

/// Labeled field line, e.g. `**Location:** src/parser.rs:42`
static FIELD_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*]\s*)?\*{0,2}(location|description|impact|code)\*{0,2}\s*:\s*\*{0,2}\s*(.*)$",
    )
    .expect("Hardcoded regex pattern should be valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Location,
    Description,
    Impact,
    Code,
}

impl Field {
    fn parse(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "location" => Some(Field::Location),
            "description" => Some(Field::Description),
            "impact" => Some(Field::Impact),
            "code" => Some(Field::Code),
            _ => None,
        }
    }
}

/// A finding block being accumulated during the line scan
#[derive(Debug, Default)]
struct Block {
    title: String,
    location: String,
    description: String,
    impact: String,
    code: String,
}

impl Block {
    fn new(title: String) -> Self {
        Self {
            title,
            ..Self::default()
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Location => &mut self.location,
            Field::Description => &mut self.description,
            Field::Impact => &mut self.impact,
            Field::Code => &mut self.code,
        }
    }

    fn append(&mut self, field: Field, text: &str) {
        let value = self.field_mut(field);
        if !value.is_empty() {
            value.push('\n');
        }
        value.push_str(text);
    }

    fn into_finding(self, id: u32, severity: Severity) -> Finding {
        let code = strip_code_fences(&self.code);
        Finding {
            id,
            title: self.title,
            severity,
            location: self.location.trim().to_string(),
            description: self.description.trim().to_string(),
            impact: self.impact.trim().to_string(),
            code_snippet: if code.is_empty() { None } else { Some(code) },
        }
    }
}

/// Extract findings from a semi-structured SAST document.
///
/// Returns [`Error::MalformedInput`] when the document contains no
/// recognizable severity section. A severity section with zero finding
/// blocks is valid (clean scan) and yields an empty vector.
pub fn extract(document: &str) -> Result<Vec<Finding>> {
    let mut findings = Vec::new();
    let mut severity: Option<Severity> = None;
    let mut saw_section = false;
    let mut block: Option<Block> = None;
    let mut field: Option<Field> = None;
    let mut next_id: u32 = 1;

    let mut flush =
        |block: &mut Option<Block>, severity: Option<Severity>, findings: &mut Vec<Finding>| {
            if let (Some(b), Some(sev)) = (block.take(), severity) {
                findings.push(b.into_finding(next_id, sev));
                next_id += 1;
            }
        };

    for line in document.lines() {
        if let Some(caps) = SEVERITY_HEADING_RE.captures(line) {
            flush(&mut block, severity, &mut findings);
            field = None;
            severity = Severity::parse(&caps[1]);
            saw_section |= severity.is_some();
            continue;
        }

        // Everything before the first severity section is preamble.
        if severity.is_none() {
            continue;
        }

        // Labeled field lines take precedence over bullets: a bulleted
        // `- Location: ...` is a field of the current block, not a new one.
        if block.is_some() {
            if let Some(caps) = FIELD_LABEL_RE.captures(line) {
                let f = Field::parse(&caps[1]).unwrap_or(Field::Description);
                field = Some(f);
                let rest = caps[2].trim();
                if !rest.is_empty() {
                    if let Some(b) = block.as_mut() {
                        b.append(f, rest);
                    }
                }
                continue;
            }
        }

        if let Some(caps) = FINDING_HEADING_RE.captures(line) {
            flush(&mut block, severity, &mut findings);
            field = None;
            block = Some(Block::new(clean_title(&caps[1])));
            continue;
        }

        // Continuation of the most recent field, until the next label or
        // block boundary.
        if let (Some(b), Some(f)) = (block.as_mut(), field) {
            let text = line.trim_end();
            if !text.trim().is_empty() || f == Field::Code {
                b.append(f, text);
            }
        }
    }
    flush(&mut block, severity, &mut findings);

    if !saw_section {
        return Err(Error::MalformedInput(
            "no severity section headings found".to_string(),
        ));
    }

    tracing::debug!(count = findings.len(), "extracted findings");
    Ok(findings)
}

/// Strip markdown emphasis markers from a finding title
fn clean_title(raw: &str) -> String {
    raw.trim_matches(|c| c == '*' || c == '_' || c == '`' || c == ' ')
        .to_string()
}

/// Drop markdown fence lines from an accumulated code field
fn strip_code_fences(code: &str) -> String {
    code.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
