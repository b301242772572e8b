//! Content model of the exported report.
//!
//! [`build_report`] turns the result set and the session's edit maps into a
//! flat sequence of [`ReportElement`]s. Typesetting and serialization are left
//! to the PDF writer in the infrastructure layer.

use chrono::NaiveDateTime;

use super::models::{EditMap, UpdateRecord};
use super::seed::{COUNTRIES, PRODUCTS};
use super::services::group_by_impact;

pub const REPORT_TITLE: &str = "Guardant Health Regulatory Intelligence - MVP Report";
pub const EMPTY_SECTION_TEXT: &str = "No updates in this section.";
pub const ACTION_STEPS: [&str; 3] = [
    "1. [Specific compliance step 1]",
    "2. [Specific compliance step 2]",
    "3. [Specific compliance step 3]",
];
pub const CROSS_REFERENCE_TEXT: &str = "[Links or notes to similar changes in other countries if applicable]";
pub const REPORT_FILE_NAME: &str = "guardant_regulatory_report.pdf";
pub const REPORT_MEDIA_TYPE: &str = "application/pdf";

/// A finished report ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub file_name: &'static str,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ReportArtifact {
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self {
            file_name: REPORT_FILE_NAME,
            media_type: REPORT_MEDIA_TYPE,
            bytes,
        }
    }
}

/// A run of text with a single weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub text: String,
    pub bold: bool,
}

impl TextSpan {
    pub fn regular(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    Title,
    Section,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportElement {
    Heading { level: HeadingLevel, text: String },
    Paragraph(Vec<TextSpan>),
    /// Vertical gap in points.
    Spacer(f32),
    PageBreak,
}

impl ReportElement {
    fn text(text: impl Into<String>) -> Self {
        ReportElement::Paragraph(vec![TextSpan::regular(text)])
    }

    fn labelled(label: &str, value: impl Into<String>) -> Self {
        ReportElement::Paragraph(vec![TextSpan::bold(label), TextSpan::regular(value)])
    }

    /// Concatenated text of a heading or paragraph; empty for layout elements.
    pub fn plain_text(&self) -> String {
        match self {
            ReportElement::Heading { text, .. } => text.clone(),
            ReportElement::Paragraph(spans) => spans.iter().map(|s| s.text.as_str()).collect(),
            ReportElement::Spacer(_) | ReportElement::PageBreak => String::new(),
        }
    }
}

const INCH: f32 = 72.0;

/// Builds the report content.
///
/// Sections follow the fixed order CRITICAL, HIGH, MEDIUM, LOW and each is
/// followed by a page break; an empty section carries a placeholder line.
/// Rationale and affected products come from the edit maps when an entry
/// exists for the record id, otherwise from the record defaults.
pub fn build_report(
    updates: &[UpdateRecord],
    rationales: &EditMap,
    affected: &EditMap,
    generated_at: NaiveDateTime,
) -> Vec<ReportElement> {
    let mut elements = vec![
        ReportElement::Heading { level: HeadingLevel::Title, text: REPORT_TITLE.to_string() },
        ReportElement::Spacer(0.2 * INCH),
        ReportElement::text(format!("Countries: {}", COUNTRIES.join(", "))),
        ReportElement::text(format!("Products: {}", PRODUCTS.join(", "))),
        ReportElement::Spacer(0.2 * INCH),
        ReportElement::text(format!("Generated at: {}", generated_at.format("%Y-%m-%d %H:%M"))),
        ReportElement::Spacer(0.3 * INCH),
    ];

    let buckets = group_by_impact(updates);
    for (level, section) in buckets.iter() {
        elements.push(ReportElement::Heading {
            level: HeadingLevel::Section,
            text: level.section_title().to_string(),
        });
        elements.push(ReportElement::Spacer(0.15 * INCH));

        if section.is_empty() {
            elements.push(ReportElement::text(EMPTY_SECTION_TEXT));
            elements.push(ReportElement::Spacer(0.1 * INCH));
        }
        for update in section {
            push_update_block(&mut elements, update, rationales, affected);
        }
        elements.push(ReportElement::PageBreak);
    }

    elements
}

fn push_update_block(
    elements: &mut Vec<ReportElement>,
    update: &UpdateRecord,
    rationales: &EditMap,
    affected: &EditMap,
) {
    elements.push(ReportElement::Paragraph(vec![TextSpan::bold(update.applicability_banner())]));
    elements.push(ReportElement::labelled("Country & Regulation", format!(": {}", update.header_line())));
    elements.push(ReportElement::labelled("Change Summary", format!(": {}", update.summary())));
    elements.push(ReportElement::Paragraph(vec![TextSpan::bold("Key Changes:")]));
    for change in update.key_changes() {
        elements.push(ReportElement::text(format!("- {change}")));
    }

    elements.push(ReportElement::Paragraph(vec![TextSpan::bold("Guardant Health Impact Assessment:")]));
    elements.push(ReportElement::Paragraph(vec![
        TextSpan::regular("- "),
        TextSpan::bold("Impact Level"),
        TextSpan::regular(format!(": {}", update.impact_level())),
    ]));
    elements.push(ReportElement::Paragraph(vec![
        TextSpan::regular("- "),
        TextSpan::bold("Rationale"),
        TextSpan::regular(format!(": {}", update.resolve_rationale(rationales))),
    ]));
    elements.push(ReportElement::Paragraph(vec![
        TextSpan::regular("- "),
        TextSpan::bold("Affected Products or Operations"),
        TextSpan::regular(format!(": {}", update.resolve_affected(affected))),
    ]));

    elements.push(ReportElement::Paragraph(vec![TextSpan::bold("Action Required:")]));
    for step in ACTION_STEPS {
        elements.push(ReportElement::text(step));
    }

    elements.push(ReportElement::Paragraph(vec![TextSpan::bold("Timeline:")]));
    elements.push(ReportElement::text(format!("- Effective Date: {}", update.effective_date_text())));
    elements.push(ReportElement::text(format!("- Compliance Deadline: {}", update.compliance_deadline_text())));
    elements.push(ReportElement::text(format!("- Transition Period: {}", update.transition_period())));
    elements.push(ReportElement::labelled(
        "Related Standards or Regulations",
        format!(": {}", update.harmonization().join(", ")),
    ));
    elements.push(ReportElement::Paragraph(vec![
        TextSpan::bold("Cross-Reference:"),
        TextSpan::regular(format!(" {CROSS_REFERENCE_TEXT}")),
    ]));
    elements.push(ReportElement::Spacer(0.2 * INCH));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::tests::draft;
    use crate::domain::{build_records, seed_updates, ImpactLevel};
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 18)
            .and_then(|d| d.and_hms_opt(14, 5, 9))
            .unwrap()
    }

    fn texts(elements: &[ReportElement]) -> Vec<String> {
        elements.iter().map(ReportElement::plain_text).collect()
    }

    fn section_headings(elements: &[ReportElement]) -> Vec<String> {
        elements
            .iter()
            .filter_map(|e| match e {
                ReportElement::Heading { level: HeadingLevel::Section, text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Elements between a section heading and the next page break.
    fn section<'a>(elements: &'a [ReportElement], title: &str) -> &'a [ReportElement] {
        let start = elements
            .iter()
            .position(|e| matches!(e, ReportElement::Heading { text, .. } if text == title))
            .unwrap();
        let len = elements[start..]
            .iter()
            .position(|e| matches!(e, ReportElement::PageBreak))
            .unwrap();
        &elements[start..=start + len]
    }

    #[test]
    fn test_title_block() {
        let updates = seed_updates().unwrap();
        let elements = build_report(&updates, &EditMap::new(), &EditMap::new(), timestamp());
        let lines = texts(&elements);
        assert_eq!(lines[0], REPORT_TITLE);
        assert!(lines.contains(&format!("Countries: {}", COUNTRIES.join(", "))));
        assert!(lines.contains(&"Products: Guardant360, Guardant360 CDx, GuardantOMNI, Guardant Reveal, Shield".to_string()));
        assert!(lines.contains(&"Generated at: 2025-10-18 14:05".to_string()));
    }

    #[test]
    fn test_sections_in_fixed_order_regardless_of_input() {
        let drafts = [draft(1, "LOW"), draft(2, "MEDIUM"), draft(3, "HIGH")];
        let updates = build_records(&drafts).unwrap();
        let elements = build_report(&updates, &EditMap::new(), &EditMap::new(), timestamp());
        let expected: Vec<String> = ImpactLevel::ALL.iter().map(|l| l.section_title().to_string()).collect();
        assert_eq!(section_headings(&elements), expected);
        let page_breaks = elements.iter().filter(|e| matches!(e, ReportElement::PageBreak)).count();
        assert_eq!(page_breaks, 4);
    }

    #[test]
    fn test_empty_section_placeholder_and_page_break() {
        let updates = seed_updates().unwrap();
        let elements = build_report(&updates, &EditMap::new(), &EditMap::new(), timestamp());
        let medium = section(&elements, "Medium Priority");
        assert_eq!(medium.len(), 5);
        assert_eq!(medium[2].plain_text(), EMPTY_SECTION_TEXT);
        assert_eq!(medium.last(), Some(&ReportElement::PageBreak));

        let critical = texts(section(&elements, "Critical or High Priority"));
        assert!(!critical.contains(&EMPTY_SECTION_TEXT.to_string()));
    }

    #[test]
    fn test_record_block_contents() {
        let updates = seed_updates().unwrap();
        let elements = build_report(&updates, &EditMap::new(), &EditMap::new(), timestamp());
        let low = texts(section(&elements, "Emerging Trends / No Material Changes"));
        let expected = [
            "[NOT DIRECTLY APPLICABLE]",
            "Country & Regulation: Germany, EU IVDR Update (IVDR-2025-03), BfArM",
            "Change Summary: EU IVDR changes for multi-gene panels.",
            "Key Changes:",
            "- Expanded scope for NGS panels.",
            "- Impact Level: LOW",
            "- Rationale: Monitoring only; no immediate action.",
            "- Affected Products or Operations: ",
            "1. [Specific compliance step 1]",
            "3. [Specific compliance step 3]",
            "- Effective Date: 2025-11-01",
            "- Compliance Deadline: 2026-05-01",
            "- Transition Period: 6 months",
            "Related Standards or Regulations: ISO 13485, EU IVDR",
        ];
        for line in expected {
            assert!(low.contains(&line.to_string()), "missing line: {line}");
        }
    }

    #[test]
    fn test_edit_maps_override_defaults() {
        let updates = seed_updates().unwrap();
        let mut affected = EditMap::new();
        affected.insert(1, "Shield".to_string());
        let mut rationales = EditMap::new();
        rationales.insert(2, "Reviewed by regulatory team".to_string());

        let elements = build_report(&updates, &rationales, &affected, timestamp());
        let critical = texts(section(&elements, "Critical or High Priority"));
        let high = texts(section(&elements, "High Priority"));

        assert!(critical.contains(&"- Affected Products or Operations: Shield".to_string()));
        assert!(critical.contains(&"- Rationale: Immediate compliance required for NGS-based tests.".to_string()));
        assert!(high.contains(&"- Affected Products or Operations: Guardant Reveal".to_string()));
        assert!(high.contains(&"- Rationale: Reviewed by regulatory team".to_string()));
    }

    #[test]
    fn test_records_keep_input_order_within_section() {
        let drafts = [draft(8, "HIGH"), draft(3, "HIGH"), draft(5, "HIGH")];
        let updates = build_records(&drafts).unwrap();
        let mut rationales = EditMap::new();
        for id in [8, 3, 5] {
            rationales.insert(id, format!("note {id}"));
        }
        let elements = build_report(&updates, &rationales, &EditMap::new(), timestamp());
        let order: Vec<String> = texts(section(&elements, "High Priority"))
            .into_iter()
            .filter(|t| t.starts_with("- Rationale"))
            .collect();
        assert_eq!(order, vec!["- Rationale: note 8", "- Rationale: note 3", "- Rationale: note 5"]);
    }
}
