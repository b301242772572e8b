//! Report generation: domain report content rendered to PDF bytes.

use chrono::NaiveDateTime;

use crate::domain::{build_report, EditMap, UpdateRecord, REPORT_TITLE};
use crate::infrastructure::PdfRenderer;

/// Renders the annotated update set as PDF bytes.
///
/// Pure with respect to its inputs: the same records, edit maps and
/// timestamp always produce the same bytes.
pub fn generate_report(
    updates: &[UpdateRecord],
    rationales: &EditMap,
    affected: &EditMap,
    generated_at: NaiveDateTime,
) -> Vec<u8> {
    let elements = build_report(updates, rationales, affected, generated_at);
    PdfRenderer::render(&elements, REPORT_TITLE, generated_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed_updates;
    use chrono::NaiveDate;

    fn timestamp(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 18)
            .and_then(|d| d.and_hms_opt(8, minute, 0))
            .unwrap()
    }

    #[test]
    fn test_identical_inputs_give_identical_bytes() {
        let updates = seed_updates().unwrap();
        let mut affected = EditMap::new();
        affected.insert(1, "Shield".to_string());
        let first = generate_report(&updates, &EditMap::new(), &affected, timestamp(0));
        let second = generate_report(&updates, &EditMap::new(), &affected, timestamp(0));
        assert_eq!(first, second);
    }

    #[test]
    fn test_timestamp_changes_output() {
        let updates = seed_updates().unwrap();
        let first = generate_report(&updates, &EditMap::new(), &EditMap::new(), timestamp(0));
        let second = generate_report(&updates, &EditMap::new(), &EditMap::new(), timestamp(1));
        assert_ne!(first, second);
    }

    #[test]
    fn test_edited_latin_text_is_rendered() {
        let updates = seed_updates().unwrap();
        let mut affected = EditMap::new();
        affected.insert(1, "Guardant360\u{ae} Z\u{fc}rich".to_string());
        let pdf = generate_report(&updates, &EditMap::new(), &affected, timestamp(0));
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("(: Guardant360\\256 Z\\374rich) Tj"));
    }

    #[test]
    fn test_seed_report_layout() {
        let updates = seed_updates().unwrap();
        let pdf = generate_report(&updates, &EditMap::new(), &EditMap::new(), timestamp(0));
        let text = String::from_utf8_lossy(&pdf);

        assert!(text.contains("(Guardant Health Regulatory Intelligence - MVP Report) Tj"));
        assert!(text.contains("(Generated at: 2025-10-18 08:00) Tj"));
        assert!(text.contains("(No updates in this section.) Tj"));
        // One page per section.
        assert_eq!(text.matches("/Type /Page ").count(), 4);

        let critical = text.find("(Critical or High Priority) Tj").unwrap();
        let high = text.find("(High Priority) Tj").unwrap();
        let medium = text.find("(Medium Priority) Tj").unwrap();
        let low = text.find("(Emerging Trends / No Material Changes) Tj").unwrap();
        assert!(critical < high && high < medium && medium < low);
    }
}
