//! Static scope lists and the stub update set shown by every session.

use super::errors::DomainResult;
use super::models::{build_records, UpdateDraft, UpdateRecord};

pub const COUNTRIES: &[&str] = &[
    "United States",
    "United Kingdom",
    "Japan",
    "United Arab Emirates",
    "Korea, Republic of",
    "India",
    "China",
    "Italy",
    "Switzerland",
    "Taiwan",
    "Spain",
    "Turkey",
    "Israel",
    "Germany",
    "Canada",
];

pub const PRODUCTS: &[&str] = &[
    "Guardant360",
    "Guardant360 CDx",
    "GuardantOMNI",
    "Guardant Reveal",
    "Shield",
];

const SEED_DRAFTS: &[UpdateDraft<'static>] = &[
    UpdateDraft {
        id: 1,
        country: "United States",
        regulation_name: "CLIA Update 2025",
        reference_number: "CLIA-2025-01",
        authority: "CMS",
        summary: "CLIA regulations updated for NGS-based diagnostics.",
        key_changes: &[
            "Expanded oversight for ctDNA tests.",
            "New reporting requirements.",
            "Shortened compliance window.",
        ],
        effective_date: "2025-12-01",
        compliance_deadline: "2026-03-01",
        transition_period: "3 months",
        applicable: true,
        impact_level: "CRITICAL",
        harmonization: &["CLIA", "CAP", "FDA guidance"],
        affected_products: &["Guardant360", "GuardantOMNI"],
        rationale: "Immediate compliance required for NGS-based tests.",
    },
    UpdateDraft {
        id: 2,
        country: "Japan",
        regulation_name: "PMDA Guidance on Liquid Biopsy",
        reference_number: "PMDA-2025-02",
        authority: "PMDA",
        summary: "New guidance for liquid biopsy cancer screening.",
        key_changes: &[
            "Clarified requirements for ctDNA.",
            "Introduced ISO 15189 mapping.",
            "Defined transition period.",
        ],
        effective_date: "2026-01-15",
        compliance_deadline: "2026-07-15",
        transition_period: "6 months",
        applicable: true,
        impact_level: "HIGH",
        harmonization: &["ISO 15189", "IMDRF"],
        affected_products: &["Guardant Reveal"],
        rationale: "Action required within 3 months for new tests.",
    },
    UpdateDraft {
        id: 3,
        country: "Germany",
        regulation_name: "EU IVDR Update",
        reference_number: "IVDR-2025-03",
        authority: "BfArM",
        summary: "EU IVDR changes for multi-gene panels.",
        key_changes: &[
            "Expanded scope for NGS panels.",
            "New harmonization with ISO 13485.",
            "Monitoring only for now.",
        ],
        effective_date: "2025-11-01",
        compliance_deadline: "2026-05-01",
        transition_period: "6 months",
        applicable: false,
        impact_level: "LOW",
        harmonization: &["ISO 13485", "EU IVDR"],
        affected_products: &[],
        rationale: "Monitoring only; no immediate action.",
    },
];

/// Builds the validated stub update set.
pub fn seed_updates() -> DomainResult<Vec<UpdateRecord>> {
    build_records(SEED_DRAFTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImpactLevel;

    #[test]
    fn test_seed_updates_are_valid() {
        let updates = seed_updates().unwrap();
        assert_eq!(updates.len(), 3);
        let ids: Vec<u32> = updates.iter().map(|u| u.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let levels: Vec<ImpactLevel> = updates.iter().map(|u| u.impact_level()).collect();
        assert_eq!(levels, vec![ImpactLevel::Critical, ImpactLevel::High, ImpactLevel::Low]);
    }

    #[test]
    fn test_seed_defaults() {
        let updates = seed_updates().unwrap();
        assert_eq!(updates[1].affected_products_text(), "Guardant Reveal");
        assert_eq!(updates[2].affected_products_text(), "");
        assert!(!updates[2].applicable());
    }

    #[test]
    fn test_scope_lists() {
        assert_eq!(COUNTRIES.len(), 15);
        assert_eq!(PRODUCTS.len(), 5);
        assert!(COUNTRIES.contains(&"Korea, Republic of"));
        assert_eq!(PRODUCTS.last(), Some(&"Shield"));
    }
}
