use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use super::errors::{DomainError, DomainResult};

/// Per-session user overrides keyed by update id.
pub type EditMap = BTreeMap<u32, String>;

/// Impact classification of a regulatory update.
///
/// The declaration order is the report's section order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImpactLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl ImpactLevel {
    /// All levels in section order.
    pub const ALL: [ImpactLevel; 4] = [
        ImpactLevel::Critical,
        ImpactLevel::High,
        ImpactLevel::Medium,
        ImpactLevel::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ImpactLevel::Critical => "CRITICAL",
            ImpactLevel::High => "HIGH",
            ImpactLevel::Medium => "MEDIUM",
            ImpactLevel::Low => "LOW",
        }
    }

    /// Human-readable section title used in the exported report.
    pub fn section_title(self) -> &'static str {
        match self {
            ImpactLevel::Critical => "Critical or High Priority",
            ImpactLevel::High => "High Priority",
            ImpactLevel::Medium => "Medium Priority",
            ImpactLevel::Low => "Emerging Trends / No Material Changes",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Ok(ImpactLevel::Critical),
            "HIGH" => Ok(ImpactLevel::High),
            "MEDIUM" => Ok(ImpactLevel::Medium),
            "LOW" => Ok(ImpactLevel::Low),
            _ => Err(DomainError::UnknownImpactLevel(s.to_string())),
        }
    }
}

/// Unvalidated field set for an update record, as written in seed data.
#[derive(Debug, Clone)]
pub struct UpdateDraft<'a> {
    pub id: u32,
    pub country: &'a str,
    pub regulation_name: &'a str,
    pub reference_number: &'a str,
    pub authority: &'a str,
    pub summary: &'a str,
    pub key_changes: &'a [&'a str],
    pub effective_date: &'a str,
    pub compliance_deadline: &'a str,
    pub transition_period: &'a str,
    pub applicable: bool,
    pub impact_level: &'a str,
    pub harmonization: &'a [&'a str],
    pub affected_products: &'a [&'a str],
    pub rationale: &'a str,
}

/// One regulatory-change entry with its impact classification.
///
/// Built once from seed data through [`UpdateRecord::from_draft`] and never
/// mutated afterwards; fields are read through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRecord {
    id: u32,
    country: String,
    regulation_name: String,
    reference_number: String,
    authority: String,
    summary: String,
    key_changes: Vec<String>,
    effective_date: NaiveDate,
    compliance_deadline: NaiveDate,
    transition_period: String,
    applicable: bool,
    impact_level: ImpactLevel,
    harmonization: Vec<String>,
    affected_products: Vec<String>,
    rationale: String,
}

const DATE_FORMAT: &str = "%Y-%m-%d";

impl UpdateRecord {
    /// Validates a draft and builds the record.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownImpactLevel`] when the impact level is not
    /// one of the four recognized values, and [`DomainError::InvalidRecord`]
    /// for a zero id, a blank country or regulation name, a malformed date, or
    /// a deadline that precedes the effective date.
    pub fn from_draft(draft: &UpdateDraft<'_>) -> DomainResult<Self> {
        let id = draft.id;
        let invalid = |reason: String| DomainError::InvalidRecord { id, reason };

        if id == 0 {
            return Err(invalid("id must be non-zero".to_string()));
        }
        if draft.country.trim().is_empty() {
            return Err(invalid("country is empty".to_string()));
        }
        if draft.regulation_name.trim().is_empty() {
            return Err(invalid("regulation name is empty".to_string()));
        }

        let impact_level = draft.impact_level.parse::<ImpactLevel>()?;
        let effective_date = NaiveDate::parse_from_str(draft.effective_date, DATE_FORMAT)
            .map_err(|e| invalid(format!("effective date '{}': {}", draft.effective_date, e)))?;
        let compliance_deadline = NaiveDate::parse_from_str(draft.compliance_deadline, DATE_FORMAT)
            .map_err(|e| invalid(format!("compliance deadline '{}': {}", draft.compliance_deadline, e)))?;
        if compliance_deadline < effective_date {
            return Err(invalid("compliance deadline precedes effective date".to_string()));
        }

        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Ok(Self {
            id,
            country: draft.country.to_string(),
            regulation_name: draft.regulation_name.to_string(),
            reference_number: draft.reference_number.to_string(),
            authority: draft.authority.to_string(),
            summary: draft.summary.to_string(),
            key_changes: owned(draft.key_changes),
            effective_date,
            compliance_deadline,
            transition_period: draft.transition_period.to_string(),
            applicable: draft.applicable,
            impact_level,
            harmonization: owned(draft.harmonization),
            affected_products: owned(draft.affected_products),
            rationale: draft.rationale.to_string(),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn regulation_name(&self) -> &str {
        &self.regulation_name
    }

    pub fn reference_number(&self) -> &str {
        &self.reference_number
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn key_changes(&self) -> &[String] {
        &self.key_changes
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }

    pub fn compliance_deadline(&self) -> NaiveDate {
        self.compliance_deadline
    }

    pub fn transition_period(&self) -> &str {
        &self.transition_period
    }

    pub fn applicable(&self) -> bool {
        self.applicable
    }

    pub fn impact_level(&self) -> ImpactLevel {
        self.impact_level
    }

    pub fn harmonization(&self) -> &[String] {
        &self.harmonization
    }

    pub fn affected_products(&self) -> &[String] {
        &self.affected_products
    }

    /// Default rationale text shown until the user overrides it.
    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    /// Default affected-products text: the product list joined with ", ".
    pub fn affected_products_text(&self) -> String {
        self.affected_products.join(", ")
    }

    pub fn applicability_banner(&self) -> &'static str {
        if self.applicable {
            "[GUARDANT HEALTH APPLICABLE]"
        } else {
            "[NOT DIRECTLY APPLICABLE]"
        }
    }

    /// `country, regulation (reference), authority`
    pub fn header_line(&self) -> String {
        format!(
            "{}, {} ({}), {}",
            self.country, self.regulation_name, self.reference_number, self.authority
        )
    }

    pub fn effective_date_text(&self) -> String {
        self.effective_date.format(DATE_FORMAT).to_string()
    }

    pub fn compliance_deadline_text(&self) -> String {
        self.compliance_deadline.format(DATE_FORMAT).to_string()
    }

    /// Rationale from the edit map when present, otherwise the default.
    pub fn resolve_rationale<'a>(&'a self, edits: &'a EditMap) -> &'a str {
        edits.get(&self.id).map(String::as_str).unwrap_or(self.rationale.as_str())
    }

    /// Affected products from the edit map when present, otherwise the default list.
    pub fn resolve_affected(&self, edits: &EditMap) -> String {
        edits
            .get(&self.id)
            .cloned()
            .unwrap_or_else(|| self.affected_products_text())
    }
}

/// Builds a record set from drafts, rejecting duplicate ids.
pub fn build_records(drafts: &[UpdateDraft<'_>]) -> DomainResult<Vec<UpdateRecord>> {
    let mut seen = HashSet::new();
    drafts
        .iter()
        .map(|draft| {
            if !seen.insert(draft.id) {
                return Err(DomainError::DuplicateId(draft.id));
            }
            UpdateRecord::from_draft(draft)
        })
        .collect()
}
