//! Grouping of update records by impact level.

use super::models::{ImpactLevel, UpdateRecord};

/// Update records partitioned into the four impact buckets.
///
/// Each bucket keeps the relative order of the input slice.
///
/// # Examples
///
/// ```
/// use regintel::domain::{group_by_impact, seed_updates, ImpactLevel};
///
/// let updates = seed_updates().unwrap();
/// let buckets = group_by_impact(&updates);
/// assert_eq!(buckets.len(ImpactLevel::Medium), 0);
/// assert_eq!(buckets.get(ImpactLevel::Critical)[0].id(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ImpactBuckets<'a> {
    critical: Vec<&'a UpdateRecord>,
    high: Vec<&'a UpdateRecord>,
    medium: Vec<&'a UpdateRecord>,
    low: Vec<&'a UpdateRecord>,
}

impl<'a> ImpactBuckets<'a> {
    fn bucket_mut(&mut self, level: ImpactLevel) -> &mut Vec<&'a UpdateRecord> {
        match level {
            ImpactLevel::Critical => &mut self.critical,
            ImpactLevel::High => &mut self.high,
            ImpactLevel::Medium => &mut self.medium,
            ImpactLevel::Low => &mut self.low,
        }
    }

    pub fn get(&self, level: ImpactLevel) -> &[&'a UpdateRecord] {
        match level {
            ImpactLevel::Critical => &self.critical,
            ImpactLevel::High => &self.high,
            ImpactLevel::Medium => &self.medium,
            ImpactLevel::Low => &self.low,
        }
    }

    pub fn len(&self, level: ImpactLevel) -> usize {
        self.get(level).len()
    }

    /// Per-level counts in section order.
    pub fn counts(&self) -> [(ImpactLevel, usize); 4] {
        ImpactLevel::ALL.map(|level| (level, self.len(level)))
    }

    /// Buckets in section order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (ImpactLevel, &[&'a UpdateRecord])> + '_ {
        ImpactLevel::ALL.into_iter().map(move |level| (level, self.get(level)))
    }

    /// Records flattened in section order.
    pub fn ordered(&self) -> Vec<&'a UpdateRecord> {
        ImpactLevel::ALL
            .into_iter()
            .flat_map(|level| self.get(level).iter().copied())
            .collect()
    }
}

pub fn group_by_impact(updates: &[UpdateRecord]) -> ImpactBuckets<'_> {
    let mut buckets = ImpactBuckets::default();
    for update in updates {
        buckets.bucket_mut(update.impact_level()).push(update);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::tests::draft;
    use crate::domain::{build_records, seed_updates};

    fn ids(records: &[&UpdateRecord]) -> Vec<u32> {
        records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_seed_bucket_counts() {
        let updates = seed_updates().unwrap();
        let buckets = group_by_impact(&updates);
        assert_eq!(
            buckets.counts(),
            [
                (ImpactLevel::Critical, 1),
                (ImpactLevel::High, 1),
                (ImpactLevel::Medium, 0),
                (ImpactLevel::Low, 1),
            ]
        );
    }

    #[test]
    fn test_grouping_preserves_input_order() {
        let drafts = [
            draft(5, "LOW"),
            draft(2, "HIGH"),
            draft(9, "LOW"),
            draft(1, "CRITICAL"),
            draft(4, "HIGH"),
            draft(3, "LOW"),
        ];
        let updates = build_records(&drafts).unwrap();
        let buckets = group_by_impact(&updates);

        assert_eq!(ids(buckets.get(ImpactLevel::Low)), vec![5, 9, 3]);
        assert_eq!(ids(buckets.get(ImpactLevel::High)), vec![2, 4]);
        assert_eq!(ids(buckets.get(ImpactLevel::Critical)), vec![1]);
        assert!(buckets.get(ImpactLevel::Medium).is_empty());
    }

    #[test]
    fn test_iter_and_ordered_follow_section_order() {
        let drafts = [draft(1, "low"), draft(2, "medium"), draft(3, "critical")];
        let updates = build_records(&drafts).unwrap();
        let buckets = group_by_impact(&updates);

        let levels: Vec<ImpactLevel> = buckets.iter().map(|(level, _)| level).collect();
        assert_eq!(levels, ImpactLevel::ALL.to_vec());
        assert_eq!(ids(&buckets.ordered()), vec![3, 2, 1]);
    }

    #[test]
    fn test_empty_input() {
        let buckets = group_by_impact(&[]);
        assert!(buckets.counts().iter().all(|(_, n)| *n == 0));
        assert!(buckets.ordered().is_empty());
    }
}
