// Prepare stage - project rows into per-level record sets and deduplicate

use std::collections::HashSet;

use tracing::debug;

use crate::entities::{ClassificationRecord, FamilyRecord, SegmentRecord};
use crate::parser::TaxonomyRow;

/// The four per-level record sets produced from the raw rows.
///
/// Segments, families and classifications are deduplicated by full-tuple
/// equality, first occurrence wins the position. Commodities pass through
/// untouched: one CSV row is one commodity.
///
/// This is a plain value handed to each load stage in turn; nothing about
/// it is cached globally.
#[derive(Debug, Clone, Default)]
pub struct PreparedData {
    pub segments: Vec<SegmentRecord>,
    pub families: Vec<FamilyRecord>,
    pub classifications: Vec<ClassificationRecord>,
    pub commodities: Vec<TaxonomyRow>,
}

impl PreparedData {
    pub fn is_empty(&self) -> bool {
        self.commodities.is_empty()
    }
}

/// Project and deduplicate in a single pass over the raw rows.
pub fn prepare(rows: &[TaxonomyRow]) -> PreparedData {
    let mut data = PreparedData::default();

    let mut seen_segments = HashSet::new();
    let mut seen_families = HashSet::new();
    let mut seen_classifications = HashSet::new();

    for row in rows {
        let segment = SegmentRecord::from_row(row);
        if seen_segments.insert(segment.clone()) {
            data.segments.push(segment);
        }

        let family = FamilyRecord::from_row(row);
        if seen_families.insert(family.clone()) {
            data.families.push(family);
        }

        let classification = ClassificationRecord::from_row(row);
        if seen_classifications.insert(classification.clone()) {
            data.classifications.push(classification);
        }
    }

    data.commodities = rows.to_vec();

    debug!(
        segments = data.segments.len(),
        families = data.families.len(),
        classifications = data.classifications.len(),
        commodities = data.commodities.len(),
        "prepared record sets"
    );

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        segment: i64,
        segment_name: &str,
        family: i64,
        family_name: &str,
        class: i64,
        class_name: &str,
        commodity: i64,
        commodity_name: &str,
    ) -> TaxonomyRow {
        TaxonomyRow {
            segment,
            segment_name: segment_name.to_string(),
            family,
            family_name: family_name.to_string(),
            class,
            class_name: class_name.to_string(),
            commodity,
            commodity_name: commodity_name.to_string(),
        }
    }

    #[test]
    fn test_dedup_collapses_repeated_tuples() {
        let rows = vec![
            row(10, "Food", 1010, "Cereals", 101010, "Wheat", 10101001, "Wheat Seed"),
            row(10, "Food", 1010, "Cereals", 101010, "Wheat", 10101002, "Wheat Flour"),
        ];

        let data = prepare(&rows);

        assert_eq!(data.segments.len(), 1);
        assert_eq!(data.families.len(), 1);
        assert_eq!(data.classifications.len(), 1);
        assert_eq!(data.commodities.len(), 2, "commodities are never deduplicated");
    }

    #[test]
    fn test_first_occurrence_order_is_preserved() {
        let rows = vec![
            row(20, "Minerals", 2010, "Ores", 201010, "Iron", 20101001, "Iron ore"),
            row(10, "Food", 1010, "Cereals", 101010, "Wheat", 10101001, "Wheat Seed"),
            row(20, "Minerals", 2011, "Metals", 201110, "Steel", 20111001, "Steel rod"),
        ];

        let data = prepare(&rows);

        let segment_codes: Vec<i64> = data.segments.iter().map(|s| s.code).collect();
        assert_eq!(segment_codes, vec![20, 10]);

        let family_codes: Vec<i64> = data.families.iter().map(|f| f.code).collect();
        assert_eq!(family_codes, vec![2010, 1010, 2011]);
    }

    #[test]
    fn test_same_code_different_name_kept_as_two_records() {
        // Full-tuple equality: a renamed segment is a distinct tuple.
        let rows = vec![
            row(10, "Food", 1010, "Cereals", 101010, "Wheat", 10101001, "Wheat Seed"),
            row(10, "Foodstuff", 1010, "Cereals", 101010, "Wheat", 10101002, "Wheat Flour"),
        ];

        let data = prepare(&rows);

        assert_eq!(data.segments.len(), 2);
        // The family tuples differ in their segment-name column as well.
        assert_eq!(data.families.len(), 2);
    }

    #[test]
    fn test_identical_commodity_rows_pass_through() {
        let r = row(10, "Food", 1010, "Cereals", 101010, "Wheat", 10101001, "Wheat Seed");
        let rows = vec![r.clone(), r];

        let data = prepare(&rows);
        assert_eq!(data.commodities.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let data = prepare(&[]);
        assert!(data.is_empty());
        assert!(data.segments.is_empty());
    }
}
