// Family - second taxonomy level, owned by a Segment

use serde::{Deserialize, Serialize};

use super::RecordId;
use crate::parser::TaxonomyRow;

/// Persisted Family row. Child of a Segment, owns Classifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: RecordId,

    /// Handle of the owning Segment.
    pub segment_id: RecordId,

    /// Family code, unique within the taxonomy.
    pub code: i64,

    pub name: String,
}

impl Family {
    /// Reference registry key for a family code, e.g. `family-1010`.
    pub fn ref_key(code: i64) -> String {
        format!("family-{}", code)
    }
}

/// Family projection of one CSV row.
///
/// Carries the segment columns as well: identity is the full projected
/// tuple, so the same family code under two differently named segments
/// yields two records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FamilyRecord {
    pub segment: i64,
    pub segment_name: String,
    pub code: i64,
    pub name: String,
}

impl FamilyRecord {
    pub fn from_row(row: &TaxonomyRow) -> Self {
        FamilyRecord {
            segment: row.segment,
            segment_name: row.segment_name.clone(),
            code: row.family,
            name: row.family_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TaxonomyRow;

    fn sample_row() -> TaxonomyRow {
        TaxonomyRow {
            segment: 10,
            segment_name: "Live Plant and Animal Material".to_string(),
            family: 1010,
            family_name: "Live animals".to_string(),
            class: 101015,
            class_name: "Livestock".to_string(),
            commodity: 10101501,
            commodity_name: "Cats".to_string(),
        }
    }

    #[test]
    fn test_projection_keeps_segment_columns() {
        let record = FamilyRecord::from_row(&sample_row());

        assert_eq!(record.segment, 10);
        assert_eq!(record.segment_name, "Live Plant and Animal Material");
        assert_eq!(record.code, 1010);
        assert_eq!(record.name, "Live animals");
    }

    #[test]
    fn test_ref_key_format() {
        assert_eq!(Family::ref_key(1010), "family-1010");
    }
}
