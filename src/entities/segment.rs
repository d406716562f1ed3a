// Segment - top level of the taxonomy tree

use serde::{Deserialize, Serialize};

use super::RecordId;
use crate::parser::TaxonomyRow;

/// Persisted Segment row. Root of the hierarchy, owns Families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: RecordId,

    /// Segment code, unique across all segments.
    pub code: i64,

    pub name: String,
}

impl Segment {
    /// Reference registry key for a segment code, e.g. `segment-10`.
    pub fn ref_key(code: i64) -> String {
        format!("segment-{}", code)
    }
}

/// Segment projection of one CSV row.
///
/// Two rows naming the same (code, name) pair collapse to one Segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub code: i64,
    pub name: String,
}

impl SegmentRecord {
    pub fn from_row(row: &TaxonomyRow) -> Self {
        SegmentRecord {
            code: row.segment,
            name: row.segment_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_key_format() {
        assert_eq!(Segment::ref_key(10), "segment-10");
        assert_eq!(Segment::ref_key(94000000), "segment-94000000");
    }
}
