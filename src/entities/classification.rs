// Classification - third taxonomy level, owned by a Family

use serde::{Deserialize, Serialize};

use super::RecordId;
use crate::parser::TaxonomyRow;

/// Persisted Classification row. Child of a Family, owns Commodities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub id: RecordId,

    /// Handle of the owning Family.
    pub family_id: RecordId,

    /// Class code, unique within the taxonomy.
    pub code: i64,

    pub name: String,
}

impl Classification {
    /// Reference registry key for a class code, e.g. `classification-101015`.
    pub fn ref_key(code: i64) -> String {
        format!("classification-{}", code)
    }
}

/// Classification projection of one CSV row, including all ancestor columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub segment: i64,
    pub segment_name: String,
    pub family: i64,
    pub family_name: String,
    pub code: i64,
    pub name: String,
}

impl ClassificationRecord {
    pub fn from_row(row: &TaxonomyRow) -> Self {
        ClassificationRecord {
            segment: row.segment,
            segment_name: row.segment_name.clone(),
            family: row.family,
            family_name: row.family_name.clone(),
            code: row.class,
            name: row.class_name.clone(),
        }
    }
}
