// Commodity - leaf level of the taxonomy tree

use serde::{Deserialize, Serialize};

use super::RecordId;

/// Persisted Commodity row. Child of a Classification, has no children
/// and no registry key.
///
/// Commodities are not deduplicated: one CSV row is one Commodity, so no
/// projection record exists for this level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commodity {
    pub id: RecordId,

    /// Handle of the owning Classification.
    pub classification_id: RecordId,

    /// Commodity code.
    pub code: i64,

    pub name: String,
}
