// Entity Models - the four taxonomy levels
//
// Each level has:
// - A persisted entity struct (id, parent id, natural code, name)
// - For the deduplicated levels, a projection record carrying the full
//   CSV column tuple that identity is judged by
// - A `ref_key` builder producing the natural-key string the reference
//   registry is keyed on

pub mod segment;
pub mod family;
pub mod classification;
pub mod commodity;

pub use segment::{Segment, SegmentRecord};
pub use family::{Family, FamilyRecord};
pub use classification::{Classification, ClassificationRecord};
pub use commodity::Commodity;

/// Handle of a persisted (or pending-flush) record.
///
/// Allocated by the session before the row is durably written, so children
/// can link to parents that are still buffered.
pub type RecordId = i64;
