// Taxonomy Loader - Core Library
// Exposes all modules for use in the CLI and tests

pub mod db;
pub mod entities;
pub mod error;
pub mod loader;
pub mod parser;
pub mod prepare;
pub mod refs;

// Re-export commonly used types
pub use db::{
    setup_database, SqliteSession,
    taxonomy_stats, TaxonomyStats,
    segment_by_code, families_of_segment, classifications_of_family,
    commodities_of_classification,
    LoadEvent, insert_load_event, get_load_events,
};
pub use entities::{
    RecordId,
    Segment, SegmentRecord,
    Family, FamilyRecord,
    Classification, ClassificationRecord,
    Commodity,
};
pub use error::{LoadError, LoadResult};
pub use loader::{LoadReport, TaxonomyLoader, FLUSH_INTERVAL};
pub use parser::{read_rows, TaxonomyRow};
pub use prepare::{prepare, PreparedData};
pub use refs::ReferenceRegistry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
