// Taxonomy load pipeline
//
// Parse -> prepare -> load each level in dependency order:
// Segment, then Family, then Classification, then Commodity. Parents are
// resolved through the reference registry; the session flushes and clears
// on a fixed cadence to bound memory. Any error aborts the whole load.

use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::db::{self, LoadEvent, SqliteSession};
use crate::entities::{Classification, Family, Segment};
use crate::error::LoadResult;
use crate::parser;
use crate::prepare::{self, PreparedData};
use crate::refs::ReferenceRegistry;

/// Records created between flush/clear checkpoints.
pub const FLUSH_INTERVAL: usize = 25;

/// Counts of what one load pass persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Raw CSV rows parsed.
    pub rows: usize,
    pub segments: usize,
    pub families: usize,
    pub classifications: usize,
    pub commodities: usize,
}

impl LoadReport {
    pub fn total_records(&self) -> usize {
        self.segments + self.families + self.classifications + self.commodities
    }
}

/// Bulk loader for the 4-level taxonomy.
pub struct TaxonomyLoader {
    /// Flush/clear cadence. Purely a memory knob: any value produces the
    /// same persisted dataset.
    batch_size: usize,
}

impl TaxonomyLoader {
    pub fn new() -> Self {
        TaxonomyLoader {
            batch_size: FLUSH_INTERVAL,
        }
    }

    pub fn with_batch_size(batch_size: usize) -> Self {
        TaxonomyLoader {
            batch_size: batch_size.max(1),
        }
    }

    /// Run the full pipeline against a CSV file.
    ///
    /// A nonexistent path loads an empty dataset and reports zero records.
    pub fn load(&self, csv_path: &Path, conn: &Connection) -> LoadResult<LoadReport> {
        let rows = parser::read_rows(csv_path)?;
        let data = prepare::prepare(&rows);
        self.load_prepared(&data, conn)
    }

    /// Load already-prepared record sets.
    ///
    /// Levels run strictly in order and each level is fully flushed before
    /// the next begins, so a failure never leaves a persisted child without
    /// its parent.
    pub fn load_prepared(&self, data: &PreparedData, conn: &Connection) -> LoadResult<LoadReport> {
        let mut session = SqliteSession::open(conn)?;
        let mut refs = ReferenceRegistry::new();

        let report = LoadReport {
            rows: data.commodities.len(),
            segments: self.load_segments(&mut session, &mut refs, data)?,
            families: self.load_families(&mut session, &mut refs, data)?,
            classifications: self.load_classifications(&mut session, &mut refs, data)?,
            commodities: self.load_commodities(&mut session, &refs, data)?,
        };

        for (entity, count) in [
            ("segment", report.segments),
            ("family", report.families),
            ("classification", report.classifications),
            ("commodity", report.commodities),
        ] {
            db::insert_load_event(
                conn,
                &LoadEvent::new("level_loaded", entity, json!({ "count": count })),
            )?;
        }
        db::insert_load_event(
            conn,
            &LoadEvent::new("load_completed", "taxonomy", serde_json::to_value(&report)?),
        )?;

        info!(
            segments = report.segments,
            families = report.families,
            classifications = report.classifications,
            commodities = report.commodities,
            "taxonomy load complete"
        );

        Ok(report)
    }

    fn load_segments(
        &self,
        session: &mut SqliteSession,
        refs: &mut ReferenceRegistry,
        data: &PreparedData,
    ) -> LoadResult<usize> {
        for (i, record) in data.segments.iter().enumerate() {
            let id = session.create_segment(record.code, &record.name);
            refs.register(Segment::ref_key(record.code), id);
            self.checkpoint(session, i + 1)?;
        }

        session.flush()?;
        info!(count = data.segments.len(), "loaded segments");
        Ok(data.segments.len())
    }

    fn load_families(
        &self,
        session: &mut SqliteSession,
        refs: &mut ReferenceRegistry,
        data: &PreparedData,
    ) -> LoadResult<usize> {
        for (i, record) in data.families.iter().enumerate() {
            let segment_id = refs.resolve(&Segment::ref_key(record.segment))?;

            let id = session.create_family(segment_id, record.code, &record.name);
            refs.register(Family::ref_key(record.code), id);
            self.checkpoint(session, i + 1)?;
        }

        session.flush()?;
        info!(count = data.families.len(), "loaded families");
        Ok(data.families.len())
    }

    fn load_classifications(
        &self,
        session: &mut SqliteSession,
        refs: &mut ReferenceRegistry,
        data: &PreparedData,
    ) -> LoadResult<usize> {
        for (i, record) in data.classifications.iter().enumerate() {
            let family_id = refs.resolve(&Family::ref_key(record.family))?;

            let id = session.create_classification(family_id, record.code, &record.name);
            refs.register(Classification::ref_key(record.code), id);
            self.checkpoint(session, i + 1)?;
        }

        session.flush()?;
        info!(count = data.classifications.len(), "loaded classifications");
        Ok(data.classifications.len())
    }

    fn load_commodities(
        &self,
        session: &mut SqliteSession,
        refs: &ReferenceRegistry,
        data: &PreparedData,
    ) -> LoadResult<usize> {
        for (i, row) in data.commodities.iter().enumerate() {
            let classification_id = refs.resolve(&Classification::ref_key(row.class))?;

            // Leaf level: nothing registers a commodity reference.
            session.create_commodity(classification_id, row.commodity, &row.commodity_name);
            self.checkpoint(session, i + 1)?;
        }

        session.flush()?;
        info!(count = data.commodities.len(), "loaded commodities");
        Ok(data.commodities.len())
    }

    fn checkpoint(&self, session: &mut SqliteSession, submitted: usize) -> LoadResult<()> {
        if submitted % self.batch_size == 0 {
            session.flush()?;
            session.clear();
        }
        Ok(())
    }
}

impl Default for TaxonomyLoader {
    fn default() -> Self {
        Self::new()
    }
}
