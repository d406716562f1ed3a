use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::{Classification, Commodity, Family, RecordId, Segment};
use crate::error::LoadResult;

pub fn setup_database(conn: &Connection) -> LoadResult<()> {
    // WAL mode for crash recovery during bulk writes
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Taxonomy tables, one per level
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS segments (
            id INTEGER PRIMARY KEY,
            code INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS families (
            id INTEGER PRIMARY KEY,
            segment_id INTEGER NOT NULL REFERENCES segments(id),
            code INTEGER NOT NULL,
            name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS classifications (
            id INTEGER PRIMARY KEY,
            family_id INTEGER NOT NULL REFERENCES families(id),
            code INTEGER NOT NULL,
            name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS commodities (
            id INTEGER PRIMARY KEY,
            classification_id INTEGER NOT NULL REFERENCES classifications(id),
            code INTEGER NOT NULL,
            name TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Load audit trail
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS load_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes on the natural code columns
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_families_code ON families(code)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_classifications_code ON classifications(code)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_commodities_code ON commodities(code)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// WRITE SESSION
// ============================================================================

/// Per-level buffer: pending rows awaiting flush, plus the identity cache of
/// rows already flushed in this session.
struct LevelBuffer<T> {
    next_id: RecordId,
    pending: Vec<T>,
    cached: HashMap<RecordId, T>,
}

impl<T> LevelBuffer<T> {
    fn open(conn: &Connection, table: &str) -> LoadResult<Self> {
        let next_id: RecordId = conn.query_row(
            &format!("SELECT COALESCE(MAX(id), 0) + 1 FROM {}", table),
            [],
            |row| row.get(0),
        )?;

        Ok(LevelBuffer {
            next_id,
            pending: Vec::new(),
            cached: HashMap::new(),
        })
    }

    fn alloc(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Batched write session over the four taxonomy tables.
///
/// `create_*` allocates the record handle immediately and buffers the row;
/// `flush` writes everything buffered in one transaction and moves it into
/// the identity cache; `clear` evicts that cache. Handles returned by
/// `create_*` stay valid across any flush/clear sequence, which is what
/// keeps the flush cadence a pure memory knob.
pub struct SqliteSession<'c> {
    conn: &'c Connection,
    segments: LevelBuffer<Segment>,
    families: LevelBuffer<Family>,
    classifications: LevelBuffer<Classification>,
    commodities: LevelBuffer<Commodity>,
}

impl<'c> SqliteSession<'c> {
    /// Open a session, seeding id counters past any rows already in the
    /// database.
    pub fn open(conn: &'c Connection) -> LoadResult<Self> {
        Ok(SqliteSession {
            segments: LevelBuffer::open(conn, "segments")?,
            families: LevelBuffer::open(conn, "families")?,
            classifications: LevelBuffer::open(conn, "classifications")?,
            commodities: LevelBuffer::open(conn, "commodities")?,
            conn,
        })
    }

    pub fn create_segment(&mut self, code: i64, name: &str) -> RecordId {
        let id = self.segments.alloc();
        self.segments.pending.push(Segment {
            id,
            code,
            name: name.to_string(),
        });
        id
    }

    pub fn create_family(&mut self, segment_id: RecordId, code: i64, name: &str) -> RecordId {
        let id = self.families.alloc();
        self.families.pending.push(Family {
            id,
            segment_id,
            code,
            name: name.to_string(),
        });
        id
    }

    pub fn create_classification(
        &mut self,
        family_id: RecordId,
        code: i64,
        name: &str,
    ) -> RecordId {
        let id = self.classifications.alloc();
        self.classifications.pending.push(Classification {
            id,
            family_id,
            code,
            name: name.to_string(),
        });
        id
    }

    pub fn create_commodity(
        &mut self,
        classification_id: RecordId,
        code: i64,
        name: &str,
    ) -> RecordId {
        let id = self.commodities.alloc();
        self.commodities.pending.push(Commodity {
            id,
            classification_id,
            code,
            name: name.to_string(),
        });
        id
    }

    /// Write all buffered rows durably, one transaction per flush.
    ///
    /// Rows go out in level order so a buffered child never lands before
    /// its buffered parent. Flushed rows move into the identity cache.
    pub fn flush(&mut self) -> LoadResult<usize> {
        let pending = self.pending_len();
        if pending == 0 {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;

        for segment in &self.segments.pending {
            tx.execute(
                "INSERT INTO segments (id, code, name) VALUES (?1, ?2, ?3)",
                params![segment.id, segment.code, segment.name],
            )?;
        }

        for family in &self.families.pending {
            tx.execute(
                "INSERT INTO families (id, segment_id, code, name) VALUES (?1, ?2, ?3, ?4)",
                params![family.id, family.segment_id, family.code, family.name],
            )?;
        }

        for classification in &self.classifications.pending {
            tx.execute(
                "INSERT INTO classifications (id, family_id, code, name) VALUES (?1, ?2, ?3, ?4)",
                params![
                    classification.id,
                    classification.family_id,
                    classification.code,
                    classification.name
                ],
            )?;
        }

        for commodity in &self.commodities.pending {
            tx.execute(
                "INSERT INTO commodities (id, classification_id, code, name) VALUES (?1, ?2, ?3, ?4)",
                params![
                    commodity.id,
                    commodity.classification_id,
                    commodity.code,
                    commodity.name
                ],
            )?;
        }

        tx.commit()?;

        for segment in self.segments.pending.drain(..) {
            self.segments.cached.insert(segment.id, segment);
        }
        for family in self.families.pending.drain(..) {
            self.families.cached.insert(family.id, family);
        }
        for classification in self.classifications.pending.drain(..) {
            self.classifications.cached.insert(classification.id, classification);
        }
        for commodity in self.commodities.pending.drain(..) {
            self.commodities.cached.insert(commodity.id, commodity);
        }

        debug!(rows = pending, "flushed pending records");
        Ok(pending)
    }

    /// Evict the identity cache. Bounds memory during bulk loads; already
    /// flushed rows stay durable and their handles stay valid.
    pub fn clear(&mut self) {
        let evicted = self.cached_len();
        self.segments.cached.clear();
        self.families.cached.clear();
        self.classifications.cached.clear();
        self.commodities.cached.clear();
        debug!(evicted, "cleared identity cache");
    }

    /// Number of rows buffered and not yet written.
    pub fn pending_len(&self) -> usize {
        self.segments.pending.len()
            + self.families.pending.len()
            + self.classifications.pending.len()
            + self.commodities.pending.len()
    }

    /// Number of flushed rows held in the identity cache.
    pub fn cached_len(&self) -> usize {
        self.segments.cached.len()
            + self.families.cached.len()
            + self.classifications.cached.len()
            + self.commodities.cached.len()
    }

    pub fn cached_segment(&self, id: RecordId) -> Option<&Segment> {
        self.segments.cached.get(&id)
    }

    pub fn cached_family(&self, id: RecordId) -> Option<&Family> {
        self.families.cached.get(&id)
    }
}

// ============================================================================
// QUERIES
// ============================================================================

/// Per-level record counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyStats {
    pub segments: i64,
    pub families: i64,
    pub classifications: i64,
    pub commodities: i64,
}

impl TaxonomyStats {
    pub fn total(&self) -> i64 {
        self.segments + self.families + self.classifications + self.commodities
    }
}

pub fn taxonomy_stats(conn: &Connection) -> LoadResult<TaxonomyStats> {
    let count = |table: &str| -> LoadResult<i64> {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?)
    };

    Ok(TaxonomyStats {
        segments: count("segments")?,
        families: count("families")?,
        classifications: count("classifications")?,
        commodities: count("commodities")?,
    })
}

pub fn segment_by_code(conn: &Connection, code: i64) -> LoadResult<Option<Segment>> {
    let mut stmt = conn.prepare("SELECT id, code, name FROM segments WHERE code = ?1")?;

    let mut rows = stmt.query_map(params![code], |row| {
        Ok(Segment {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
        })
    })?;

    rows.next().transpose().map_err(Into::into)
}

/// Families owned by the segment with the given code, in insertion order.
pub fn families_of_segment(conn: &Connection, segment_code: i64) -> LoadResult<Vec<Family>> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.segment_id, f.code, f.name
         FROM families f
         JOIN segments s ON s.id = f.segment_id
         WHERE s.code = ?1
         ORDER BY f.id",
    )?;

    let families = stmt
        .query_map(params![segment_code], |row| {
            Ok(Family {
                id: row.get(0)?,
                segment_id: row.get(1)?,
                code: row.get(2)?,
                name: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(families)
}

/// Classifications owned by the family with the given code, in insertion order.
pub fn classifications_of_family(conn: &Connection, family_code: i64) -> LoadResult<Vec<Classification>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.family_id, c.code, c.name
         FROM classifications c
         JOIN families f ON f.id = c.family_id
         WHERE f.code = ?1
         ORDER BY c.id",
    )?;

    let classifications = stmt
        .query_map(params![family_code], |row| {
            Ok(Classification {
                id: row.get(0)?,
                family_id: row.get(1)?,
                code: row.get(2)?,
                name: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(classifications)
}

/// Commodities owned by the classification with the given code, in insertion order.
pub fn commodities_of_classification(
    conn: &Connection,
    classification_code: i64,
) -> LoadResult<Vec<Commodity>> {
    let mut stmt = conn.prepare(
        "SELECT co.id, co.classification_id, co.code, co.name
         FROM commodities co
         JOIN classifications c ON c.id = co.classification_id
         WHERE c.code = ?1
         ORDER BY co.id",
    )?;

    let commodities = stmt
        .query_map(params![classification_code], |row| {
            Ok(Commodity {
                id: row.get(0)?,
                classification_id: row.get(1)?,
                code: row.get(2)?,
                name: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(commodities)
}

// ============================================================================
// LOAD AUDIT TRAIL
// ============================================================================

/// One audit event emitted during a bulk load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub data: serde_json::Value,
}

impl LoadEvent {
    pub fn new(event_type: &str, entity_type: &str, data: serde_json::Value) -> Self {
        LoadEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            data,
        }
    }
}

pub fn insert_load_event(conn: &Connection, event: &LoadEvent) -> LoadResult<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO load_events (event_id, timestamp, event_type, entity_type, data)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            data_json,
        ],
    )?;

    Ok(())
}

/// Most recent load events, newest first.
pub fn get_load_events(conn: &Connection, limit: usize) -> LoadResult<Vec<LoadEvent>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, data
         FROM load_events
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let events = stmt
        .query_map(params![limit as i64], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(4)?;

            Ok(LoadEvent {
                event_id: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                data: serde_json::from_str(&data_json)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}
