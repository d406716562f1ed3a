// Reference registry - natural business key to record handle

use std::collections::HashMap;

use tracing::warn;

use crate::entities::RecordId;
use crate::error::{LoadError, LoadResult};

/// Scoped mapping from natural key (e.g. `segment-10`) to the handle of the
/// record created for it.
///
/// Populated in dependency order: a level registers its records so the next
/// level down can resolve its parents. Handles stay valid across session
/// flush/clear checkpoints, so the registry is never invalidated mid-load.
#[derive(Debug, Default)]
pub struct ReferenceRegistry {
    refs: HashMap<String, RecordId>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record handle under its natural key.
    ///
    /// Re-registering a key overwrites the previous handle; last write wins.
    /// That only happens when the source file carries the same code with
    /// two different names, so it is logged.
    pub fn register(&mut self, key: String, id: RecordId) {
        if let Some(previous) = self.refs.insert(key.clone(), id) {
            warn!(%key, previous, current = id, "natural key re-registered, keeping latest");
        }
    }

    /// Resolve a natural key to the handle registered for it.
    ///
    /// A miss means a child row names a parent never seen at a prior level,
    /// which is fatal for the whole load.
    pub fn resolve(&self, key: &str) -> LoadResult<RecordId> {
        self.refs
            .get(key)
            .copied()
            .ok_or_else(|| LoadError::DanglingReference {
                key: key.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
