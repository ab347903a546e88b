//! Shared row-major hit buffer written by sweeps.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sweepcast_world::RaycastHit;

/// Caller-owned result buffer, laid out `[query][hit slot]`.
///
/// Cell `query * max_hits + slot` holds the hit of that slot. Clones share the
/// same storage, so the caller keeps one while a sweep writes into another.
/// Contents are only meaningful once the sweep's job handle has completed.
#[derive(Debug, Clone, Default)]
pub struct HitMatrix {
    cells: Arc<RwLock<Vec<RaycastHit>>>,
}

impl HitMatrix {
    /// Buffer of `len` no-hit cells.
    pub fn new(len: usize) -> Self {
        Self::from_vec(vec![RaycastHit::none(); len])
    }

    /// Buffer sized exactly for `query_count` queries of `max_hits` slots.
    pub fn for_queries(query_count: usize, max_hits: usize) -> Self {
        Self::new(query_count.saturating_mul(max_hits))
    }

    /// Wrap an existing buffer.
    pub fn from_vec(cells: Vec<RaycastHit>) -> Self {
        Self {
            cells: Arc::new(RwLock::new(cells)),
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the buffer has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared read access to every cell.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<RaycastHit>> {
        self.cells.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vec<RaycastHit>> {
        self.cells.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of every cell.
    pub fn to_vec(&self) -> Vec<RaycastHit> {
        self.read().clone()
    }

    /// Copy of one query's hit slots. Empty if the row lies outside the buffer.
    pub fn row(&self, query: usize, max_hits: usize) -> Vec<RaycastHit> {
        let start = query.saturating_mul(max_hits);
        self.read()
            .get(start..start.saturating_add(max_hits))
            .map(<[RaycastHit]>::to_vec)
            .unwrap_or_default()
    }

    /// Number of hits recorded for one query.
    pub fn hit_count(&self, query: usize, max_hits: usize) -> usize {
        self.row(query, max_hits)
            .iter()
            .take_while(|hit| hit.has_hit())
            .count()
    }
}
