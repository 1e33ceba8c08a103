use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use crate::models::{Deal, PaginationMeta};

/// One consistent `(deals, meta)` pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub deals: Vec<Deal>,
    pub meta: PaginationMeta,
}

/// Holds the currently loaded deals. `load` swaps in a whole new snapshot, so a
/// reader always sees a collection together with the meta it arrived with.
#[derive(Debug, Default)]
pub struct DealStore {
    current: RwLock<Arc<Snapshot>>,
}

impl DealStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, deals: Vec<Deal>, meta: PaginationMeta) {
        let snapshot = Arc::new(Snapshot {
            deals,
            meta: meta.normalized(),
        });
        info!(
            "Loaded {} deals (page {}/{})",
            snapshot.deals.len(),
            snapshot.meta.current_page,
            snapshot.meta.page_count
        );

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = snapshot;
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().deals.is_empty()
    }
}
