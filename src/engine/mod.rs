mod error;
mod mutations;
mod overlap;
mod queries;
mod store;
mod validate;

pub use error::{AllocationError, ErrorKind};
pub use overlap::{find_overlapping, total_percentage};
pub use store::{EntityStore, Ledger, SharedLedger};
pub use validate::{validate_create, validate_update, AllocateRequest, Approved, UpdateRequest};

use chrono::NaiveDate;
use tracing::warn;

use crate::model::*;

/// Source of "today" for default start dates and the active-allocation listing.
pub type Clock = fn() -> NaiveDate;

/// Allocation engine: the entity store plus the rules for changing it.
///
/// Each engineer's allocations sit behind their own write lock. Creates and
/// updates hold that lock from validation through commit, so two writers for
/// one engineer can never both pass the capacity check on a stale view.
pub struct Engine {
    pub store: EntityStore,
    clock: Clock,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_clock(overlap::today)
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            store: EntityStore::new(),
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn add_engineer(&self, engineer: Engineer) -> bool {
        let id = engineer.id.clone();
        let added = self.store.insert_engineer(engineer);
        if !added {
            warn!("duplicate engineer id {id}, keeping the first");
        }
        added
    }

    pub fn add_project(&self, project: Project) -> bool {
        let id = project.id.clone();
        let added = self.store.insert_project(project);
        if !added {
            warn!("duplicate project id {id}, keeping the first");
        }
        added
    }

    /// Insert a stored allocation as-is, without validation. Used when loading
    /// data; returns false if the id is already taken.
    pub async fn load_allocation(&self, allocation: Allocation) -> bool {
        if !self
            .store
            .map_allocation(&allocation.id, &allocation.engineer_id)
        {
            warn!("duplicate allocation id {}, keeping the first", allocation.id);
            return false;
        }
        let ledger = self.store.ledger_or_create(&allocation.engineer_id);
        ledger.write().await.push(allocation);
        true
    }

    /// Lookup allocation → engineer, get that engineer's ledger.
    pub(super) fn ledger_for_allocation(&self, allocation_id: &str) -> Option<SharedLedger> {
        self.store
            .engineer_for_allocation(allocation_id)
            .and_then(|engineer_id| self.store.get_ledger(&engineer_id))
    }
}
