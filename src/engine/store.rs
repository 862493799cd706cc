use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

pub type SharedLedger = Arc<RwLock<Ledger>>;

/// One engineer's allocations, in the order they were added.
#[derive(Debug, Default)]
pub struct Ledger {
    pub allocations: Vec<Allocation>,
}

impl Ledger {
    pub fn get(&self, id: &str) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Allocation> {
        self.allocations.iter_mut().find(|a| a.id == id)
    }

    pub fn push(&mut self, allocation: Allocation) {
        self.allocations.push(allocation);
    }
}

pub struct EntityStore {
    engineers: DashMap<String, Engineer>,
    projects: DashMap<String, Project>,
    ledgers: DashMap<String, SharedLedger>,
    /// Reverse lookup: allocation id → engineer id
    allocation_to_engineer: DashMap<String, String>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            engineers: DashMap::new(),
            projects: DashMap::new(),
            ledgers: DashMap::new(),
            allocation_to_engineer: DashMap::new(),
        }
    }

    // ── Engineers ────────────────────────────────────────────

    /// Returns false if the id was already taken; the first record wins.
    pub fn insert_engineer(&self, engineer: Engineer) -> bool {
        match self.engineers.entry(engineer.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                self.ledgers.entry(engineer.id.clone()).or_default();
                slot.insert(engineer);
                true
            }
        }
    }

    pub fn get_engineer(&self, id: &str) -> Option<Engineer> {
        self.engineers.get(id).map(|e| e.value().clone())
    }

    pub fn engineer_count(&self) -> usize {
        self.engineers.len()
    }

    /// All engineers, ordered by id.
    pub fn engineers(&self) -> Vec<Engineer> {
        let mut out: Vec<Engineer> = self.engineers.iter().map(|e| e.value().clone()).collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    // ── Projects ─────────────────────────────────────────────

    pub fn insert_project(&self, project: Project) -> bool {
        match self.projects.entry(project.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(project);
                true
            }
        }
    }

    pub fn get_project(&self, id: &str) -> Option<Project> {
        self.projects.get(id).map(|e| e.value().clone())
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn projects(&self) -> Vec<Project> {
        let mut out: Vec<Project> = self.projects.iter().map(|e| e.value().clone()).collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    // ── Ledgers ──────────────────────────────────────────────

    pub fn get_ledger(&self, engineer_id: &str) -> Option<SharedLedger> {
        self.ledgers.get(engineer_id).map(|e| e.value().clone())
    }

    pub fn ledger_or_create(&self, engineer_id: &str) -> SharedLedger {
        self.ledgers
            .entry(engineer_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Snapshot of every ledger handle. Never hold DashMap refs across an await.
    pub fn ledgers(&self) -> Vec<SharedLedger> {
        self.ledgers.iter().map(|e| e.value().clone()).collect()
    }

    // ── Allocation index ─────────────────────────────────────

    pub fn engineer_for_allocation(&self, allocation_id: &str) -> Option<String> {
        self.allocation_to_engineer
            .get(allocation_id)
            .map(|e| e.value().clone())
    }

    pub fn allocation_count(&self) -> usize {
        self.allocation_to_engineer.len()
    }

    /// Claim an id for an allocation owned by `engineer_id`. Returns false if
    /// the id is already in use.
    pub fn map_allocation(&self, allocation_id: &str, engineer_id: &str) -> bool {
        match self.allocation_to_engineer.entry(allocation_id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(engineer_id.to_string());
                true
            }
        }
    }

    /// Generate and claim a fresh `alloc-xxxxxxxx` id.
    pub fn reserve_allocation_id(&self, engineer_id: &str) -> String {
        loop {
            let bits = Ulid::new().random() as u32;
            let id = format!(
                "{ALLOCATION_ID_PREFIX}{bits:0width$x}",
                width = ALLOCATION_ID_HEX_LEN
            );
            if self.map_allocation(&id, engineer_id) {
                return id;
            }
        }
    }
}
