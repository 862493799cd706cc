use chrono::NaiveDate;

use crate::model::*;

use super::Engine;

impl Engine {
    pub fn get_engineer_by_id(&self, id: &str) -> Option<Engineer> {
        self.store.get_engineer(id)
    }

    pub fn get_project_by_id(&self, id: &str) -> Option<Project> {
        self.store.get_project(id)
    }

    pub fn list_engineers(&self) -> Vec<Engineer> {
        self.store.engineers()
    }

    pub fn list_projects(&self) -> Vec<Project> {
        self.store.projects()
    }

    pub async fn get_allocation_by_id(&self, id: &str) -> Option<Allocation> {
        let ledger = self.ledger_for_allocation(id)?;
        let guard = ledger.read().await;
        guard.get(id).cloned()
    }

    /// Allocations active today.
    pub async fn list_allocations(&self) -> Vec<Allocation> {
        self.list_allocations_active_on(self.today()).await
    }

    pub async fn list_allocations_active_on(&self, on: NaiveDate) -> Vec<Allocation> {
        let mut out = self.all_allocations().await;
        out.retain(|a| a.is_active(on));
        out
    }

    /// Every allocation of one engineer, active or not, in insertion order.
    pub async fn allocations_for_engineer(&self, engineer_id: &str) -> Vec<Allocation> {
        match self.store.get_ledger(engineer_id) {
            Some(ledger) => ledger.read().await.allocations.clone(),
            None => Vec::new(),
        }
    }

    pub async fn allocations_for_project(&self, project_id: &str) -> Vec<Allocation> {
        let mut out = self.all_allocations().await;
        out.retain(|a| a.project_id == project_id);
        out
    }

    /// Every allocation across all ledgers, ordered by (start date, id).
    async fn all_allocations(&self) -> Vec<Allocation> {
        let mut out = Vec::with_capacity(self.store.allocation_count());
        for ledger in self.store.ledgers() {
            out.extend(ledger.read().await.allocations.iter().cloned());
        }
        out.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));
        out
    }
}
