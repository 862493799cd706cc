use std::sync::Arc;

use tracing::{debug, info};

use crate::model::*;
use crate::observability;

use super::store::{EntityStore, Ledger};
use super::validate::{validate_create, validate_update, AllocateRequest, UpdateRequest};
use super::{AllocationError, Engine};

impl Engine {
    pub async fn allocate_engineer(
        &self,
        req: AllocateRequest<'_>,
    ) -> Result<Committed, AllocationError> {
        let engineer = self.store.get_engineer(req.engineer_id);
        let project = self.store.get_project(req.project_id);

        // Unknown engineers get a detached empty ledger; validation rejects
        // them before anything is written.
        let ledger = match engineer {
            Some(ref e) => self.store.ledger_or_create(&e.id),
            None => Arc::default(),
        };
        let mut guard = ledger.write().await;

        let approved = validate_create(
            &req,
            engineer.as_ref(),
            project.as_ref(),
            &guard.allocations,
            self.today(),
        )
        .inspect_err(|e| observe_rejection("allocate_engineer", e))?;

        let allocation = commit_create(
            &self.store,
            &mut guard,
            req.engineer_id,
            req.project_id,
            approved.accepted,
        );
        let message = created_message(
            &approved.engineer.name,
            &approved.project.name,
            &approved.accepted,
        );

        metrics::counter!(observability::ALLOCATIONS_COMMITTED_TOTAL, "op" => "create")
            .increment(1);
        info!(
            "created {} for {} on {}",
            allocation.id, allocation.engineer_id, allocation.project_id
        );
        Ok(Committed { allocation, message })
    }

    pub async fn update_allocation(
        &self,
        allocation_id: &str,
        req: UpdateRequest<'_>,
    ) -> Result<Committed, AllocationError> {
        let ledger = self.ledger_for_allocation(allocation_id).unwrap_or_default();
        let mut guard = ledger.write().await;

        let current = guard.get(allocation_id).cloned();
        let engineer = current
            .as_ref()
            .and_then(|a| self.store.get_engineer(&a.engineer_id));
        let project = current
            .as_ref()
            .and_then(|a| self.store.get_project(&a.project_id));

        let approved = validate_update(
            allocation_id,
            current.as_ref(),
            engineer.as_ref(),
            project.as_ref(),
            &req,
            &guard.allocations,
        )
        .inspect_err(|e| observe_rejection("update_allocation", e))?;

        let slot = guard
            .get_mut(allocation_id)
            .ok_or_else(|| AllocationError::AllocationNotFound(allocation_id.to_string()))?;
        let allocation = commit_update(slot, approved.accepted);
        let message = updated_message(
            &approved.engineer.name,
            &approved.project.name,
            &approved.accepted,
        );

        metrics::counter!(observability::ALLOCATIONS_COMMITTED_TOTAL, "op" => "update")
            .increment(1);
        info!("updated {}", allocation.id);
        Ok(Committed { allocation, message })
    }
}

/// Append a new allocation to the ledger under a freshly generated id.
/// Performs no validation.
pub(super) fn commit_create(
    store: &EntityStore,
    ledger: &mut Ledger,
    engineer_id: &str,
    project_id: &str,
    accepted: Accepted,
) -> Allocation {
    let allocation = Allocation {
        id: store.reserve_allocation_id(engineer_id),
        engineer_id: engineer_id.to_string(),
        project_id: project_id.to_string(),
        allocation_percentage: accepted.percentage,
        start_date: accepted.range.start,
        end_date: accepted.range.end,
    };
    ledger.push(allocation.clone());
    allocation
}

/// Overwrite percentage and dates in place. Performs no validation.
pub(super) fn commit_update(existing: &mut Allocation, accepted: Accepted) -> Allocation {
    existing.allocation_percentage = accepted.percentage;
    existing.start_date = accepted.range.start;
    existing.end_date = accepted.range.end;
    existing.clone()
}

fn observe_rejection(op: &'static str, err: &AllocationError) {
    metrics::counter!(
        observability::REJECTIONS_TOTAL,
        "op" => op,
        "kind" => err.kind().label()
    )
    .increment(1);
    debug!("{op} rejected: {err}");
}

fn range_phrase(range: &DateRange) -> String {
    match range.end {
        Some(end) => format!("from {} to {}", format_date(range.start), format_date(end)),
        None => format!("starting from {} (indefinite)", format_date(range.start)),
    }
}

fn created_message(engineer: &str, project: &str, accepted: &Accepted) -> String {
    format!(
        "Successfully allocated {}% of {engineer} to {project} {}.",
        accepted.percentage,
        range_phrase(&accepted.range)
    )
}

fn updated_message(engineer: &str, project: &str, accepted: &Accepted) -> String {
    format!(
        "Successfully updated allocation. {engineer} is now {}% allocated to {project} {}.",
        accepted.percentage,
        range_phrase(&accepted.range)
    )
}
