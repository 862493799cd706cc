//! Allocation validation.
//!
//! Checks run in a fixed order and the first failure is returned, so a given
//! bad input always produces the same message. Capacity is checked before the
//! duplicate-project rule.

use chrono::NaiveDate;

use crate::limits::*;
use crate::model::*;

use super::overlap::{find_overlapping, total_percentage};
use super::AllocationError;

/// Raw fields for a new allocation, as received from a caller.
#[derive(Debug, Clone, Copy)]
pub struct AllocateRequest<'a> {
    pub engineer_id: &'a str,
    pub project_id: &'a str,
    pub percentage: i64,
    /// Blank or absent means today.
    pub start_date: Option<&'a str>,
    /// Blank or absent means indefinite.
    pub end_date: Option<&'a str>,
}

/// Raw fields for changing an allocation. Anything absent keeps its stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateRequest<'a> {
    pub percentage: Option<i64>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
}

/// A change that passed validation, with the records its messages refer to.
#[derive(Debug, Clone, Copy)]
pub struct Approved<'a> {
    pub engineer: &'a Engineer,
    pub project: &'a Project,
    pub accepted: Accepted,
}

pub fn validate_create<'a>(
    req: &AllocateRequest<'_>,
    engineer: Option<&'a Engineer>,
    project: Option<&'a Project>,
    existing: &[Allocation],
    today: NaiveDate,
) -> Result<Approved<'a>, AllocationError> {
    let engineer =
        engineer.ok_or_else(|| AllocationError::EngineerNotFound(req.engineer_id.to_string()))?;
    let project =
        project.ok_or_else(|| AllocationError::ProjectNotFound(req.project_id.to_string()))?;

    let percentage = check_percentage(req.percentage)?;

    let start = match non_blank(req.start_date) {
        Some(text) => parse_start(text)?,
        None => today,
    };
    let end = match non_blank(req.end_date) {
        Some(text) => Some(parse_end(text)?),
        None => None,
    };
    let range = check_order(start, end)?;

    check_conflicts(&range, percentage, existing, engineer, project, false)?;

    Ok(Approved {
        engineer,
        project,
        accepted: Accepted { range, percentage },
    })
}

/// `current` is the stored allocation (if any) and `existing` the engineer's
/// full ledger; the allocation itself is skipped when looking for overlaps.
pub fn validate_update<'a>(
    allocation_id: &str,
    current: Option<&Allocation>,
    engineer: Option<&'a Engineer>,
    project: Option<&'a Project>,
    req: &UpdateRequest<'_>,
    existing: &[Allocation],
) -> Result<Approved<'a>, AllocationError> {
    let current =
        current.ok_or_else(|| AllocationError::AllocationNotFound(allocation_id.to_string()))?;
    let (Some(engineer), Some(project)) = (engineer, project) else {
        return Err(AllocationError::DanglingReference {
            allocation_id: current.id.clone(),
        });
    };

    // A stored record that bypassed validation still has to respect the bounds.
    let percentage =
        check_percentage(req.percentage.unwrap_or(i64::from(current.allocation_percentage)))?;

    let start = match non_blank(req.start_date) {
        Some(text) => parse_start(text)?,
        None => current.start_date,
    };
    let end = match non_blank(req.end_date) {
        Some(text) => Some(parse_end(text)?),
        None => current.end_date,
    };
    let range = check_order(start, end)?;

    let others = existing.iter().filter(|a| a.id != current.id);
    check_conflicts(&range, percentage, others, engineer, project, true)?;

    Ok(Approved {
        engineer,
        project,
        accepted: Accepted { range, percentage },
    })
}

fn check_percentage(percentage: i64) -> Result<u32, AllocationError> {
    if !(MIN_PERCENTAGE..=MAX_PERCENTAGE).contains(&percentage) {
        return Err(AllocationError::PercentageOutOfRange(percentage));
    }
    Ok(percentage as u32)
}

fn parse_start(text: &str) -> Result<NaiveDate, AllocationError> {
    parse_date(text).ok_or_else(|| AllocationError::InvalidStartDate(text.to_string()))
}

fn parse_end(text: &str) -> Result<NaiveDate, AllocationError> {
    parse_date(text).ok_or_else(|| AllocationError::InvalidEndDate(text.to_string()))
}

fn check_order(start: NaiveDate, end: Option<NaiveDate>) -> Result<DateRange, AllocationError> {
    match end {
        Some(end) if end <= start => Err(AllocationError::EndNotAfterStart { start, end }),
        _ => Ok(DateRange::new(start, end)),
    }
}

fn check_conflicts<'a, I>(
    range: &DateRange,
    percentage: u32,
    existing: I,
    engineer: &Engineer,
    project: &Project,
    updating: bool,
) -> Result<(), AllocationError>
where
    I: IntoIterator<Item = &'a Allocation>,
{
    let overlapping = find_overlapping(range, existing);
    if overlapping.is_empty() {
        return Ok(());
    }

    let current = total_percentage(&overlapping);
    let total = current.saturating_add(percentage);
    if total > MAX_CAPACITY {
        return Err(AllocationError::CapacityExceeded {
            engineer: engineer.name.clone(),
            current,
            requested: percentage,
            total,
            updating,
        });
    }

    if let Some(dup) = overlapping.iter().find(|a| a.project_id == project.id) {
        return Err(AllocationError::DuplicateAssignment {
            engineer: engineer.name.clone(),
            project: project.name.clone(),
            allocation_id: dup.id.clone(),
            start: dup.start_date,
            end: dup.end_date,
            updating,
        });
    }

    Ok(())
}
