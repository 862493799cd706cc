use chrono::NaiveDate;
use thiserror::Error;

use crate::model::format_date;

fn capacity_verb(updating: &bool) -> &'static str {
    if *updating { "would be" } else { "is" }
}

fn end_label(end: &Option<NaiveDate>) -> String {
    end.map_or_else(|| "indefinite".to_string(), format_date)
}

fn allocation_suffix(updating: &bool, allocation_id: &str) -> String {
    if *updating {
        format!(" in allocation '{allocation_id}'")
    } else {
        String::new()
    }
}

/// Coarse classification of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    CapacityExceeded,
    DuplicateAssignment,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::CapacityExceeded => "capacity_exceeded",
            ErrorKind::DuplicateAssignment => "duplicate_assignment",
        }
    }
}

/// Why a create or update was turned down. `Display` is the message shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("Engineer with ID '{0}' not found.")]
    EngineerNotFound(String),

    #[error("Project with ID '{0}' not found.")]
    ProjectNotFound(String),

    #[error("Allocation with ID '{0}' not found.")]
    AllocationNotFound(String),

    /// The allocation exists but its engineer or project has gone missing.
    #[error("Associated engineer or project not found.")]
    DanglingReference { allocation_id: String },

    #[error("Allocation percentage must be between 1 and 100.")]
    PercentageOutOfRange(i64),

    #[error("Invalid start date format: '{0}'.")]
    InvalidStartDate(String),

    #[error("Invalid end date format: '{0}'.")]
    InvalidEndDate(String),

    #[error("End date must be after start date.")]
    EndNotAfterStart { start: NaiveDate, end: NaiveDate },

    #[error(
        "Engineer '{engineer}' {} over-allocated. Current allocation during this period: {current}%. Adding {requested}% would result in {total}% total allocation.",
        capacity_verb(.updating)
    )]
    CapacityExceeded {
        engineer: String,
        current: u32,
        requested: u32,
        total: u32,
        updating: bool,
    },

    #[error(
        "Engineer '{engineer}' is already allocated to project '{project}' from {start} to {}{}.",
        end_label(.end),
        allocation_suffix(.updating, .allocation_id)
    )]
    DuplicateAssignment {
        engineer: String,
        project: String,
        allocation_id: String,
        start: NaiveDate,
        end: Option<NaiveDate>,
        updating: bool,
    },
}

impl AllocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AllocationError::EngineerNotFound(_)
            | AllocationError::ProjectNotFound(_)
            | AllocationError::AllocationNotFound(_)
            | AllocationError::DanglingReference { .. } => ErrorKind::NotFound,
            AllocationError::PercentageOutOfRange(_)
            | AllocationError::InvalidStartDate(_)
            | AllocationError::InvalidEndDate(_)
            | AllocationError::EndNotAfterStart { .. } => ErrorKind::InvalidInput,
            AllocationError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            AllocationError::DuplicateAssignment { .. } => ErrorKind::DuplicateAssignment,
        }
    }
}
