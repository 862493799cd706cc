use chrono::NaiveDate;

use crate::model::*;

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Existing allocations whose range overlaps `candidate`, in input order.
pub fn find_overlapping<'a, I>(candidate: &DateRange, allocations: I) -> Vec<&'a Allocation>
where
    I: IntoIterator<Item = &'a Allocation>,
{
    allocations
        .into_iter()
        .filter(|existing| candidate.overlaps(&existing.range()))
        .collect()
}

/// Sum of percentages over a set of allocations, saturating at `u32::MAX`.
pub fn total_percentage(allocations: &[&Allocation]) -> u32 {
    allocations
        .iter()
        .fold(0u32, |sum, a| sum.saturating_add(a.allocation_percentage))
}
