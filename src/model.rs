use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::limits::{DATE_FORMAT, TIMESTAMP_FORMAT};

/// Calendar date range `[start, end)`. A missing end means the range never closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        debug_assert!(
            end.is_none_or(|e| start < e),
            "DateRange end must be after start"
        );
        Self { start, end }
    }

    pub fn indefinite(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    /// Strict overlap: ranges that only touch at an endpoint do not overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        match (self.end, other.end) {
            (Some(end), Some(other_end)) => self.start < other_end && other.start < end,
            (None, Some(other_end)) => self.start < other_end,
            (Some(end), None) => end > other.start,
            (None, None) => true,
        }
    }

    /// Inclusive on both ends, unlike `overlaps`.
    pub fn contains_date(&self, on: NaiveDate) -> bool {
        self.start <= on && self.end.is_none_or(|end| on <= end)
    }
}

/// An engineer. Anything beyond `id` and `name` is kept verbatim in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engineer {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Engineer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attributes: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attributes: Map::new(),
        }
    }
}

/// A share of one engineer's time committed to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub id: String,
    pub engineer_id: String,
    pub project_id: String,
    pub allocation_percentage: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl Allocation {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn is_active(&self, on: NaiveDate) -> bool {
        self.range().contains_date(on)
    }
}

/// Fields the validator settled on; the mutator writes exactly these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    pub range: DateRange,
    pub percentage: u32,
}

/// A committed change plus the message shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub allocation: Allocation,
    pub message: String,
}

/// Parse a calendar date, accepting `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
/// The time part, when present, is dropped.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map(|dt| dt.date()))
        .ok()
}

/// `None` for absent or whitespace-only input.
pub fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bounded(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, Some(end))
    }

    #[test]
    fn both_bounded_overlap() {
        let a = bounded(d(2025, 1, 1), d(2025, 3, 1));
        let b = bounded(d(2025, 2, 1), d(2025, 4, 1));
        let c = bounded(d(2025, 3, 1), d(2025, 5, 1));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // touching, not overlapping
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn candidate_indefinite_existing_bounded() {
        let open = DateRange::indefinite(d(2025, 3, 1));
        let before = bounded(d(2025, 1, 1), d(2025, 3, 1));
        let across = bounded(d(2025, 1, 1), d(2025, 3, 2));
        let after = bounded(d(2026, 1, 1), d(2026, 2, 1));
        assert!(!open.overlaps(&before));
        assert!(open.overlaps(&across));
        assert!(open.overlaps(&after));
    }

    #[test]
    fn candidate_bounded_existing_indefinite() {
        let open = DateRange::indefinite(d(2025, 3, 1));
        let ends_at_start = bounded(d(2025, 1, 1), d(2025, 3, 1));
        let ends_after_start = bounded(d(2025, 1, 1), d(2025, 3, 2));
        assert!(!ends_at_start.overlaps(&open));
        assert!(ends_after_start.overlaps(&open));
    }

    #[test]
    fn both_indefinite_always_overlap() {
        let a = DateRange::indefinite(d(2020, 1, 1));
        let b = DateRange::indefinite(d(2030, 1, 1));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn contains_date_inclusive() {
        let r = bounded(d(2025, 1, 1), d(2025, 1, 31));
        assert!(r.contains_date(d(2025, 1, 1)));
        assert!(r.contains_date(d(2025, 1, 31)));
        assert!(!r.contains_date(d(2025, 2, 1)));
        assert!(!r.contains_date(d(2024, 12, 31)));
        assert!(DateRange::indefinite(d(2025, 1, 1)).contains_date(d(2099, 1, 1)));
    }

    #[test]
    fn parse_date_shapes() {
        assert_eq!(parse_date("2024-05-06"), Some(d(2024, 5, 6)));
        assert_eq!(parse_date("2024-05-06T13:45:00"), Some(d(2024, 5, 6)));
        assert_eq!(parse_date("2024-13-40"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("06/05/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn non_blank_filters_whitespace() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("")), None);
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(Some("2024-01-01")), Some("2024-01-01"));
    }

    #[test]
    fn allocation_wire_shape() {
        let alloc = Allocation {
            id: "alloc-0badcafe".into(),
            engineer_id: "e1".into(),
            project_id: "p1".into(),
            allocation_percentage: 40,
            start_date: d(2025, 1, 1),
            end_date: None,
        };
        let json = serde_json::to_value(&alloc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "alloc-0badcafe",
                "engineerId": "e1",
                "projectId": "p1",
                "allocationPercentage": 40,
                "startDate": "2025-01-01",
                "endDate": null,
            })
        );
    }

    #[test]
    fn engineer_keeps_extra_attributes() {
        let json = serde_json::json!({
            "id": "e1",
            "name": "Ada",
            "role": "staff",
            "skills": ["rust", "sql"],
        });
        let eng: Engineer = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(eng.id, "e1");
        assert_eq!(eng.attributes.get("role"), Some(&Value::from("staff")));
        assert_eq!(serde_json::to_value(&eng).unwrap(), json);
    }

    #[test]
    fn allocation_active_window() {
        let alloc = Allocation {
            id: "alloc-00000001".into(),
            engineer_id: "e1".into(),
            project_id: "p1".into(),
            allocation_percentage: 10,
            start_date: d(2025, 1, 1),
            end_date: Some(d(2025, 6, 30)),
        };
        assert!(alloc.is_active(d(2025, 6, 30)));
        assert!(!alloc.is_active(d(2025, 7, 1)));
    }
}
