//! Common types used across the platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive timestamp window used to filter the movement ledger.
///
/// A missing bound leaves that side of the window open; a window with both
/// bounds missing matches every movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Window closed on both sides
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Both bounds are inclusive
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }

    /// A window whose start lies after its end can never match anything
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = DateRange::between(at(8), at(17));
        assert!(range.contains(at(8)));
        assert!(range.contains(at(12)));
        assert!(range.contains(at(17)));
        assert!(!range.contains(at(7)));
        assert!(!range.contains(at(18)));
    }

    #[test]
    fn test_open_sides() {
        assert!(DateRange::default().contains(at(0)));
        assert!(DateRange::default().is_unbounded());

        let from_noon = DateRange::new(Some(at(12)), None);
        assert!(from_noon.contains(at(23)));
        assert!(!from_noon.contains(at(11)));

        let until_noon = DateRange::new(None, Some(at(12)));
        assert!(until_noon.contains(at(1)));
        assert!(!until_noon.contains(at(13)));
    }

    #[test]
    fn test_inverted_range() {
        assert!(DateRange::between(at(10), at(9)).is_inverted());
        assert!(!DateRange::between(at(9), at(9)).is_inverted());
        assert!(!DateRange::new(Some(at(10)), None).is_inverted());
    }
}
