//! Event query and cache fingerprint types
//!
//! A logical query is the visible date range plus the active filter set. Two
//! fetches with the same fingerprint are the same query as far as the event
//! cache is concerned.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::EVENTS_CACHE_PREFIX;

/// The calendar's visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl VisibleRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_day(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Compare two ranges by calendar date only. Used to decide whether a
    /// background revalidation result still belongs to the visible view.
    pub fn same_days(&self, other: &Self) -> bool {
        self.start_day() == other.start_day() && self.end_day() == other.end_day()
    }
}

/// A fully-specified event query: visible range plus filter set.
///
/// Calendar ids are sorted and deduplicated at construction so the
/// fingerprint does not depend on selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub range: VisibleRange,
    pub calendars: Vec<String>,
    pub status: String,
    pub search: String,
}

impl EventQuery {
    pub fn new(
        range: VisibleRange,
        calendars: impl IntoIterator<Item = String>,
        status: impl Into<String>,
        search: impl Into<String>,
    ) -> Self {
        let mut calendars: Vec<String> = calendars.into_iter().collect();
        calendars.sort();
        calendars.dedup();
        Self { range, calendars, status: status.into(), search: search.into() }
    }

    /// Normalized cache key for this query:
    /// `cal-events-cache:<startDate>:<endDate>:<calendarIdsCsv>:<status>:<search>`
    /// with both range bounds truncated to the calendar date.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}",
            EVENTS_CACHE_PREFIX,
            self.range.start_day(),
            self.range.end_day(),
            self.calendars.join(","),
            self.status,
            self.search,
        )
    }

    /// Query-string pairs for the events endpoint.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start", self.range.start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("end", self.range.end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("calendar", self.calendars.join(",")),
            ("status", self.status.clone()),
            ("search", self.search.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn range() -> VisibleRange {
        VisibleRange::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 6, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 31, 23, 0, 0).unwrap(),
        )
    }

    #[test]
    fn fingerprint_truncates_to_calendar_dates() {
        let query = EventQuery::new(range(), ["1".to_string(), "2".to_string()], "completed", "");
        assert_eq!(query.fingerprint(), "cal-events-cache:2025-01-01:2025-01-31:1,2:completed:");
    }

    #[test]
    fn fingerprint_is_order_independent_in_calendar_ids() {
        let a = EventQuery::new(range(), ["2".to_string(), "1".to_string()], "", "smith");
        let b = EventQuery::new(range(), ["1".to_string(), "2".to_string()], "", "smith");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_is_idempotent() {
        let query = EventQuery::new(range(), ["7".to_string()], "scheduled", "acme");
        assert_eq!(query.fingerprint(), query.fingerprint());
    }

    #[test]
    fn duplicate_calendar_ids_collapse() {
        let query = EventQuery::new(range(), ["3".to_string(), "3".to_string()], "", "");
        assert_eq!(query.calendars, vec!["3".to_string()]);
    }

    #[test]
    fn same_days_ignores_time_of_day() {
        let a = range();
        let b = VisibleRange::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap(),
        );
        assert!(a.same_days(&b));

        let c = VisibleRange::new(
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap(),
        );
        assert!(!a.same_days(&c));
    }

    #[test]
    fn query_params_carry_iso_instants() {
        let query = EventQuery::new(range(), ["1".to_string()], "", "");
        let params = query.query_params();
        assert_eq!(params[0], ("start", "2025-01-01T06:30:00Z".to_string()));
        assert_eq!(params[2], ("calendar", "1".to_string()));
    }
}
