//! Per-day event index
//!
//! Maps local calendar dates to the events overlapping them so the day panel
//! can answer "what's on day X" with a single map lookup instead of
//! rescanning the full event set. Rebuilt wholesale on every event-set
//! change; rebuild cost is linear in the visible range's event count, so
//! incremental patching is not worth its complexity.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use gts_domain::constants::MAX_EVENT_SPAN_DAYS;
use gts_domain::CalendarEvent;
use tracing::trace;

/// Index from local calendar date to the events overlapping that day.
#[derive(Debug, Default)]
pub struct DayIndex {
    buckets: HashMap<NaiveDate, Vec<Arc<CalendarEvent>>>,
}

impl DayIndex {
    /// Build the index for an event set in the given timezone.
    ///
    /// Each event is inserted into every local day of its inclusive span.
    /// All-day events carry an exclusive end which is made inclusive by
    /// pulling it back one millisecond; timed events without an end are
    /// points. Events without a start are skipped. Spans are capped at
    /// [`MAX_EVENT_SPAN_DAYS`] days as a runaway guard.
    pub fn build(events: &[CalendarEvent], tz: Tz) -> Self {
        let mut buckets: HashMap<NaiveDate, Vec<Arc<CalendarEvent>>> = HashMap::new();

        for event in events {
            let Some((start_day, end_day)) = event_day_span(event, tz) else {
                continue;
            };

            let shared = Arc::new(event.clone());
            for (offset, day) in start_day.iter_days().enumerate() {
                if day > end_day {
                    break;
                }
                if offset >= MAX_EVENT_SPAN_DAYS {
                    trace!(event_id = %event.id, "event span capped at {MAX_EVENT_SPAN_DAYS} days");
                    break;
                }
                buckets.entry(day).or_default().push(Arc::clone(&shared));
            }
        }

        Self { buckets }
    }

    /// Events overlapping `day`. Empty slice when none.
    pub fn lookup(&self, day: NaiveDate) -> &[Arc<CalendarEvent>] {
        self.buckets.get(&day).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct days carrying at least one event.
    pub fn day_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Inclusive local day span of an event, or `None` when it has no start.
///
/// Shared with the day panel's linear-scan fallback so both paths agree on
/// span semantics.
pub fn event_day_span(event: &CalendarEvent, tz: Tz) -> Option<(NaiveDate, NaiveDate)> {
    let start = event.start?;
    let start_day = start.with_timezone(&tz).date_naive();

    let end_day = match event.end {
        Some(end) if event.all_day => {
            // Exclusive end: midnight of the day *after* the last covered day
            (end - Duration::milliseconds(1)).with_timezone(&tz).date_naive()
        }
        Some(end) => end.with_timezone(&tz).date_naive(),
        None => start_day,
    };

    Some((start_day, end_day.max(start_day)))
}
