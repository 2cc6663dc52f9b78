//! Application constants
//!
//! Centralized location for all domain-level constants used by the calendar
//! client core.

// Event cache configuration
pub const EVENTS_CACHE_PREFIX: &str = "cal-events-cache";
pub const EVENTS_CACHE_FRESHNESS_MS: u64 = 300_000;
pub const EVENTS_CACHE_MAX_ENTRIES: usize = 5;

// Day index
pub const MAX_EVENT_SPAN_DAYS: usize = 60;

// Refresh scheduling
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

// One-shot override stash (pending revalidation results awaiting consumption)
pub const MAX_PENDING_OVERRIDES: usize = 4;

// Persisted preference keys
pub const SELECTED_CALENDARS_KEY: &str = "gts-selected-calendars";
pub const DEFAULT_CALENDAR_KEY: &str = "gts-default-calendar";
pub const CALENDAR_FILTERS_KEY: &str = "gts-calendar-filters";
pub const CALENDAR_CURRENT_DATE_KEY: &str = "gts-calendar-current-date";

// Mutating requests
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const GENERIC_MUTATION_ERROR: &str = "Something went wrong. Please try again.";
