//! Calendar preference persistence
//!
//! Selection and filter state are stored under their own keys, separate
//! from the event cache, and restored before the first fetch so the initial
//! network call already carries the right filters. All reads are tolerant:
//! a corrupt value falls back to its default.

use chrono::{DateTime, Utc};
use gts_domain::constants::{
    CALENDAR_CURRENT_DATE_KEY, CALENDAR_FILTERS_KEY, DEFAULT_CALENDAR_KEY, SELECTED_CALENDARS_KEY,
};
use gts_domain::{CalendarPreferences, SavedFilters};
use tracing::debug;

use super::ports::KeyValueStore;

/// Restore all persisted calendar preferences.
pub fn load(store: &dyn KeyValueStore) -> CalendarPreferences {
    let selected_calendars = store
        .get(SELECTED_CALENDARS_KEY)
        .and_then(|raw| match serde_json::from_str(&raw) {
            Ok(ids) => Some(ids),
            Err(err) => {
                debug!(error = %err, "stored calendar selection unreadable; using default");
                None
            }
        })
        .unwrap_or_default();

    let default_calendar = store.get(DEFAULT_CALENDAR_KEY).filter(|id| !id.is_empty());

    let filters = store
        .get(CALENDAR_FILTERS_KEY)
        .and_then(|raw| serde_json::from_str::<SavedFilters>(&raw).ok())
        .unwrap_or_default();

    let current_date = store
        .get(CALENDAR_CURRENT_DATE_KEY)
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|t| t.with_timezone(&Utc));

    CalendarPreferences { selected_calendars, default_calendar, filters, current_date }
}

/// Persist the multi-select calendar selection. Write failures are logged
/// and swallowed; preferences are best-effort like the cache.
pub fn save_selected_calendars(store: &dyn KeyValueStore, ids: &[String]) {
    match serde_json::to_string(ids) {
        Ok(raw) => {
            if let Err(err) = store.put(SELECTED_CALENDARS_KEY, &raw) {
                debug!(error = %err, "calendar selection not persisted");
            }
        }
        Err(err) => debug!(error = %err, "calendar selection not serializable"),
    }
}

pub fn save_default_calendar(store: &dyn KeyValueStore, id: Option<&str>) {
    match id {
        Some(id) => {
            if let Err(err) = store.put(DEFAULT_CALENDAR_KEY, id) {
                debug!(error = %err, "default calendar not persisted");
            }
        }
        None => store.remove(DEFAULT_CALENDAR_KEY),
    }
}

pub fn save_filters(store: &dyn KeyValueStore, filters: &SavedFilters) {
    match serde_json::to_string(filters) {
        Ok(raw) => {
            if let Err(err) = store.put(CALENDAR_FILTERS_KEY, &raw) {
                debug!(error = %err, "calendar filters not persisted");
            }
        }
        Err(err) => debug!(error = %err, "calendar filters not serializable"),
    }
}

pub fn save_current_date(store: &dyn KeyValueStore, date: DateTime<Utc>) {
    if let Err(err) = store.put(CALENDAR_CURRENT_DATE_KEY, &date.to_rfc3339()) {
        debug!(error = %err, "calendar current date not persisted");
    }
}
