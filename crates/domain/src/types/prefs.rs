//! Persisted calendar preference shapes
//!
//! Selection and filter state live in local storage independently of the
//! event cache so they survive reloads and are available before the first
//! fetch. Every shape parses defensively: a corrupt stored value falls back
//! to the default rather than erroring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter set persisted under `gts-calendar-filters`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SavedFilters {
    pub calendar: String,
    pub status: String,
    pub search: String,
}

/// Aggregate of everything the calendar restores at startup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalendarPreferences {
    pub selected_calendars: Vec<String>,
    pub default_calendar: Option<String>,
    pub filters: SavedFilters,
    pub current_date: Option<DateTime<Utc>>,
}

impl CalendarPreferences {
    /// Effective calendar selection: the stored multi-select when present,
    /// otherwise the single default calendar.
    pub fn effective_selection(&self) -> Vec<String> {
        if !self.selected_calendars.is_empty() {
            return self.selected_calendars.clone();
        }
        self.default_calendar.clone().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_filters_tolerate_missing_fields() {
        let filters: SavedFilters = serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        assert_eq!(filters.status, "completed");
        assert_eq!(filters.calendar, "");
        assert_eq!(filters.search, "");
    }

    #[test]
    fn effective_selection_falls_back_to_default_calendar() {
        let prefs = CalendarPreferences {
            default_calendar: Some("5".into()),
            ..Default::default()
        };
        assert_eq!(prefs.effective_selection(), vec!["5".to_string()]);

        let prefs = CalendarPreferences {
            selected_calendars: vec!["1".into(), "2".into()],
            default_calendar: Some("5".into()),
            ..Default::default()
        };
        assert_eq!(prefs.effective_selection(), vec!["1".to_string(), "2".to_string()]);
    }
}
