//! Domain type definitions

pub mod event;
pub mod prefs;
pub mod query;

pub use event::{
    CalendarEvent, CallReminderDetails, EventDetails, JobDetails, VirtualOccurrenceDetails,
};
pub use prefs::{CalendarPreferences, SavedFilters};
pub use query::{EventQuery, VisibleRange};
