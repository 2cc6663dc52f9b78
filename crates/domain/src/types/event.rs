//! Calendar event types
//!
//! Display-ready occurrences of jobs and call reminders as the calendar
//! widget consumes them. Field names are camelCase on the wire to match the
//! widget's event-object contract.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single occurrence of a job or reminder on the calendar.
///
/// `id` is stable across fetches for the same underlying record and unique
/// within a fetched batch. An event without a `start` cannot be placed on the
/// calendar and is skipped by the day index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Exclusive for all-day events per calendar-widget convention; absent
    /// for point events.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default, rename = "extendedProps")]
    pub details: EventDetails,
}

impl CalendarEvent {
    /// Whether the event can be placed on the calendar at all.
    pub fn is_schedulable(&self) -> bool {
        self.start.is_some()
    }
}

/// Typed replacement for the widget's free-form `extendedProps` bag.
///
/// The `type` discriminator selects the variant; each variant carries only
/// the fields relevant to it, so consumers match exhaustively instead of
/// probing optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventDetails {
    Job(JobDetails),
    CallReminder(CallReminderDetails),
    StandaloneCallReminder(CallReminderDetails),
    VirtualJob(VirtualOccurrenceDetails),
    VirtualCallReminder(VirtualOccurrenceDetails),
}

impl EventDetails {
    /// Wire name of the discriminator, for logging and panel display.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Job(_) => "job",
            Self::CallReminder(_) => "call_reminder",
            Self::StandaloneCallReminder(_) => "standalone_call_reminder",
            Self::VirtualJob(_) => "virtual_job",
            Self::VirtualCallReminder(_) => "virtual_call_reminder",
        }
    }

    /// Job/reminder status when the variant carries one.
    pub fn status(&self) -> Option<&str> {
        match self {
            Self::Job(d) => d.status.as_deref(),
            Self::CallReminder(d) | Self::StandaloneCallReminder(d) => d.status.as_deref(),
            Self::VirtualJob(d) | Self::VirtualCallReminder(d) => d.status.as_deref(),
        }
    }

    /// True for occurrences of a recurring series that have not been
    /// materialized into their own persisted record.
    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::VirtualJob(_) | Self::VirtualCallReminder(_))
    }
}

impl Default for EventDetails {
    fn default() -> Self {
        Self::Job(JobDetails::default())
    }
}

/// Business metadata attached to a persisted job occurrence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobDetails {
    pub status: Option<String>,
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub trailer: Option<String>,
    /// Recurrence linkage: id of the series this occurrence belongs to.
    pub series_id: Option<String>,
}

/// Metadata for call reminders, linked to a job or standalone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CallReminderDetails {
    /// Linked job, absent for standalone reminders.
    pub job_id: Option<String>,
    pub status: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
}

/// Metadata for not-yet-materialized occurrences of a recurring series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VirtualOccurrenceDetails {
    pub series_id: Option<String>,
    pub occurrence_date: Option<NaiveDate>,
    pub status: Option<String>,
}
