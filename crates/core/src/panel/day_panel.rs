//! Day panel rendering
//!
//! Produces the "events for day X" list from the controller's day index
//! (O(1) per day instead of rescanning the full event set) and dispatches
//! item activation to the job workspace. The panel owns no editing logic.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use gts_common::{Clock, SystemClock};
use gts_domain::{CalendarEvent, EventDetails};

use crate::events::controller::EventFetchController;
use crate::events::ports::JobWorkspace;

/// One rendered row of the day panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPanelItem {
    pub event_id: String,
    pub title: String,
    /// "All day" or the local start time.
    pub time_label: String,
    /// Wire discriminator of the underlying record.
    pub kind: &'static str,
    pub status: Option<String>,
    pub color: Option<String>,
}

/// The sidebar panel listing a single day's events.
pub struct DayPanel<C: Clock = SystemClock> {
    controller: EventFetchController<C>,
    workspace: Arc<dyn JobWorkspace>,
}

impl<C: Clock + 'static> DayPanel<C> {
    pub fn new(controller: EventFetchController<C>, workspace: Arc<dyn JobWorkspace>) -> Self {
        Self { controller, workspace }
    }

    /// Render rows for a day: all-day events first, then timed events by
    /// start.
    pub fn items_for(&self, day: NaiveDate) -> Vec<DayPanelItem> {
        let mut events = self.controller.events_for_day(day);
        events.sort_by(|a, b| b.all_day.cmp(&a.all_day).then_with(|| a.start.cmp(&b.start)));

        let tz = self.controller.timezone();
        events.iter().map(|event| render_item(event, tz)).collect()
    }

    /// Activate the item with `event_id` on `day`, routing to the right
    /// workspace surface for its record type. Returns false when the day no
    /// longer contains the event (e.g. a refetch raced the click).
    pub fn open(&self, day: NaiveDate, event_id: &str) -> bool {
        let events = self.controller.events_for_day(day);
        let Some(event) = events.iter().find(|event| event.id == event_id) else {
            return false;
        };
        self.open_event(event);
        true
    }

    fn open_event(&self, event: &CalendarEvent) {
        match &event.details {
            EventDetails::Job(_) => self.workspace.open_job(&event.id),
            // Virtual occurrences have no record of their own yet; route to
            // the series they belong to.
            EventDetails::VirtualJob(details) => {
                self.workspace.open_job(details.series_id.as_deref().unwrap_or(&event.id));
            }
            EventDetails::CallReminder(details) => match &details.job_id {
                Some(job_id) => self.workspace.open_job(job_id),
                None => self.workspace.open_reminder(&event.id),
            },
            EventDetails::StandaloneCallReminder(_) => self.workspace.open_reminder(&event.id),
            EventDetails::VirtualCallReminder(details) => {
                self.workspace.open_reminder(details.series_id.as_deref().unwrap_or(&event.id));
            }
        }
    }
}

fn render_item(event: &CalendarEvent, tz: Tz) -> DayPanelItem {
    let time_label = time_label(event, tz);
    DayPanelItem {
        event_id: event.id.clone(),
        title: event.title.clone(),
        time_label,
        kind: event.details.type_name(),
        status: event.details.status().map(str::to_string),
        color: event.background_color.clone(),
    }
}

fn time_label(event: &CalendarEvent, tz: Tz) -> String {
    if event.all_day {
        return "All day".to_string();
    }
    event
        .start
        .map(|start| start.with_timezone(&tz).format("%I:%M %p").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn event(all_day: bool) -> CalendarEvent {
        CalendarEvent {
            id: "e1".into(),
            title: "Gooseneck delivery".into(),
            start: Some(Utc.with_ymd_and_hms(2025, 6, 2, 19, 30, 0).unwrap()),
            end: None,
            all_day,
            background_color: None,
            details: EventDetails::default(),
        }
    }

    #[test]
    fn all_day_events_get_the_fixed_label() {
        assert_eq!(time_label(&event(true), chrono_tz::UTC), "All day");
    }

    #[test]
    fn timed_events_format_in_the_panel_timezone() {
        // 19:30 UTC is 14:30 in Chicago during DST
        assert_eq!(time_label(&event(false), chrono_tz::America::Chicago), "02:30 PM");
        assert_eq!(time_label(&event(false), chrono_tz::UTC), "07:30 PM");
    }

    #[test]
    fn unschedulable_event_gets_an_empty_label() {
        let mut e = event(false);
        e.start = None;
        assert_eq!(time_label(&e, chrono_tz::UTC), "");
    }
}
