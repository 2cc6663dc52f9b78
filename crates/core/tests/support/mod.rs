//! Shared mocks and fixtures for the controller integration tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use gts_common::MockClock;
use gts_core::{
    CalendarView, EventCacheConfig, EventFetchController, EventsApi, JobWorkspace, KeyValueStore,
};
use gts_domain::{CalendarEvent, EventDetails, EventQuery, GtsError, Result, VisibleRange};
use tokio_util::sync::CancellationToken;

/// One scripted reply from the mock events endpoint.
pub struct ScriptedResponse {
    pub delay: Duration,
    pub result: Result<Vec<CalendarEvent>>,
}

/// Scripted in-memory `EventsApi`: replies are consumed in push order, and
/// an exhausted script answers with an empty batch.
#[derive(Default)]
pub struct MockEventsApi {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    calls: AtomicUsize,
    fingerprints: Mutex<Vec<String>>,
}

impl MockEventsApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_events(&self, events: Vec<CalendarEvent>) {
        self.push(Duration::ZERO, Ok(events));
    }

    pub fn push(&self, delay: Duration, result: Result<Vec<CalendarEvent>>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(ScriptedResponse { delay, result });
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fingerprints of every query received, in call order.
    pub fn seen_fingerprints(&self) -> Vec<String> {
        self.fingerprints.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventsApi for MockEventsApi {
    async fn fetch_events(
        &self,
        query: &EventQuery,
        cancel: CancellationToken,
    ) -> Result<Vec<CalendarEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fingerprints.lock().unwrap().push(query.fingerprint());

        let scripted = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ScriptedResponse { delay: Duration::ZERO, result: Ok(Vec::new()) });

        tokio::select! {
            _ = cancel.cancelled() => Err(GtsError::Cancelled),
            _ = tokio::time::sleep(scripted.delay) => scripted.result,
        }
    }
}

/// Calendar-widget stand-in that records every interaction.
#[derive(Default)]
pub struct RecordingView {
    pub show_loading_calls: AtomicUsize,
    pub hide_loading_calls: AtomicUsize,
    pub refetch_requests: AtomicUsize,
    pub no_calendars_notice: Mutex<Option<bool>>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refetch_count(&self) -> usize {
        self.refetch_requests.load(Ordering::SeqCst)
    }

    pub fn notice_visible(&self) -> Option<bool> {
        *self.no_calendars_notice.lock().unwrap()
    }
}

impl CalendarView for RecordingView {
    fn show_loading(&self) {
        self.show_loading_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn hide_loading(&self) {
        self.hide_loading_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn set_no_calendars_notice(&self, visible: bool) {
        *self.no_calendars_notice.lock().unwrap() = Some(visible);
    }

    fn request_refetch(&self) {
        self.refetch_requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Workspace stand-in recording open dispatches.
#[derive(Default)]
pub struct RecordingWorkspace {
    pub opened_jobs: Mutex<Vec<String>>,
    pub opened_reminders: Mutex<Vec<String>>,
}

impl RecordingWorkspace {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl JobWorkspace for RecordingWorkspace {
    fn open_job(&self, job_id: &str) {
        self.opened_jobs.lock().unwrap().push(job_id.to_string());
    }

    fn open_reminder(&self, reminder_id: &str) {
        self.opened_reminders.lock().unwrap().push(reminder_id.to_string());
    }
}

/// In-memory key-value store shared by the cache and preferences.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn seed(&self, key: &str, value: &str) {
        self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// Fully wired controller over the mocks, in UTC with the default cache
/// configuration.
pub fn controller(
    api: Arc<MockEventsApi>,
    store: Arc<MemoryStore>,
    view: Arc<RecordingView>,
    clock: MockClock,
) -> EventFetchController<MockClock> {
    EventFetchController::with_clock(
        api,
        store,
        view,
        chrono_tz::UTC,
        EventCacheConfig::default(),
        clock,
    )
}

/// Timed one-hour event on the given January 2025 day.
pub fn timed_event(id: &str, day: u32, hour: u32) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        title: format!("Job {id}"),
        start: Some(Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()),
        end: Some(Utc.with_ymd_and_hms(2025, 1, day, hour + 1, 0, 0).unwrap()),
        all_day: false,
        background_color: Some("#1565c0".to_string()),
        details: EventDetails::default(),
    }
}

/// All-day event with an exclusive end.
pub fn all_day_event(id: &str, start_day: u32, exclusive_end_day: u32) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        title: format!("Rental {id}"),
        start: Some(Utc.with_ymd_and_hms(2025, 1, start_day, 0, 0, 0).unwrap()),
        end: Some(Utc.with_ymd_and_hms(2025, 1, exclusive_end_day, 0, 0, 0).unwrap()),
        all_day: true,
        background_color: None,
        details: EventDetails::default(),
    }
}

/// The January 2025 visible window used throughout the tests.
pub fn january() -> VisibleRange {
    VisibleRange::new(
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap(),
    )
}

/// The February 2025 visible window.
pub fn february() -> VisibleRange {
    VisibleRange::new(
        Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap(),
    )
}
