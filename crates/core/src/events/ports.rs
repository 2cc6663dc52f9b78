//! Port interfaces for the calendar core
//!
//! These traits define the boundaries between the calendar logic and its
//! collaborators. The widget chrome, network transport, and storage backend
//! all live on the far side of one of these seams; the controller is
//! composed from them explicitly at construction instead of being assembled
//! at runtime.

use async_trait::async_trait;
use gts_domain::{CalendarEvent, EventQuery, Result};
use tokio_util::sync::CancellationToken;

/// Transport for the calendar events endpoint.
///
/// Implementations classify outcomes per the degradation contract: a non-2xx
/// response is an error, a well-formed-but-empty or non-JSON body is zero
/// events, and an aborted request is [`GtsError::Cancelled`]
/// (never applied to the UI).
///
/// [`GtsError::Cancelled`]: gts_domain::GtsError::Cancelled
#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn fetch_events(
        &self,
        query: &EventQuery,
        cancel: CancellationToken,
    ) -> Result<Vec<CalendarEvent>>;
}

/// Namespaced persistent key-value storage for client-side state.
///
/// Reads never error: unreadable state is `None`. Writes may fail (quota,
/// I/O) and callers that use storage as a pure optimization swallow the
/// failure.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str);
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
}

/// The calendar widget surface the controller drives.
///
/// `request_refetch` asks the widget to re-invoke
/// [`EventFetchController::fetch_events`] for its current window; the
/// widget owns the visible range, not the controller.
///
/// [`EventFetchController::fetch_events`]: crate::events::controller::EventFetchController::fetch_events
pub trait CalendarView: Send + Sync {
    fn show_loading(&self);
    fn hide_loading(&self);
    fn set_no_calendars_notice(&self, visible: bool);
    fn request_refetch(&self);
}

/// Job/reminder editing workspace. The day panel dispatches opens here and
/// owns no editing logic itself.
pub trait JobWorkspace: Send + Sync {
    fn open_job(&self, job_id: &str);
    fn open_reminder(&self, reminder_id: &str);
}

/// User-facing notification surface.
pub trait Toasts: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Supplies the CSRF token attached to mutating requests.
pub trait CsrfTokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Cache-invalidation contract for mutation paths: any successful job or
/// reminder mutation must call this so the next fetch bypasses stale data.
pub trait CalendarRefresh: Send + Sync {
    fn refresh_calendar(&self);
}
