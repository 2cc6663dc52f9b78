//! Refresh scheduling
//!
//! Two refresh lanes sit in front of the fetch controller: a debounced lane
//! that collapses bursts of filter changes and multi-select toggles into a
//! single forced fetch, and an immediate lane used after mutations where
//! stale data must not be tolerated even momentarily.

use std::time::Duration;

use gts_common::{Clock, Debouncer, SystemClock};
use gts_domain::constants::DEFAULT_DEBOUNCE_MS;
use tracing::debug;

use super::controller::EventFetchController;
use super::ports::CalendarRefresh;

/// Debounced/coalescing refresh front-end for the fetch controller.
pub struct RefreshScheduler<C: Clock = SystemClock> {
    controller: EventFetchController<C>,
    debouncer: Debouncer,
}

impl<C: Clock + 'static> RefreshScheduler<C> {
    /// Scheduler with the default trailing window.
    pub fn new(controller: EventFetchController<C>) -> Self {
        Self::with_window(controller, Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    /// Scheduler with a custom trailing window (for testing).
    pub fn with_window(controller: EventFetchController<C>, window: Duration) -> Self {
        Self { controller, debouncer: Debouncer::new(window) }
    }

    /// Request a refetch, coalescing with any other requests that arrive
    /// within the trailing window. When the window finally elapses the
    /// controller is armed to bypass its cache and the widget is asked to
    /// re-request events. N calls, one network fetch.
    pub fn schedule_refetch(&self) {
        let controller = self.controller.clone();
        self.debouncer.call(move || async move {
            debug!("debounced refetch firing");
            controller.mark_force_refresh();
            controller.view().request_refetch();
        });
    }
}

impl<C: Clock + 'static> CalendarRefresh for RefreshScheduler<C> {
    /// Immediate, non-debounced refresh: drop the whole cache, then force
    /// one fetch. Mutation paths call this so the next paint reflects
    /// server truth.
    fn refresh_calendar(&self) {
        debug!("immediate calendar refresh");
        self.debouncer.cancel();
        self.controller.invalidate_cache();
        self.controller.mark_force_refresh();
        self.controller.view().request_refetch();
    }
}
