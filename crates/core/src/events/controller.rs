//! Stale-while-revalidate event fetch controller
//!
//! Owns the request lifecycle for the calendar's visible window: consult the
//! cache, serve hits immediately while revalidating in the background, and
//! keep the two network lanes (interactive fetch, background revalidation)
//! isolated so neither can cancel or block the other.
//!
//! The widget drives this type: every visible-window or filter change lands
//! in [`fetch_events`](EventFetchController::fetch_events), and a background
//! revalidation that finds changes asks the widget (via
//! [`CalendarView::request_refetch`]) to call it again; the fresh result is
//! stashed as a one-shot override so that second call never re-fetches.

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use gts_common::{Clock, SystemClock};
use gts_domain::constants::MAX_PENDING_OVERRIDES;
use gts_domain::{CalendarEvent, EventQuery, GtsError, SavedFilters, VisibleRange};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::cache::{EventCacheConfig, EventCacheStore};
use super::day_index::{event_day_span, DayIndex};
use super::ports::{CalendarView, EventsApi, KeyValueStore};
use super::preferences;
use super::signature::signature;

/// Active filter/selection state. Selection and filters persist to storage;
/// the visible month/year only live for the session (the persisted current
/// date covers restarts).
#[derive(Debug, Default)]
struct FilterState {
    selected_calendars: BTreeSet<String>,
    default_calendar: Option<String>,
    calendar_filter: String,
    status: String,
    search: String,
    month: Option<u32>,
    year: Option<i32>,
}

#[derive(Default)]
struct CurrentEvents {
    events: Vec<CalendarEvent>,
    index: Option<DayIndex>,
}

/// The calendar's fetch state machine.
///
/// Composed from its ports at construction; persisted preferences are
/// restored in the constructor so the first fetch already carries the
/// correct filters. Cloning is cheap and clones share all state, which is
/// how background revalidation tasks keep a handle on the controller.
pub struct EventFetchController<C: Clock = SystemClock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for EventFetchController<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

struct Inner<C: Clock> {
    api: Arc<dyn EventsApi>,
    store: Arc<dyn KeyValueStore>,
    view: Arc<dyn CalendarView>,
    cache: EventCacheStore<C>,
    tz: Tz,

    filters: Mutex<FilterState>,
    visible_range: Mutex<Option<VisibleRange>>,
    current: Mutex<CurrentEvents>,

    /// Fresh revalidation results awaiting their re-render, keyed by
    /// fingerprint and consumed exactly once.
    overrides: Mutex<VecDeque<(String, Vec<CalendarEvent>)>>,

    /// Interactive fetch lane: starting a new fetch cancels the previous
    /// one (last-request-wins).
    primary_cancel: Mutex<CancellationToken>,
    /// Revalidation lane, independent of the primary lane.
    revalidation_cancel: Mutex<CancellationToken>,

    /// Consume-once flag set by the refresh scheduler to bypass the cache
    /// for the next fetch cycle.
    force_refresh: AtomicBool,
}

impl EventFetchController<SystemClock> {
    /// Controller with the system clock and default cache configuration.
    pub fn new(
        api: Arc<dyn EventsApi>,
        store: Arc<dyn KeyValueStore>,
        view: Arc<dyn CalendarView>,
        tz: Tz,
    ) -> Self {
        Self::with_clock(api, store, view, tz, EventCacheConfig::default(), SystemClock)
    }
}

impl<C: Clock + 'static> EventFetchController<C> {
    /// Controller with a custom clock and cache configuration (for testing).
    pub fn with_clock(
        api: Arc<dyn EventsApi>,
        store: Arc<dyn KeyValueStore>,
        view: Arc<dyn CalendarView>,
        tz: Tz,
        cache_config: EventCacheConfig,
        clock: C,
    ) -> Self {
        let prefs = preferences::load(store.as_ref());
        let filters = FilterState {
            selected_calendars: prefs.effective_selection().into_iter().collect(),
            default_calendar: prefs.default_calendar.clone(),
            calendar_filter: prefs.filters.calendar.clone(),
            status: prefs.filters.status.clone(),
            search: prefs.filters.search.clone(),
            month: None,
            year: None,
        };

        Self {
            inner: Arc::new(Inner {
                api,
                cache: EventCacheStore::with_clock(Arc::clone(&store), cache_config, clock),
                store,
                view,
                tz,
                filters: Mutex::new(filters),
                visible_range: Mutex::new(None),
                current: Mutex::new(CurrentEvents::default()),
                overrides: Mutex::new(VecDeque::new()),
                primary_cancel: Mutex::new(CancellationToken::new()),
                revalidation_cancel: Mutex::new(CancellationToken::new()),
                force_refresh: AtomicBool::new(false),
            }),
        }
    }

    /// Fetch the events for a visible window.
    ///
    /// Never errors toward the caller: every failure mode degrades to an
    /// empty list (or previously cached data) so the widget cannot be left
    /// in a broken state by a transient network problem.
    pub async fn fetch_events(&self, range: VisibleRange) -> Vec<CalendarEvent> {
        let inner = &self.inner;
        *inner.visible_range.lock() = Some(range);

        let Some(query) = inner.build_query(range) else {
            debug!("no calendars selected; skipping event fetch");
            inner.view.set_no_calendars_notice(true);
            inner.view.hide_loading();
            return Vec::new();
        };
        inner.view.set_no_calendars_notice(false);

        let fingerprint = query.fingerprint();

        // A background revalidation may already have produced this answer;
        // consuming it here is what keeps a revalidation-triggered re-render
        // from costing a second network round trip.
        if let Some(events) = inner.take_override(&fingerprint) {
            debug!(%fingerprint, count = events.len(), "serving pending revalidation result");
            inner.install_events(&events);
            inner.view.hide_loading();
            return events;
        }

        let force = inner.force_refresh.swap(false, Ordering::SeqCst);
        if !force {
            if let Some(hit) = inner.cache.get(&fingerprint) {
                self.spawn_revalidation(query, fingerprint, hit.signature.clone());
                // One turn of the event loop so the widget can paint the
                // cached batch before heavier render work lands.
                tokio::task::yield_now().await;
                inner.install_events(&hit.events);
                inner.view.hide_loading();
                return hit.events;
            }
        }

        inner.view.show_loading();
        let token = inner.rotate_primary_token();
        match inner.api.fetch_events(&query, token).await {
            Ok(events) => {
                inner.cache.put(&fingerprint, &events, None);
                inner.install_events(&events);
                inner.view.hide_loading();
                events
            }
            Err(GtsError::Cancelled) => {
                // A newer fetch owns the view now; its completion will
                // settle the loading indicator.
                debug!(%fingerprint, "primary fetch superseded; result discarded");
                Vec::new()
            }
            Err(err) => {
                warn!(%fingerprint, error = %err, "event fetch failed; serving empty set");
                inner.view.hide_loading();
                Vec::new()
            }
        }
    }

    /// Events overlapping a local calendar day, via the day index when one
    /// has been built and a linear scan of the current set before first
    /// paint.
    pub fn events_for_day(&self, day: NaiveDate) -> Vec<Arc<CalendarEvent>> {
        self.inner.events_for_day(day)
    }

    /// The event set most recently handed to the widget.
    pub fn current_events(&self) -> Vec<CalendarEvent> {
        self.inner.current.lock().events.clone()
    }

    /// Replace the calendar selection and persist it.
    pub fn set_selected_calendars(&self, ids: impl IntoIterator<Item = String>) {
        let snapshot: Vec<String> = {
            let mut filters = self.inner.filters.lock();
            filters.selected_calendars = ids.into_iter().collect();
            filters.selected_calendars.iter().cloned().collect()
        };
        preferences::save_selected_calendars(self.inner.store.as_ref(), &snapshot);
    }

    /// Toggle one calendar in the selection; returns whether it is now
    /// selected. Persists the new selection.
    pub fn toggle_calendar(&self, id: &str) -> bool {
        let (selected, snapshot) = {
            let mut filters = self.inner.filters.lock();
            let selected = if filters.selected_calendars.remove(id) {
                false
            } else {
                filters.selected_calendars.insert(id.to_string());
                true
            };
            (selected, filters.selected_calendars.iter().cloned().collect::<Vec<_>>())
        };
        preferences::save_selected_calendars(self.inner.store.as_ref(), &snapshot);
        selected
    }

    pub fn selected_calendars(&self) -> Vec<String> {
        self.inner.filters.lock().selected_calendars.iter().cloned().collect()
    }

    /// Set the default calendar used when no multi-select exists yet.
    pub fn set_default_calendar(&self, id: Option<String>) {
        self.inner.filters.lock().default_calendar = id.clone();
        preferences::save_default_calendar(self.inner.store.as_ref(), id.as_deref());
    }

    pub fn default_calendar(&self) -> Option<String> {
        self.inner.filters.lock().default_calendar.clone()
    }

    pub fn set_status_filter(&self, status: impl Into<String>) {
        let saved = {
            let mut filters = self.inner.filters.lock();
            filters.status = status.into();
            saved_filters(&filters)
        };
        preferences::save_filters(self.inner.store.as_ref(), &saved);
    }

    pub fn set_search_filter(&self, search: impl Into<String>) {
        let saved = {
            let mut filters = self.inner.filters.lock();
            filters.search = search.into();
            saved_filters(&filters)
        };
        preferences::save_filters(self.inner.store.as_ref(), &saved);
    }

    /// Track the visible month/year (session-only view state).
    pub fn set_visible_month(&self, year: i32, month: u32) {
        let mut filters = self.inner.filters.lock();
        filters.year = Some(year);
        filters.month = Some(month);
    }

    pub fn visible_month(&self) -> Option<(i32, u32)> {
        let filters = self.inner.filters.lock();
        filters.year.zip(filters.month)
    }

    /// Persist the date the calendar is centered on.
    pub fn record_current_date(&self, date: DateTime<Utc>) {
        preferences::save_current_date(self.inner.store.as_ref(), date);
    }

    /// Arm the next fetch cycle to bypass the cache. Consumed by exactly one
    /// [`fetch_events`](Self::fetch_events) pass.
    pub fn mark_force_refresh(&self) {
        self.inner.force_refresh.store(true, Ordering::SeqCst);
    }

    /// Whether a forced fetch cycle is armed but not yet consumed.
    pub fn force_refresh_pending(&self) -> bool {
        self.inner.force_refresh.load(Ordering::SeqCst)
    }

    /// Drop every cache entry and pending override. Called after mutations.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
        self.inner.overrides.lock().clear();
    }

    pub fn view(&self) -> Arc<dyn CalendarView> {
        Arc::clone(&self.inner.view)
    }

    pub fn timezone(&self) -> Tz {
        self.inner.tz
    }

    fn spawn_revalidation(&self, query: EventQuery, fingerprint: String, cached: String) {
        let inner = Arc::clone(&self.inner);
        let token = inner.rotate_revalidation_token();
        tokio::spawn(async move {
            inner.revalidate(query, fingerprint, cached, token).await;
        });
    }
}

impl<C: Clock> Inner<C> {
    fn build_query(&self, range: VisibleRange) -> Option<EventQuery> {
        let filters = self.filters.lock();
        if filters.selected_calendars.is_empty() {
            return None;
        }
        Some(EventQuery::new(
            range,
            filters.selected_calendars.iter().cloned(),
            filters.status.clone(),
            filters.search.clone(),
        ))
    }

    fn events_for_day(&self, day: NaiveDate) -> Vec<Arc<CalendarEvent>> {
        let current = self.current.lock();
        match &current.index {
            Some(index) => index.lookup(day).to_vec(),
            None => current
                .events
                .iter()
                .filter(|event| {
                    event_day_span(event, self.tz)
                        .is_some_and(|(start, end)| day >= start && day <= end)
                })
                .map(|event| Arc::new(event.clone()))
                .collect(),
        }
    }

    fn install_events(&self, events: &[CalendarEvent]) {
        let mut current = self.current.lock();
        current.events = events.to_vec();
        current.index = Some(DayIndex::build(events, self.tz));
    }

    async fn revalidate(
        &self,
        query: EventQuery,
        fingerprint: String,
        cached_signature: String,
        token: CancellationToken,
    ) {
        let issued = query.range;
        match self.api.fetch_events(&query, token).await {
            Err(GtsError::Cancelled) => {
                debug!(%fingerprint, "revalidation superseded");
            }
            Err(err) => {
                // Revalidation failures must never surface: the user already
                // has servable (cached) data on screen.
                debug!(%fingerprint, error = %err, "background revalidation failed");
            }
            Ok(events) => {
                let fresh = signature(&events);
                if fresh == cached_signature {
                    debug!(%fingerprint, "revalidation confirmed cache; touching entry");
                    self.cache.touch(&fingerprint);
                    return;
                }

                self.cache.put(&fingerprint, &events, Some(fresh));

                let current_range = *self.visible_range.lock();
                if current_range.is_some_and(|current| current.same_days(&issued)) {
                    debug!(%fingerprint, count = events.len(), "revalidation found changes; requesting re-render");
                    self.stash_override(fingerprint, events);
                    self.view.request_refetch();
                } else {
                    debug!(%fingerprint, "view moved during revalidation; result cached but not rendered");
                }
            }
        }
    }

    fn stash_override(&self, fingerprint: String, events: Vec<CalendarEvent>) {
        let mut stash = self.overrides.lock();
        stash.retain(|(key, _)| key != &fingerprint);
        stash.push_back((fingerprint, events));
        while stash.len() > MAX_PENDING_OVERRIDES {
            if let Some((dropped, _)) = stash.pop_front() {
                debug!(fingerprint = %dropped, "pending override dropped; stash full");
            }
        }
    }

    fn take_override(&self, fingerprint: &str) -> Option<Vec<CalendarEvent>> {
        let mut stash = self.overrides.lock();
        let position = stash.iter().position(|(key, _)| key == fingerprint)?;
        stash.remove(position).map(|(_, events)| events)
    }

    fn rotate_primary_token(&self) -> CancellationToken {
        let mut guard = self.primary_cancel.lock();
        let fresh = CancellationToken::new();
        let previous = std::mem::replace(&mut *guard, fresh.clone());
        previous.cancel();
        fresh
    }

    fn rotate_revalidation_token(&self) -> CancellationToken {
        let mut guard = self.revalidation_cancel.lock();
        let fresh = CancellationToken::new();
        let previous = std::mem::replace(&mut *guard, fresh.clone());
        previous.cancel();
        fresh
    }
}

fn saved_filters(filters: &FilterState) -> SavedFilters {
    SavedFilters {
        calendar: filters.calendar_filter.clone(),
        status: filters.status.clone(),
        search: filters.search.clone(),
    }
}
