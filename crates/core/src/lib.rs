//! # GTS Core
//!
//! Core calendar-client logic, free of I/O.
//!
//! This crate contains:
//! - Port traits for everything the calendar core talks to (events API,
//!   key-value storage, the calendar widget, the job workspace)
//! - The stale-while-revalidate event fetch controller
//! - The fingerprint-keyed event cache store
//! - The event-set signature engine and the per-day event index
//! - The debounced refresh scheduler and the day panel
//!
//! ## Architecture
//! - Defines traits implemented in `gts-infra`
//! - Depends on `gts-domain` and `gts-common` only
//! - All network and storage access goes through ports

pub mod events;
pub mod panel;

// Re-export commonly used items
pub use events::cache::{CachedEvents, EventCacheConfig, EventCacheStore};
pub use events::controller::EventFetchController;
pub use events::day_index::DayIndex;
pub use events::ports::{
    CalendarRefresh, CalendarView, CsrfTokenProvider, EventsApi, JobWorkspace, KeyValueStore,
    Toasts,
};
pub use events::scheduler::RefreshScheduler;
pub use events::signature::signature;
pub use panel::day_panel::{DayPanel, DayPanelItem};
