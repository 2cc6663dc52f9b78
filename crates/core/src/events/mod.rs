//! Calendar event fetching, caching, and indexing
//!
//! The pipeline: the calendar widget asks the [`controller`] for events
//! whenever its visible window or filters change; the controller consults
//! the [`cache`] (stale-while-revalidate, change detection via
//! [`signature`]), and every served event set is folded into a fresh
//! [`day_index`] for per-day lookups. Bursty refresh triggers go through the
//! [`scheduler`].

pub mod cache;
pub mod controller;
pub mod day_index;
pub mod ports;
pub mod preferences;
pub mod scheduler;
pub mod signature;
