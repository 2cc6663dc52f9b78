//! API clients for the scheduling backend

pub mod events_client;
pub mod mutations;

pub use events_client::HttpEventsApi;
pub use mutations::{JobMutationsClient, JobPayload};
