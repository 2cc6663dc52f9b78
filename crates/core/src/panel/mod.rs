//! Day-scoped presentation of the current event set

pub mod day_panel;
