pub mod config;
pub mod deps;
pub mod recurrence;
pub mod schedule;
