//! Data models: invoice records, configuration and the extraction history.

pub mod config;
pub mod history;
pub mod invoice;
