//! Data models for batch-code extraction.

pub mod batch;
pub mod config;
pub mod lookup;
