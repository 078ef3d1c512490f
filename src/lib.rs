//! CRM contact extraction, cleanup and dedupe pipeline.
//!
//! The core (normalizers, reference tables, dedupe engine, orchestrator)
//! only sees the port traits in [`app::ports`]; fetching, uploading and
//! snapshot persistence are infrastructure adapters.

pub mod app;
pub mod common;
pub mod config;
pub mod dedupe;
pub mod domain;
pub mod infra;
pub mod logging;
pub mod normalize;
pub mod reference;

// Re-export commonly used types
pub use domain::{CanonicalContact, NormalizedContact, RawContactData};
