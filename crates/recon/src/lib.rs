//! `dora-recon`: reconciliation engine for versioned administrative-boundary datasets.
//!
//! Pure engine crate: receives pre-loaded GeoJSON collections, returns
//! validation diagnostics and a per-level mapping between the old and new
//! versions of each unit. No CLI or IO dependencies.

pub mod canonical;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod listing;
pub mod mapping;
pub mod matcher;
pub mod model;
pub mod property;
pub mod summary;
pub mod validate;

pub use config::{MatchOptions, ProjectConfig};
pub use engine::run;
pub use error::ReconError;
pub use mapping::Mapping;
pub use model::{AdminLevel, AdminSet, Link, LinkKind, ReconInput, ReconResult, Settings};
