//! Deconflict CLI - loading, configuration and reporting around the
//! deconfliction core.

pub mod config;
pub mod loader;
pub mod report;

pub use config::{Config, DetectionMode};
pub use loader::{load_primary, load_traffic, parse_primary, parse_traffic};
pub use report::{render_summary, ConflictCounts, Summary};
