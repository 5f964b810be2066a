//! Trace settings.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use tracegraph::config::TraceSettings;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".tracegraph.yml"), "name_suffix_length: 4").unwrap();
//!
//! let settings = TraceSettings::discover(temp.path()).unwrap();
//! assert_eq!(settings.name_suffix_length, 4);
//! ```

pub mod loader;
pub mod schema;

pub use loader::candidate_paths;
pub use schema::TraceSettings;
