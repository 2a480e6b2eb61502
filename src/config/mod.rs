// src/config/mod.rs

//! Manifest loading and validation for modgraph.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a manifest from disk (`loader.rs`).
//! - Validate identifiers, requires and (optionally) acyclicity (`validate.rs`).
//! - Expose the declared graph for entry selection and dry runs (`graph.rs`).

pub mod graph;
pub mod loader;
pub mod model;
pub mod validate;

pub use graph::ManifestGraph;
pub use loader::{default_config_path, load_and_validate, load_from_path, parse_manifest};
pub use model::{ConfigSection, Manifest, ModuleSpec, ModuleValue, RawManifest};
pub use validate::validate_manifest;
