// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{Manifest, RawManifest};
use crate::errors::Result;

/// Read a manifest from `path` without validating it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_manifest(&contents)
}

/// Parse manifest TOML text without validating it.
pub fn parse_manifest(contents: &str) -> Result<RawManifest> {
    let manifest: RawManifest = toml::from_str(contents)?;
    Ok(manifest)
}

/// Read and validate a manifest.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks identifiers, self-requires, timer settings and, when
///   `detect_cycles` is on, acyclicity.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let raw = load_from_path(&path)?;
    let manifest = Manifest::try_from(raw)?;
    Ok(manifest)
}

/// Default manifest location: `Modgraph.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Modgraph.toml")
}
