// src/loader/mod.rs

//! The load hook boundary.
//!
//! The registry calls its [`ModuleLoader`] exactly once for every module that
//! is first discovered through a dependency declaration. The loader is
//! trusted to eventually give that module an initializer (directly or via
//! some later event); the registry never checks.

use std::fmt;

use crate::registry::Registry;

pub mod manifest;

pub use manifest::ManifestLoader;

/// Hook that locates and defines modules on demand.
pub trait ModuleLoader: fmt::Debug {
    /// Start loading `id`. An error marks `id` as failed and is reported to
    /// whoever declared the dependency.
    fn load_module(&self, registry: &mut Registry, id: &str) -> anyhow::Result<()>;
}

/// Loader that does nothing; requested modules stay loading until someone
/// defines them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoader;

impl ModuleLoader for NoopLoader {
    fn load_module(&self, _registry: &mut Registry, id: &str) -> anyhow::Result<()> {
        tracing::debug!(module = %id, "no loader configured; module left loading");
        Ok(())
    }
}

/// Adapter turning a closure into a [`ModuleLoader`].
pub struct FnLoader<F> {
    f: F,
}

impl<F> FnLoader<F>
where
    F: Fn(&mut Registry, &str) -> anyhow::Result<()>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnLoader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLoader").finish_non_exhaustive()
    }
}

impl<F> ModuleLoader for FnLoader<F>
where
    F: Fn(&mut Registry, &str) -> anyhow::Result<()>,
{
    fn load_module(&self, registry: &mut Registry, id: &str) -> anyhow::Result<()> {
        (self.f)(registry, id)
    }
}
