// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::registry::ModuleId;

#[derive(Error, Debug)]
pub enum ModgraphError {
    /// Malformed call shape (e.g. `require` with no identifiers, or a handle
    /// that does not belong to this registry).
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    /// An argument failed its expected shape (e.g. an empty identifier).
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Module '{0}' cannot require itself")]
    SelfDependency(String),

    #[error("Module '{0}' already has an initializer; its dependencies are frozen")]
    DependenciesFrozen(String),

    #[error("Module '{0}' already has a different initializer")]
    DuplicateInitializer(String),

    #[error("Invalid done transition for module '{module}': {reason}")]
    InvalidDoneTransition { module: ModuleId, reason: String },

    /// A declared dependency was already in the error state when the
    /// module tried to resolve it.
    #[error("Module '{module}' cannot run: dependency '{dependency}' failed")]
    DependencyFailed {
        module: ModuleId,
        dependency: ModuleId,
    },

    #[error("Initializer of module '{module}' failed: {source}")]
    InitializerFailure {
        module: ModuleId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Loading module '{module}' failed: {source}")]
    LoadFailure {
        module: ModuleId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cycle detected in module graph: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModgraphError {
    /// The module whose initializer or load failed, if any. It is in the error
    /// state unless it had already completed.
    pub fn failed_module(&self) -> Option<&ModuleId> {
        match self {
            ModgraphError::InitializerFailure { module, .. }
            | ModgraphError::LoadFailure { module, .. } => Some(module),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ModgraphError>;
