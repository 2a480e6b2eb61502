// src/engine/mod.rs

//! Host-side driver around the registry.
//!
//! - [`session`] owns a registry built from a manifest, attaches the entry
//!   modules to the root module and signals completions.
//! - [`runtime`] is the async shell: timer tasks deliver completion events
//!   for async modules over a channel, and the loop feeds them into the
//!   session one at a time.

use crate::registry::ModuleId;

/// Why an async module is being completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// `complete_after_ms` elapsed.
    Timer,
    /// Requested explicitly (e.g. `--complete` on the command line).
    Manual,
}

/// Events flowing into the runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// An async module should be marked done.
    ModuleCompleted {
        module: ModuleId,
        reason: CompletionReason,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod runtime;
pub mod session;

pub use runtime::{Runtime, spawn_completion_timers};
pub use session::{Session, SessionReport};
