// src/registry/mod.rs

//! Module registry and scheduling.
//!
//! - [`core`] owns every module record and implements the registration
//!   protocol (`create`, `require`, initializer assignment, `async`/`done`).
//! - [`cascade`] runs initializers and pushes completion down the dependant
//!   edges with an explicit work queue.
//! - [`diagnostics`] offers read-only views: snapshots, stalled modules and
//!   an opt-in cycle check.
//! - [`export`] and [`initializer`] define the values that flow through it.
//!
//! Scheduling is driven purely by per-module counters of outstanding
//! dependencies; no topological order is ever computed. A dependency cycle
//! leaves every member waiting forever instead of failing.

pub mod cascade;
pub mod core;
pub mod diagnostics;
pub mod export;
pub mod initializer;
pub mod record;

pub use self::core::{Registry, validate_id};
pub use diagnostics::ModuleSnapshot;
pub use export::{Export, ModuleHandle, ModuleId};
pub use initializer::{Initializer, ModuleContext};
pub use record::ModuleState;
