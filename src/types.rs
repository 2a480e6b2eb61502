// src/types.rs

use std::str::FromStr;
use serde::Deserialize;

/// Name of the module pre-created in every registry.
pub const DEFAULT_ROOT_MODULE: &str = "Program";

/// What a completion cascade does when one of the dependants it invokes fails.
///
/// - `Continue`: keep invoking the other ready dependants (each dependant's
///   readiness is independent) and report the first failure once the cascade
///   has drained (default behaviour).
/// - `Abort`: stop at the first failure. Dependants that were already queued
///   are left un-invoked with a pending count of zero and are listed by
///   [`Registry::abandoned`](crate::registry::Registry::abandoned).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadePolicy {
    #[default]
    Continue,
    Abort,
}

impl FromStr for CascadePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(CascadePolicy::Continue),
            "abort" => Ok(CascadePolicy::Abort),
            other => Err(format!(
                "invalid cascade_failure: {other} (expected \"continue\" or \"abort\")"
            )),
        }
    }
}

/// Settings a [`Registry`](crate::registry::Registry) is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Identifier of the root module created at startup.
    pub root_module: String,
    pub cascade_failure: CascadePolicy,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            root_module: DEFAULT_ROOT_MODULE.to_string(),
            cascade_failure: CascadePolicy::default(),
        }
    }
}
