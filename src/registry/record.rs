// src/registry/record.rs

//! Per-module record owned by the registry.

use std::fmt;

use crate::registry::export::{Export, ModuleId};
use crate::registry::initializer::Initializer;

/// Lifecycle state of a module.
///
/// `Done` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Referenced but nobody has started defining or loading it.
    None,
    /// A handle exists or a load is in flight; not yet complete.
    Loading,
    Done,
    Error,
}

impl ModuleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ModuleState::Done | ModuleState::Error)
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModuleState::None => "none",
            ModuleState::Loading => "loading",
            ModuleState::Done => "done",
            ModuleState::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub(crate) struct ModuleRecord {
    pub(crate) id: ModuleId,
    pub(crate) state: ModuleState,
    pub(crate) is_async: bool,
    /// Dependencies that have not completed yet.
    pub(crate) pending: usize,
    pub(crate) value: Option<Export>,
    pub(crate) initializer: Option<Initializer>,
    /// Declaration order; defines the positional order of initializer arguments.
    pub(crate) dependencies: Vec<ModuleId>,
    /// Registration order; each id appears at most once.
    pub(crate) dependants: Vec<ModuleId>,
    /// Set while the initializer assignment walks the dependency list.
    pub(crate) resolving: bool,
    pub(crate) invoked: bool,
}

impl ModuleRecord {
    pub(crate) fn new(id: ModuleId) -> Self {
        Self {
            id,
            state: ModuleState::None,
            is_async: false,
            pending: 0,
            value: None,
            initializer: None,
            dependencies: Vec::new(),
            dependants: Vec::new(),
            resolving: false,
            invoked: false,
        }
    }

    /// Whether the value is still unset or the module's own handle.
    pub(crate) fn has_default_value(&self) -> bool {
        match &self.value {
            None => true,
            Some(Export::Handle(handle)) => handle.id() == self.id,
            Some(Export::Value(_)) => false,
        }
    }

    /// Whether a cascade that drained this record's counter may run it now.
    pub(crate) fn ready_for_cascade(&self) -> bool {
        self.pending == 0
            && self.initializer.is_some()
            && !self.resolving
            && !self.invoked
            && self.state != ModuleState::Error
    }
}
