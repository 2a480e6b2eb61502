// src/registry/export.rs

//! Module identity and module values.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Canonical module identifier type used throughout the registry.
pub type ModuleId = String;

/// Capability view over one registry entry.
///
/// A handle carries nothing but the identifier; every operation goes through
/// the [`Registry`](super::Registry) that created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleHandle {
    id: ModuleId,
}

impl ModuleHandle {
    pub(crate) fn new(id: impl Into<ModuleId>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// The exported value of a module.
///
/// Until an initializer says otherwise, a module exports its own handle.
#[derive(Clone)]
pub enum Export {
    Handle(ModuleHandle),
    Value(Rc<dyn Any>),
}

impl Export {
    /// Wrap a concrete value.
    pub fn value<T: Any>(value: T) -> Self {
        Export::Value(Rc::new(value))
    }

    pub fn is_handle(&self) -> bool {
        matches!(self, Export::Handle(_))
    }

    pub fn as_handle(&self) -> Option<&ModuleHandle> {
        match self {
            Export::Handle(handle) => Some(handle),
            Export::Value(_) => None,
        }
    }

    /// Borrow the concrete value as `T`, if this export holds one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Export::Handle(_) => None,
            Export::Value(value) => value.downcast_ref::<T>(),
        }
    }

    /// Whether both exports are the very same value (or the same handle).
    pub fn same_as(&self, other: &Export) -> bool {
        match (self, other) {
            (Export::Handle(a), Export::Handle(b)) => a == b,
            (Export::Value(a), Export::Value(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Human-readable rendering for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            Export::Handle(handle) => format!("<module {}>", handle.id()),
            Export::Value(value) => {
                if let Some(s) = value.downcast_ref::<String>() {
                    format!("{s:?}")
                } else if let Some(s) = value.downcast_ref::<&str>() {
                    format!("{s:?}")
                } else if let Some(n) = value.downcast_ref::<i64>() {
                    n.to_string()
                } else if let Some(n) = value.downcast_ref::<i32>() {
                    n.to_string()
                } else if let Some(n) = value.downcast_ref::<f64>() {
                    n.to_string()
                } else if let Some(b) = value.downcast_ref::<bool>() {
                    b.to_string()
                } else {
                    "<opaque>".to_string()
                }
            }
        }
    }
}

impl PartialEq for Export {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::Handle(handle) => f.debug_tuple("Handle").field(&handle.id()).finish(),
            Export::Value(_) => f.debug_tuple("Value").field(&self.describe()).finish(),
        }
    }
}

impl From<ModuleHandle> for Export {
    fn from(handle: ModuleHandle) -> Self {
        Export::Handle(handle)
    }
}
