// src/registry/initializer.rs

//! Initializer callables and the context they run in.

use std::fmt;
use std::rc::Rc;

use crate::errors::Result;
use crate::registry::export::{Export, ModuleHandle};
use crate::registry::Registry;

type InitFn = dyn Fn(&mut ModuleContext<'_>, &[Export]) -> anyhow::Result<Option<Export>>;

/// A module's initializer.
///
/// Receives the resolved exports of the module's dependencies, in declaration
/// order. Returning `Ok(Some(export))` replaces the module's default export
/// (its own handle); `Ok(None)` keeps it.
///
/// Cloning is cheap and preserves identity: assigning a clone of the
/// initializer a module already has is accepted as a no-op.
#[derive(Clone)]
pub struct Initializer(Rc<InitFn>);

impl Initializer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut ModuleContext<'_>, &[Export]) -> anyhow::Result<Option<Export>> + 'static,
    {
        Self(Rc::new(f))
    }

    /// Initializer that does nothing and keeps the default export.
    pub fn noop() -> Self {
        Self::new(|_, _| Ok(None))
    }

    pub fn same_as(&self, other: &Initializer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn call(
        &self,
        ctx: &mut ModuleContext<'_>,
        deps: &[Export],
    ) -> anyhow::Result<Option<Export>> {
        (self.0)(ctx, deps)
    }
}

impl fmt::Debug for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Initializer")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// What an initializer sees while it runs.
pub struct ModuleContext<'r> {
    registry: &'r mut Registry,
    handle: ModuleHandle,
    receiver: Export,
}

impl<'r> ModuleContext<'r> {
    pub(crate) fn new(registry: &'r mut Registry, handle: ModuleHandle, receiver: Export) -> Self {
        Self {
            registry,
            handle,
            receiver,
        }
    }

    /// Handle of the module being initialized.
    pub fn handle(&self) -> &ModuleHandle {
        &self.handle
    }

    /// The module's current export at the time the initializer was invoked.
    pub fn this(&self) -> &Export {
        &self.receiver
    }

    pub fn registry(&mut self) -> &mut Registry {
        self.registry
    }

    /// Declare the module asynchronous: returning from the initializer will
    /// not complete it.
    pub fn set_async(&mut self) -> Result<()> {
        let handle = self.handle.clone();
        self.registry.set_async(&handle, true)
    }

    /// Complete an asynchronous module from inside its initializer.
    pub fn complete(&mut self) -> Result<()> {
        let handle = self.handle.clone();
        self.registry.set_done(&handle, true)
    }
}

impl fmt::Debug for ModuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleContext")
            .field("module", &self.handle.id())
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}
