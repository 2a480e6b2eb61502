// src/registry/core.rs

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::errors::{ModgraphError, Result};
use crate::loader::{ModuleLoader, NoopLoader};
use crate::registry::export::{Export, ModuleHandle, ModuleId};
use crate::registry::initializer::Initializer;
use crate::registry::record::{ModuleRecord, ModuleState};
use crate::types::RegistryOptions;

/// Single source of truth for all module records.
///
/// The registry lives as long as the graph it schedules; records are never
/// removed. Every operation is synchronous and takes `&mut self`, so two
/// cascades can never interleave their mutations.
pub struct Registry {
    pub(super) modules: HashMap<ModuleId, ModuleRecord>,
    /// Creation order, for deterministic iteration.
    pub(super) order: Vec<ModuleId>,
    pub(super) loader: Rc<dyn ModuleLoader>,
    pub(super) options: RegistryOptions,
    root: ModuleHandle,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("root", &self.root)
            .field("modules", &self.order.len())
            .field("loader", &self.loader)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry with default options and a loader that never defines anything.
    pub fn new() -> Self {
        let options = RegistryOptions::default();
        let root = ModuleHandle::new(options.root_module.clone());
        let mut registry = Self {
            modules: HashMap::new(),
            order: Vec::new(),
            loader: Rc::new(NoopLoader),
            options,
            root,
        };
        registry.install_root();
        registry
    }

    /// Registry with explicit options. Fails if the root identifier is invalid.
    pub fn with_options(options: RegistryOptions) -> Result<Self> {
        validate_id(&options.root_module)?;
        let root = ModuleHandle::new(options.root_module.clone());
        let mut registry = Self {
            modules: HashMap::new(),
            order: Vec::new(),
            loader: Rc::new(NoopLoader),
            options,
            root,
        };
        registry.install_root();
        Ok(registry)
    }

    /// Replace the load hook.
    pub fn with_loader(mut self, loader: Rc<dyn ModuleLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn set_loader(&mut self, loader: Rc<dyn ModuleLoader>) {
        self.loader = loader;
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// The root module created at startup.
    pub fn program(&self) -> ModuleHandle {
        self.root.clone()
    }

    /// Handle for an existing module, for hosts that only know the identifier.
    pub fn handle(&self, id: &str) -> Result<ModuleHandle> {
        self.record(id)?;
        Ok(ModuleHandle::new(id))
    }

    fn install_root(&mut self) {
        let id = self.root.id().to_string();
        self.insert_record(&id);
        if let Some(record) = self.modules.get_mut(&id) {
            record.value = Some(Export::Handle(self.root.clone()));
            record.state = ModuleState::Loading;
        }
        debug!(module = %id, "root module created");
    }

    fn insert_record(&mut self, id: &str) -> bool {
        if self.modules.contains_key(id) {
            return false;
        }
        self.modules
            .insert(id.to_string(), ModuleRecord::new(id.to_string()));
        self.order.push(id.to_string());
        true
    }

    pub(super) fn record(&self, id: &str) -> Result<&ModuleRecord> {
        self.modules
            .get(id)
            .ok_or_else(|| ModgraphError::InvalidUsage(format!("unknown module '{id}'")))
    }

    pub(super) fn record_mut(&mut self, id: &str) -> Result<&mut ModuleRecord> {
        self.modules
            .get_mut(id)
            .ok_or_else(|| ModgraphError::InvalidUsage(format!("unknown module '{id}'")))
    }

    /// Create a record in the `None` state if `id` has none. Never touches an
    /// existing record.
    pub fn ensure(&mut self, id: &str) -> Result<()> {
        validate_id(id)?;
        if self.insert_record(id) {
            debug!(module = %id, "registered module record");
        }
        Ok(())
    }

    /// Record a pre-known export for `id`.
    ///
    /// Returns `false` (and leaves the record alone) if a value is already set.
    pub fn seed_value(&mut self, id: &str, value: Export) -> Result<bool> {
        self.ensure(id)?;
        let record = self.record_mut(id)?;
        if record.value.is_some() {
            debug!(module = %id, "value already set; ignoring seed");
            return Ok(false);
        }
        record.value = Some(value);
        Ok(true)
    }

    /// Append `dep` to `owner`'s ordered dependency list.
    pub fn link_dependency(&mut self, owner: &str, dep: &str) -> Result<()> {
        if owner == dep {
            return Err(ModgraphError::SelfDependency(owner.to_string()));
        }
        self.record(owner)?;
        self.ensure(dep)?;
        self.record_mut(owner)?.dependencies.push(dep.to_string());
        debug!(module = %owner, dependency = %dep, "declared dependency");
        Ok(())
    }

    /// Register `dependant` as waiting on `dep`.
    ///
    /// Only the first registration of a pair counts: it bumps the dependant's
    /// pending counter and returns `true`. Repeats return `false`.
    ///
    /// The dependant must already have an initializer and must have declared
    /// `dep`, and `dep` must not be finished. Otherwise nothing would ever
    /// balance the counter.
    pub fn link_dependant(&mut self, dep: &str, dependant: &str) -> Result<bool> {
        let waiting = self.record(dependant)?;
        if waiting.initializer.is_none() {
            return Err(ModgraphError::InvalidUsage(format!(
                "module '{dependant}' has no initializer; it cannot wait on '{dep}'"
            )));
        }
        if !waiting.dependencies.iter().any(|d| d == dep) {
            return Err(ModgraphError::InvalidUsage(format!(
                "module '{dependant}' does not require '{dep}'"
            )));
        }
        let record = self.record_mut(dep)?;
        if record.state.is_terminal() {
            return Err(ModgraphError::InvalidUsage(format!(
                "module '{dep}' is already {}; '{dependant}' cannot wait on it",
                record.state
            )));
        }
        if record.dependants.iter().any(|d| d == dependant) {
            return Ok(false);
        }
        record.dependants.push(dependant.to_string());
        let waiting = self.record_mut(dependant)?;
        waiting.pending += 1;
        debug!(
            module = %dependant,
            dependency = %dep,
            pending = waiting.pending,
            "waiting on dependency"
        );
        Ok(true)
    }

    /// Obtain the export for `id`.
    ///
    /// If the module already carries a value (its own handle included), that
    /// value is returned unchanged. Otherwise the record is created, its value
    /// becomes a fresh handle, and a `None` record moves to `Loading`.
    pub fn create(&mut self, id: &str) -> Result<Export> {
        validate_id(id)?;
        if let Some(value) = self.modules.get(id).and_then(|r| r.value.clone()) {
            debug!(module = %id, "module already has a value; reusing it");
            return Ok(value);
        }

        self.ensure(id)?;
        let handle = ModuleHandle::new(id);
        self.seed_value(id, Export::Handle(handle.clone()))?;

        let record = self.record_mut(id)?;
        if record.state == ModuleState::None {
            record.state = ModuleState::Loading;
            debug!(module = %id, "module none -> loading");
        }
        Ok(Export::Handle(handle))
    }

    /// Like [`create`](Self::create), but insists on getting a handle back.
    ///
    /// Fails if the module already resolved to a concrete value.
    pub fn define(&mut self, id: &str) -> Result<ModuleHandle> {
        match self.create(id)? {
            Export::Handle(handle) if handle.id() == id => Ok(handle),
            other => Err(ModgraphError::InvalidUsage(format!(
                "module '{id}' already resolved to {}",
                other.describe()
            ))),
        }
    }

    /// Declare dependencies of `handle`, appended in call order.
    ///
    /// Rejected once the initializer is assigned. All identifiers are checked
    /// before any is recorded, so a failing call leaves the module unchanged.
    pub fn require<I, S>(&mut self, handle: &ModuleHandle, ids: I) -> Result<ModuleHandle>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<String> = ids.into_iter().map(|s| s.as_ref().to_string()).collect();
        let owner = handle.id();

        if ids.is_empty() {
            return Err(ModgraphError::InvalidUsage(format!(
                "require on '{owner}' needs at least one module identifier"
            )));
        }
        if self.record(owner)?.initializer.is_some() {
            return Err(ModgraphError::DependenciesFrozen(owner.to_string()));
        }
        for id in &ids {
            validate_id(id)?;
            if id == owner {
                return Err(ModgraphError::SelfDependency(owner.to_string()));
            }
        }

        for id in &ids {
            self.link_dependency(owner, id)?;
        }
        Ok(handle.clone())
    }

    pub fn initializer(&self, handle: &ModuleHandle) -> Option<Initializer> {
        self.modules
            .get(handle.id())
            .and_then(|r| r.initializer.clone())
    }

    /// Assign the initializer and resolve dependencies.
    ///
    /// Each dependency is inspected in declaration order: unseen ones are
    /// handed to the load hook, in-flight ones are waited on, completed ones
    /// count for nothing and a failed one fails this module. If nothing is
    /// outstanding afterwards the initializer runs before this returns.
    pub fn set_initializer(&mut self, handle: &ModuleHandle, initializer: Initializer) -> Result<()> {
        let id = handle.id().to_string();
        let record = self.record_mut(&id)?;

        if let Some(existing) = &record.initializer {
            if existing.same_as(&initializer) {
                return Ok(());
            }
            return Err(ModgraphError::DuplicateInitializer(id));
        }

        record.initializer = Some(initializer);
        record.pending = 0;
        record.resolving = true;
        let deps = record.dependencies.clone();

        let resolved = self.resolve_dependencies(&id, &deps);
        self.record_mut(&id)?.resolving = false;
        resolved?;

        let record = self.record(&id)?;
        debug!(module = %id, pending = record.pending, "initializer assigned");
        if record.ready_for_cascade() {
            self.invoke_and_complete(&id)?;
        }
        Ok(())
    }

    fn resolve_dependencies(&mut self, owner: &str, deps: &[ModuleId]) -> Result<()> {
        for dep in deps {
            let state = self.record(dep)?.state;
            match state {
                ModuleState::None => {
                    self.link_dependant(dep, owner)?;
                    self.record_mut(dep)?.state = ModuleState::Loading;
                    debug!(module = %dep, requested_by = %owner, "module none -> loading; invoking load hook");

                    let loader = Rc::clone(&self.loader);
                    if let Err(source) = loader.load_module(self, dep) {
                        let record = self.record_mut(dep)?;
                        if record.state != ModuleState::Done {
                            record.state = ModuleState::Error;
                        }
                        warn!(module = %dep, error = %source, "load hook failed");
                        return Err(ModgraphError::LoadFailure {
                            module: dep.clone(),
                            source,
                        });
                    }
                }
                ModuleState::Loading => {
                    self.link_dependant(dep, owner)?;
                }
                ModuleState::Done => {}
                ModuleState::Error => {
                    let record = self.record_mut(owner)?;
                    if !record.state.is_terminal() {
                        record.state = ModuleState::Error;
                    }
                    warn!(module = %owner, dependency = %dep, "dependency already failed");
                    return Err(ModgraphError::DependencyFailed {
                        module: owner.to_string(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn is_async(&self, handle: &ModuleHandle) -> bool {
        self.modules.get(handle.id()).is_some_and(|r| r.is_async)
    }

    /// Declare the module asynchronous. Only `false -> true` has an effect,
    /// and only while the module is not yet done.
    pub fn set_async(&mut self, handle: &ModuleHandle, value: bool) -> Result<()> {
        let record = self.record_mut(handle.id())?;
        if !value || record.is_async || record.state == ModuleState::Done {
            return Ok(());
        }
        record.is_async = true;
        debug!(module = %handle.id(), "module declared async");
        Ok(())
    }

    pub fn is_done(&self, handle: &ModuleHandle) -> bool {
        self.modules
            .get(handle.id())
            .is_some_and(|r| r.state == ModuleState::Done)
    }

    /// Signal completion of an asynchronous module.
    ///
    /// Setting `true` on a pending async module completes it and cascades to
    /// its dependants. `false` and repeated `true` are no-ops. Non-async and
    /// failed modules reject the call.
    pub fn set_done(&mut self, handle: &ModuleHandle, value: bool) -> Result<()> {
        let id = handle.id();
        let record = self.record(id)?;
        if !record.is_async {
            return Err(ModgraphError::InvalidDoneTransition {
                module: id.to_string(),
                reason: "module is not async".to_string(),
            });
        }
        if record.state == ModuleState::Error {
            return Err(ModgraphError::InvalidDoneTransition {
                module: id.to_string(),
                reason: "module already failed".to_string(),
            });
        }
        if !value || record.state == ModuleState::Done {
            return Ok(());
        }
        self.mark_done(id)
    }

    /// Seed `id` with a known export and complete it without an initializer.
    ///
    /// Meant for load hooks that can produce a module's value directly.
    pub fn provide(&mut self, id: &str, value: Export) -> Result<()> {
        self.ensure(id)?;
        let record = self.record(id)?;
        if record.initializer.is_some() {
            return Err(ModgraphError::InvalidUsage(format!(
                "module '{id}' has an initializer and cannot be provided"
            )));
        }
        match record.state {
            ModuleState::Done => return Ok(()),
            ModuleState::Error => {
                return Err(ModgraphError::InvalidDoneTransition {
                    module: id.to_string(),
                    reason: "module already failed".to_string(),
                });
            }
            ModuleState::None | ModuleState::Loading => {}
        }
        if !self.seed_value(id, value)? {
            warn!(module = %id, "module already has a value; provided value ignored");
        }
        self.mark_done(id)
    }

    /// Force a module into the error state, e.g. when the host learns that an
    /// in-flight load can never succeed. Completed modules are left alone.
    pub fn fail(&mut self, id: &str) -> Result<()> {
        self.ensure(id)?;
        let record = self.record_mut(id)?;
        if record.state == ModuleState::Done {
            return Err(ModgraphError::InvalidUsage(format!(
                "module '{id}' is already done"
            )));
        }
        record.state = ModuleState::Error;
        warn!(module = %id, "module marked as failed");
        Ok(())
    }
}

/// Check that `id` is usable as a module identifier: non-empty, no
/// surrounding whitespace, no control characters.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ModgraphError::TypeMismatch(
            "module identifier must not be empty".to_string(),
        ));
    }
    if id.trim() != id {
        return Err(ModgraphError::TypeMismatch(format!(
            "module identifier {id:?} has surrounding whitespace"
        )));
    }
    if id.chars().any(char::is_control) {
        return Err(ModgraphError::TypeMismatch(format!(
            "module identifier {id:?} contains control characters"
        )));
    }
    Ok(())
}
