// src/engine/session.rs

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::model::Manifest;
use crate::errors::Result;
use crate::loader::ManifestLoader;
use crate::registry::{Initializer, ModuleId, ModuleSnapshot, ModuleState, Registry};

/// A registry wired to a manifest loader.
///
/// The session has no channels and does no IO; it can be driven entirely
/// from tests.
#[derive(Debug)]
pub struct Session {
    registry: Registry,
    loader: Rc<ManifestLoader>,
}

impl Session {
    pub fn new(manifest: &Manifest) -> Result<Self> {
        let loader = Rc::new(ManifestLoader::new(manifest));
        let registry = Registry::with_options(manifest.registry_options())?
            .with_loader(loader.clone());
        Ok(Self { registry, loader })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Make the root module require `entries` and give it an initializer,
    /// which pulls every entry (and transitively its requires) through the
    /// manifest loader.
    pub fn attach_entries(&mut self, entries: &[String]) -> Result<()> {
        let program = self.registry.program();
        if entries.is_empty() {
            warn!(root = %program, "no entry modules; nothing to load");
            return Ok(());
        }

        info!(root = %program, ?entries, "attaching entry modules");
        self.registry.require(&program, entries)?;

        let root = program.id().to_string();
        self.registry.set_initializer(
            &program,
            Initializer::new(move |_ctx, deps| {
                info!(root = %root, entries = deps.len(), "all entry modules resolved");
                Ok(None)
            }),
        )
    }

    /// Signal `done` for an async module.
    pub fn complete(&mut self, module: &str) -> Result<()> {
        let handle = self.registry.handle(module)?;
        debug!(module = %module, "signalling completion");
        self.registry.set_done(&handle, true)
    }

    /// Async modules that were loaded, are still outstanding and have a
    /// `complete_after_ms`, sorted by delay.
    pub fn completion_timers(&self) -> Vec<(ModuleId, Duration)> {
        let mut timers: Vec<(ModuleId, Duration)> = self
            .registry
            .snapshot()
            .into_iter()
            .filter(|m| m.is_async && !m.state.is_terminal())
            .filter_map(|m| {
                let ms = self.loader.spec(&m.id)?.complete_after_ms?;
                Some((m.id, Duration::from_millis(ms)))
            })
            .collect();
        timers.sort_by_key(|(_, delay)| *delay);
        timers
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            root: self.registry.program().id().to_string(),
            modules: self.registry.snapshot(),
            stalled: self.registry.stalled(),
            abandoned: self.registry.abandoned(),
            cycle: self.registry.find_cycle(),
        }
    }
}

/// Final state of a session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub root: ModuleId,
    pub modules: Vec<ModuleSnapshot>,
    pub stalled: Vec<ModuleId>,
    /// Ready modules an aborted cascade never invoked.
    pub abandoned: Vec<ModuleId>,
    pub cycle: Option<Vec<ModuleId>>,
}

impl SessionReport {
    /// True if the root module finished and nothing is left waiting.
    pub fn is_complete(&self) -> bool {
        self.stalled.is_empty()
            && self.abandoned.is_empty()
            && self
                .modules
                .iter()
                .any(|m| m.id == self.root && m.state == ModuleState::Done)
    }

    pub fn failed(&self) -> Vec<&str> {
        self.modules
            .iter()
            .filter(|m| m.state == ModuleState::Error)
            .map(|m| m.id.as_str())
            .collect()
    }
}
