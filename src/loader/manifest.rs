// src/loader/manifest.rs

//! Load hook backed by a manifest.

use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{anyhow, bail};
use tracing::debug;

use crate::config::model::{Manifest, ModuleSpec};
use crate::errors::Result;
use crate::loader::ModuleLoader;
use crate::registry::{Initializer, ModuleHandle, Registry};

/// Defines requested modules from their `[module.<name>]` sections.
///
/// Undeclared identifiers fail to load.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    modules: Rc<BTreeMap<String, ModuleSpec>>,
}

impl ManifestLoader {
    pub fn new(manifest: &Manifest) -> Self {
        Self {
            modules: Rc::new(manifest.module.clone()),
        }
    }

    pub fn spec(&self, id: &str) -> Option<&ModuleSpec> {
        self.modules.get(id)
    }
}

impl ModuleLoader for ManifestLoader {
    fn load_module(&self, registry: &mut Registry, id: &str) -> anyhow::Result<()> {
        let spec = self
            .modules
            .get(id)
            .ok_or_else(|| anyhow!("module '{id}' is not declared in the manifest"))?;
        debug!(module = %id, requires = ?spec.requires, "defining module from manifest");
        define_from_spec(registry, id, spec)?;
        Ok(())
    }
}

/// Create `id`, declare its requires and async flag, and assign an initializer
/// that produces the configured value (or fails, if `fail = true`).
pub fn define_from_spec(registry: &mut Registry, id: &str, spec: &ModuleSpec) -> Result<ModuleHandle> {
    let handle = registry.define(id)?;
    if !spec.requires.is_empty() {
        registry.require(&handle, &spec.requires)?;
    }
    registry.set_async(&handle, spec.is_async)?;

    let value = spec.value.clone();
    let fail = spec.fail;
    let name = id.to_string();
    let initializer = Initializer::new(move |_ctx, deps| {
        if fail {
            bail!("module '{name}' is configured to fail");
        }
        debug!(module = %name, deps = deps.len(), "manifest initializer ran");
        Ok(value.as_ref().map(|v| v.to_export()))
    });

    registry.set_initializer(&handle, initializer)?;
    Ok(handle)
}
