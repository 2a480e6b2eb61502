// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{Manifest, RawManifest};
use crate::errors::{ModgraphError, Result};
use crate::registry::validate_id;

impl TryFrom<RawManifest> for Manifest {
    type Error = crate::errors::ModgraphError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        validate_manifest(&raw)?;
        Ok(Manifest::new_unchecked(raw.config, raw.module))
    }
}

/// Run every manifest check without consuming it.
pub fn validate_manifest(cfg: &RawManifest) -> Result<()> {
    ensure_has_modules(cfg)?;
    validate_root_module(cfg)?;
    validate_module_requires(cfg)?;
    validate_async_timers(cfg)?;
    if cfg.config.detect_cycles {
        validate_acyclic(cfg)?;
    }
    Ok(())
}

fn ensure_has_modules(cfg: &RawManifest) -> Result<()> {
    if cfg.module.is_empty() {
        return Err(ModgraphError::ConfigError(
            "manifest must contain at least one [module.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_root_module(cfg: &RawManifest) -> Result<()> {
    let root = &cfg.config.root_module;
    validate_id(root)
        .map_err(|e| ModgraphError::ConfigError(format!("[config].root_module: {e}")))?;

    if cfg.module.contains_key(root) {
        return Err(ModgraphError::ConfigError(format!(
            "module '{root}' collides with the root module name"
        )));
    }
    Ok(())
}

fn validate_module_requires(cfg: &RawManifest) -> Result<()> {
    for (name, module) in cfg.module.iter() {
        validate_id(name)
            .map_err(|e| ModgraphError::ConfigError(format!("[module.{name:?}]: {e}")))?;

        for dep in module.requires.iter() {
            validate_id(dep).map_err(|e| {
                ModgraphError::ConfigError(format!("module '{name}' `requires`: {e}"))
            })?;
            if dep == name {
                return Err(ModgraphError::ConfigError(format!(
                    "module '{}' cannot require itself",
                    name
                )));
            }
            if *dep == cfg.config.root_module {
                return Err(ModgraphError::ConfigError(format!(
                    "module '{}' cannot require the root module '{}'",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_async_timers(cfg: &RawManifest) -> Result<()> {
    for (name, module) in cfg.module.iter() {
        if module.complete_after_ms.is_some() && !module.is_async {
            return Err(ModgraphError::ConfigError(format!(
                "module '{}' sets `complete_after_ms` but is not async",
                name
            )));
        }
    }
    Ok(())
}

fn validate_acyclic(cfg: &RawManifest) -> Result<()> {
    // Edge direction: dependency -> dependant.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.module.keys() {
        graph.add_node(name.as_str());
    }

    for (name, module) in cfg.module.iter() {
        for dep in module.requires.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(ModgraphError::DagCycle(format!(
                "cycle detected in module graph involving module '{}'",
                node
            )))
        }
    }
}
