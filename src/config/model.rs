// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::registry::Export;
use crate::types::{CascadePolicy, DEFAULT_ROOT_MODULE, RegistryOptions};

/// Manifest as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// root_module = "Program"
/// cascade_failure = "continue"
///
/// [module.app]
/// requires = ["db", "log"]
/// value = "app-v1"
///
/// [module.db]
/// async = true
/// complete_after_ms = 20
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    /// Registry behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All modules from `[module.<name>]`, keyed by identifier.
    #[serde(default)]
    pub module: BTreeMap<String, ModuleSpec>,
}

/// A validated manifest. Build one with `Manifest::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub config: ConfigSection,
    pub module: BTreeMap<String, ModuleSpec>,
}

impl Manifest {
    pub(crate) fn new_unchecked(config: ConfigSection, module: BTreeMap<String, ModuleSpec>) -> Self {
        Self { config, module }
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions::from(&self.config)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Identifier of the module pre-created at startup.
    #[serde(default = "default_root_module")]
    pub root_module: String,

    /// `"continue"` (default) or `"abort"`.
    #[serde(default)]
    pub cascade_failure: CascadePolicy,

    /// Reject manifests whose `requires` edges form a cycle. Off by default:
    /// a cyclic manifest loads fine and its cycle simply never completes.
    #[serde(default)]
    pub detect_cycles: bool,
}

fn default_root_module() -> String {
    DEFAULT_ROOT_MODULE.to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            root_module: default_root_module(),
            cascade_failure: CascadePolicy::default(),
            detect_cycles: false,
        }
    }
}

impl From<&ConfigSection> for RegistryOptions {
    fn from(cfg: &ConfigSection) -> Self {
        Self {
            root_module: cfg.root_module.clone(),
            cascade_failure: cfg.cascade_failure,
        }
    }
}

/// `[module.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleSpec {
    /// Modules this one needs, in the order its initializer receives them.
    #[serde(default)]
    pub requires: Vec<String>,

    /// Completion is signalled separately from the initializer returning.
    #[serde(default, rename = "async")]
    pub is_async: bool,

    /// For async modules: have the runtime signal `done` this many
    /// milliseconds after startup.
    #[serde(default)]
    pub complete_after_ms: Option<u64>,

    /// Export produced by the initializer. If absent the module exports its
    /// own handle.
    #[serde(default)]
    pub value: Option<ModuleValue>,

    /// Make the initializer fail (useful for exercising error paths).
    #[serde(default)]
    pub fail: bool,
}

/// Scalar export value declared in a manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModuleValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ModuleValue {
    pub fn to_export(&self) -> Export {
        match self {
            ModuleValue::Bool(b) => Export::value(*b),
            ModuleValue::Integer(n) => Export::value(*n),
            ModuleValue::Float(x) => Export::value(*x),
            ModuleValue::Text(s) => Export::value(s.clone()),
        }
    }
}
