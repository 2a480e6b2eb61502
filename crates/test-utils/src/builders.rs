#![allow(dead_code)]

use std::collections::BTreeMap;
use modgraph::config::{ConfigSection, Manifest, ModuleSpec, ModuleValue, RawManifest};
use modgraph::types::CascadePolicy;

/// Builder for `Manifest` to simplify test setup.
pub struct ManifestBuilder {
    manifest: RawManifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            manifest: RawManifest {
                config: ConfigSection::default(),
                module: BTreeMap::new(),
            },
        }
    }

    pub fn with_module(mut self, name: &str, module: ModuleSpec) -> Self {
        self.manifest.module.insert(name.to_string(), module);
        self
    }

    pub fn root_module(mut self, name: &str) -> Self {
        self.manifest.config.root_module = name.to_string();
        self
    }

    pub fn cascade_failure(mut self, policy: CascadePolicy) -> Self {
        self.manifest.config.cascade_failure = policy;
        self
    }

    pub fn detect_cycles(mut self, val: bool) -> Self {
        self.manifest.config.detect_cycles = val;
        self
    }

    pub fn build_raw(self) -> RawManifest {
        self.manifest
    }

    pub fn build(self) -> Manifest {
        Manifest::try_from(self.manifest).expect("Failed to build valid manifest from builder")
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ModuleSpec`.
pub struct ModuleSpecBuilder {
    module: ModuleSpec,
}

impl ModuleSpecBuilder {
    pub fn new() -> Self {
        Self {
            module: ModuleSpec::default(),
        }
    }

    pub fn requires(mut self, dep: &str) -> Self {
        self.module.requires.push(dep.to_string());
        self
    }

    pub fn is_async(mut self, val: bool) -> Self {
        self.module.is_async = val;
        self
    }

    pub fn complete_after_ms(mut self, ms: u64) -> Self {
        self.module.complete_after_ms = Some(ms);
        self
    }

    pub fn value(mut self, value: ModuleValue) -> Self {
        self.module.value = Some(value);
        self
    }

    pub fn text(self, value: &str) -> Self {
        self.value(ModuleValue::Text(value.to_string()))
    }

    pub fn fail(mut self, val: bool) -> Self {
        self.module.fail = val;
        self
    }

    pub fn build(self) -> ModuleSpec {
        self.module
    }
}

impl Default for ModuleSpecBuilder {
    fn default() -> Self {
        Self::new()
    }
}
