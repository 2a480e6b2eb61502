// src/config/graph.rs

use std::collections::BTreeMap;

use crate::config::model::Manifest;

/// Immediate requires and required-by lists of one declared module.
#[derive(Debug, Clone)]
struct GraphNode {
    requires: Vec<String>,
    required_by: Vec<String>,
}

/// Adjacency view of the modules a manifest declares, keyed by identifier.
///
/// Only declared modules are nodes; a `requires` entry naming an undeclared
/// module is kept in the owner's list but has no node of its own.
#[derive(Debug, Clone)]
pub struct ManifestGraph {
    nodes: BTreeMap<String, GraphNode>,
}

impl ManifestGraph {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut nodes: BTreeMap<String, GraphNode> = manifest
            .module
            .iter()
            .map(|(name, spec)| {
                (
                    name.clone(),
                    GraphNode {
                        requires: spec.requires.clone(),
                        required_by: Vec::new(),
                    },
                )
            })
            .collect();

        for (name, spec) in manifest.module.iter() {
            for dep in spec.requires.iter() {
                if let Some(node) = nodes.get_mut(dep) {
                    if !node.required_by.contains(name) {
                        node.required_by.push(name.clone());
                    }
                }
            }
        }

        Self { nodes }
    }

    /// All declared module names, sorted.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn requires_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.requires.as_slice())
            .unwrap_or(&[])
    }

    pub fn required_by(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.required_by.as_slice())
            .unwrap_or(&[])
    }

    /// Declared modules nothing else requires: the natural entry points.
    pub fn entries(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.required_by.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Requires that name no declared module.
    pub fn undeclared_requires(&self) -> Vec<(String, String)> {
        let mut missing = Vec::new();
        for (name, node) in self.nodes.iter() {
            for dep in node.requires.iter() {
                if !self.nodes.contains_key(dep) {
                    missing.push((name.clone(), dep.clone()));
                }
            }
        }
        missing
    }
}
