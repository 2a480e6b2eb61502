// src/registry/diagnostics.rs

//! Read-only views over the registry for tests, reports and debugging.

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::registry::core::Registry;
use crate::registry::export::{Export, ModuleId};
use crate::registry::record::ModuleState;

/// Point-in-time copy of one module record.
#[derive(Debug, Clone)]
pub struct ModuleSnapshot {
    pub id: ModuleId,
    pub state: ModuleState,
    pub is_async: bool,
    pub pending: usize,
    pub has_initializer: bool,
    pub value: Option<Export>,
    pub dependencies: Vec<ModuleId>,
    pub dependants: Vec<ModuleId>,
}

impl Registry {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    /// Module identifiers in creation order.
    pub fn module_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn state_of(&self, id: &str) -> Option<ModuleState> {
        self.modules.get(id).map(|r| r.state)
    }

    pub fn pending_count_of(&self, id: &str) -> Option<usize> {
        self.modules.get(id).map(|r| r.pending)
    }

    pub fn value_of(&self, id: &str) -> Option<Export> {
        self.modules.get(id).and_then(|r| r.value.clone())
    }

    pub fn dependencies_of(&self, id: &str) -> &[ModuleId] {
        self.modules
            .get(id)
            .map(|r| r.dependencies.as_slice())
            .unwrap_or(&[])
    }

    pub fn dependants_of(&self, id: &str) -> &[ModuleId] {
        self.modules
            .get(id)
            .map(|r| r.dependants.as_slice())
            .unwrap_or(&[])
    }

    pub fn snapshot(&self) -> Vec<ModuleSnapshot> {
        self.order
            .iter()
            .filter_map(|id| self.modules.get(id))
            .map(|r| ModuleSnapshot {
                id: r.id.clone(),
                state: r.state,
                is_async: r.is_async,
                pending: r.pending,
                has_initializer: r.initializer.is_some(),
                value: r.value.clone(),
                dependencies: r.dependencies.clone(),
                dependants: r.dependants.clone(),
            })
            .collect()
    }

    /// Modules whose initializer is assigned but which are not finished:
    /// either still waiting on dependencies or async and never signalled.
    ///
    /// Once no external completion is expected, anything listed here is
    /// deadlocked.
    pub fn stalled(&self) -> Vec<ModuleId> {
        self.order
            .iter()
            .filter_map(|id| self.modules.get(id))
            .filter(|r| {
                r.initializer.is_some() && !r.state.is_terminal() && !r.ready_for_cascade()
            })
            .map(|r| r.id.clone())
            .collect()
    }

    /// Modules that became ready but were never invoked because an aborted
    /// cascade dropped them from its queue. Nothing will run them later.
    pub fn abandoned(&self) -> Vec<ModuleId> {
        self.order
            .iter()
            .filter_map(|id| self.modules.get(id))
            .filter(|r| r.ready_for_cascade())
            .map(|r| r.id.clone())
            .collect()
    }

    /// Look for a cycle among declared dependencies.
    ///
    /// Returns the members of one strongly connected component with more than
    /// one module, in creation order. Scheduling is unaffected: a cycle found
    /// here simply never completes.
    pub fn find_cycle(&self) -> Option<Vec<ModuleId>> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for id in &self.order {
            graph.add_node(id.as_str());
        }
        for record in self.modules.values() {
            for dep in &record.dependencies {
                graph.add_edge(dep.as_str(), record.id.as_str(), ());
            }
        }

        let component = tarjan_scc(&graph).into_iter().find(|scc| scc.len() > 1)?;
        let members: Vec<ModuleId> = self
            .order
            .iter()
            .filter(|id| component.contains(&id.as_str()))
            .cloned()
            .collect();
        Some(members)
    }
}
