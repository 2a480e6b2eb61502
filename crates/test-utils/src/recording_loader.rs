use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use modgraph::loader::ModuleLoader;
use modgraph::registry::Registry;

/// A loader that:
/// - records every identifier it is asked to load, in order
/// - fails for identifiers registered with [`RecordingLoader::fail_on`]
/// - otherwise defines nothing, leaving the module loading
#[derive(Debug, Default)]
pub struct RecordingLoader {
    requested: RefCell<Vec<String>>,
    failing: RefCell<HashSet<String>>,
}

impl RecordingLoader {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn fail_on(&self, id: &str) {
        self.failing.borrow_mut().insert(id.to_string());
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl ModuleLoader for RecordingLoader {
    fn load_module(&self, _registry: &mut Registry, id: &str) -> anyhow::Result<()> {
        self.requested.borrow_mut().push(id.to_string());
        if self.failing.borrow().contains(id) {
            anyhow::bail!("no source for module '{id}'");
        }
        Ok(())
    }
}
