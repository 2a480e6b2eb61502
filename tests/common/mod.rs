#![allow(dead_code)]

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use modgraph::registry::{Export, Initializer};

pub use modgraph_test_utils::builders;
pub use modgraph_test_utils::{init_tracing, with_timeout};
pub use modgraph_test_utils::recording_loader::RecordingLoader;

/// Shared, ordered record of which initializers ran.
pub type RunLog = Rc<RefCell<Vec<String>>>;

pub fn run_log() -> RunLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Initializer that appends `name` to `log` and keeps the default export.
pub fn recording(log: &RunLog, name: &str) -> Initializer {
    let log = Rc::clone(log);
    let name = name.to_string();
    Initializer::new(move |_, _| {
        log.borrow_mut().push(name.clone());
        Ok(None)
    })
}

/// Initializer that appends `name` to `log` and exports `value`.
pub fn recording_value<T: Any + Clone>(log: &RunLog, name: &str, value: T) -> Initializer {
    let log = Rc::clone(log);
    let name = name.to_string();
    Initializer::new(move |_, _| {
        log.borrow_mut().push(name.clone());
        Ok(Some(Export::value(value.clone())))
    })
}

/// Initializer that always fails.
pub fn failing(message: &str) -> Initializer {
    let message = message.to_string();
    Initializer::new(move |_, _| Err(anyhow::anyhow!("{message}")))
}
