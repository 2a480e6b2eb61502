// tests/registry_protocol.rs

mod common;
use crate::common::{init_tracing, recording, recording_value, run_log};

use std::error::Error;

use modgraph::errors::ModgraphError;
use modgraph::registry::{Export, Initializer, ModuleState, Registry};
use modgraph::types::{CascadePolicy, RegistryOptions};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn root_module_exists_at_startup() {
    let reg = Registry::new();
    let program = reg.program();

    assert_eq!(program.id(), "Program");
    assert_eq!(reg.state_of("Program"), Some(ModuleState::Loading));
    assert!(reg.dependencies_of("Program").is_empty());
    assert_eq!(reg.len(), 1);
}

#[test]
fn root_module_name_comes_from_options() -> TestResult {
    let reg = Registry::with_options(RegistryOptions {
        root_module: "Main".to_string(),
        cascade_failure: CascadePolicy::Continue,
    })?;
    assert_eq!(reg.program().id(), "Main");
    assert!(!reg.contains("Program"));

    let bad = Registry::with_options(RegistryOptions {
        root_module: String::new(),
        cascade_failure: CascadePolicy::Continue,
    });
    assert!(matches!(bad, Err(ModgraphError::TypeMismatch(_))));
    Ok(())
}

#[test]
fn create_returns_the_same_handle_until_a_value_is_exported() -> TestResult {
    init_tracing();
    let mut reg = Registry::new();

    let first = reg.create("X")?;
    let second = reg.create("X")?;
    assert!(first.is_handle());
    assert_eq!(first, second);

    let handle = first.as_handle().cloned().expect("handle");
    reg.set_initializer(&handle, Initializer::new(|_, _| Ok(Some(Export::value(7i64)))))?;

    let third = reg.create("X")?;
    let fourth = reg.create("X")?;
    assert_eq!(third.downcast_ref::<i64>(), Some(&7));
    assert!(third.same_as(&fourth));
    assert!(third.same_as(&reg.value_of("X").expect("value")));

    let err = reg.define("X").unwrap_err();
    assert!(matches!(err, ModgraphError::InvalidUsage(_)));
    Ok(())
}

#[test]
fn seeded_value_short_circuits_creation() -> TestResult {
    let mut reg = Registry::new();

    assert!(reg.seed_value("config", Export::value(String::from("prod")))?);
    assert!(!reg.seed_value("config", Export::value(String::from("dev")))?);

    let created = reg.create("config")?;
    assert_eq!(created.downcast_ref::<String>().map(String::as_str), Some("prod"));
    assert_eq!(reg.state_of("config"), Some(ModuleState::None));
    Ok(())
}

#[test]
fn ensure_is_idempotent() -> TestResult {
    let mut reg = Registry::new();
    reg.ensure("A")?;
    reg.seed_value("A", Export::value(1i64))?;
    reg.ensure("A")?;

    assert_eq!(reg.state_of("A"), Some(ModuleState::None));
    assert_eq!(
        reg.value_of("A").and_then(|v| v.downcast_ref::<i64>().copied()),
        Some(1)
    );
    assert_eq!(reg.module_ids().collect::<Vec<_>>(), vec!["Program", "A"]);
    Ok(())
}

#[test]
fn link_dependant_counts_each_pair_once() -> TestResult {
    let mut reg = Registry::new();
    let log = run_log();
    let a = reg.define("A")?;
    reg.define("B")?;
    reg.require(&a, ["B"])?;
    reg.set_initializer(&a, recording(&log, "A"))?;

    assert_eq!(reg.pending_count_of("A"), Some(1));
    assert!(!reg.link_dependant("B", "A")?);
    assert_eq!(reg.pending_count_of("A"), Some(1));
    assert_eq!(reg.dependants_of("B"), ["A".to_string()]);

    let err = reg.link_dependency("A", "A").unwrap_err();
    assert!(matches!(err, ModgraphError::SelfDependency(id) if id == "A"));
    Ok(())
}

#[test]
fn early_link_dependant_cannot_release_owner_before_dependency() -> TestResult {
    init_tracing();
    let mut reg = Registry::new();
    let log = run_log();
    let a = reg.define("A")?;
    let b = reg.define("B")?;
    reg.require(&a, ["B"])?;

    let err = reg.link_dependant("B", "A").unwrap_err();
    assert!(matches!(err, ModgraphError::InvalidUsage(_)));
    assert!(reg.dependants_of("B").is_empty());
    assert_eq!(reg.pending_count_of("A"), Some(0));

    reg.set_initializer(&a, recording(&log, "A"))?;
    assert_eq!(reg.state_of("B"), Some(ModuleState::Loading));
    assert_eq!(reg.pending_count_of("A"), Some(1));
    assert!(log.borrow().is_empty());

    reg.set_initializer(&b, recording(&log, "B"))?;
    assert_eq!(*log.borrow(), vec!["B", "A"]);
    Ok(())
}

#[test]
fn link_dependant_rejects_undeclared_or_finished_dependencies() -> TestResult {
    let mut reg = Registry::new();
    let log = run_log();
    let done = reg.define("done")?;
    reg.set_initializer(&done, recording(&log, "done"))?;

    let a = reg.define("A")?;
    reg.require(&a, ["done", "later"])?;
    reg.set_initializer(&a, recording(&log, "A"))?;
    reg.ensure("other")?;

    let err = reg.link_dependant("other", "A").unwrap_err();
    assert!(matches!(err, ModgraphError::InvalidUsage(_)));
    let err = reg.link_dependant("done", "A").unwrap_err();
    assert!(matches!(err, ModgraphError::InvalidUsage(_)));

    assert_eq!(reg.pending_count_of("A"), Some(1));
    assert!(reg.dependants_of("done").is_empty());
    assert!(reg.dependants_of("other").is_empty());
    Ok(())
}

#[test]
fn require_accumulates_in_call_order() -> TestResult {
    let mut reg = Registry::new();
    let a = reg.define("A")?;

    let chained = reg.require(&a, ["B", "C"])?;
    assert_eq!(chained, a);
    reg.require(&a, ["D"])?;

    assert_eq!(reg.dependencies_of("A"), ["B", "C", "D"]);
    for dep in ["B", "C", "D"] {
        assert_eq!(reg.state_of(dep), Some(ModuleState::None));
    }
    Ok(())
}

#[test]
fn require_rejects_bad_arguments_without_side_effects() -> TestResult {
    let mut reg = Registry::new();
    let a = reg.define("A")?;

    let err = reg.require(&a, Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, ModgraphError::InvalidUsage(_)));

    let err = reg.require(&a, ["B", "A"]).unwrap_err();
    assert!(matches!(err, ModgraphError::SelfDependency(_)));

    let err = reg.require(&a, ["B", ""]).unwrap_err();
    assert!(matches!(err, ModgraphError::TypeMismatch(_)));

    let err = reg.require(&a, [" B"]).unwrap_err();
    assert!(matches!(err, ModgraphError::TypeMismatch(_)));

    assert!(reg.dependencies_of("A").is_empty());
    assert!(!reg.contains("B"));
    Ok(())
}

#[test]
fn dependencies_are_frozen_once_initializer_is_assigned() -> TestResult {
    let mut reg = Registry::new();
    let log = run_log();
    let a = reg.define("A")?;
    reg.require(&a, ["B"])?;
    reg.set_initializer(&a, recording(&log, "A"))?;

    let err = reg.require(&a, ["C"]).unwrap_err();
    assert!(matches!(err, ModgraphError::DependenciesFrozen(id) if id == "A"));
    assert_eq!(reg.dependencies_of("A"), ["B"]);
    Ok(())
}

#[test]
fn initializer_is_write_once() -> TestResult {
    init_tracing();
    let mut reg = Registry::new();
    let log = run_log();

    let x = reg.define("X")?;
    let init = recording(&log, "X");
    reg.set_initializer(&x, init.clone())?;
    reg.set_initializer(&x, init.clone())?;
    assert_eq!(*log.borrow(), vec!["X"]);

    let err = reg.set_initializer(&x, recording(&log, "other")).unwrap_err();
    assert!(matches!(err, ModgraphError::DuplicateInitializer(id) if id == "X"));

    let current = reg.initializer(&x).expect("initializer");
    assert!(current.same_as(&init));
    assert_eq!(*log.borrow(), vec!["X"]);
    Ok(())
}

#[test]
fn done_requires_async_declaration() -> TestResult {
    let mut reg = Registry::new();
    let log = run_log();
    let m = reg.define("M")?;

    let err = reg.set_done(&m, true).unwrap_err();
    assert!(matches!(err, ModgraphError::InvalidDoneTransition { .. }));

    reg.set_async(&m, false)?;
    assert!(!reg.is_async(&m));
    reg.set_async(&m, true)?;
    assert!(reg.is_async(&m));

    reg.set_initializer(&m, recording(&log, "M"))?;
    assert_eq!(reg.state_of("M"), Some(ModuleState::Loading));

    reg.set_done(&m, false)?;
    assert!(!reg.is_done(&m));

    reg.set_done(&m, true)?;
    assert!(reg.is_done(&m));
    reg.set_done(&m, true)?;
    reg.set_done(&m, false)?;
    assert!(reg.is_done(&m));
    assert!(reg.is_async(&m));
    Ok(())
}

#[test]
fn async_cannot_be_declared_after_completion() -> TestResult {
    let mut reg = Registry::new();
    let log = run_log();
    let m = reg.define("M")?;
    reg.set_initializer(&m, recording(&log, "M"))?;
    assert!(reg.is_done(&m));

    reg.set_async(&m, true)?;
    assert!(!reg.is_async(&m));
    assert!(reg.set_done(&m, true).is_err());
    Ok(())
}

#[test]
fn failed_module_rejects_done() -> TestResult {
    let mut reg = Registry::new();
    let m = reg.define("M")?;
    reg.set_async(&m, true)?;

    let err = reg
        .set_initializer(&m, crate::common::failing("boom"))
        .unwrap_err();
    assert_eq!(err.failed_module().map(String::as_str), Some("M"));
    assert_eq!(reg.state_of("M"), Some(ModuleState::Error));

    let err = reg.set_done(&m, true).unwrap_err();
    assert!(matches!(err, ModgraphError::InvalidDoneTransition { .. }));
    assert_eq!(reg.state_of("M"), Some(ModuleState::Error));
    Ok(())
}

#[test]
fn initializer_result_replaces_default_export_once() -> TestResult {
    let mut reg = Registry::new();
    let log = run_log();
    let m = reg.define("M")?;
    reg.set_async(&m, true)?;
    reg.set_initializer(&m, recording_value(&log, "M", 3i64))?;

    assert_eq!(
        reg.value_of("M").and_then(|v| v.downcast_ref::<i64>().copied()),
        Some(3)
    );

    let seeded = reg.seed_value("M", Export::value(4i64))?;
    assert!(!seeded);
    assert_eq!(
        reg.value_of("M").and_then(|v| v.downcast_ref::<i64>().copied()),
        Some(3)
    );
    Ok(())
}

#[test]
fn initializer_receives_handle_and_default_export() -> TestResult {
    let mut reg = Registry::new();
    let m = reg.define("M")?;
    reg.set_initializer(
        &m,
        Initializer::new(|ctx, deps| {
            assert!(deps.is_empty());
            assert_eq!(ctx.handle().id(), "M");
            assert_eq!(ctx.this().as_handle().map(|h| h.id()), Some("M"));
            Ok(None)
        }),
    )?;

    let value = reg.value_of("M").expect("value");
    assert_eq!(value.as_handle(), Some(&m));
    Ok(())
}

#[test]
fn unknown_handles_are_invalid_usage() -> TestResult {
    let mut first = Registry::new();
    let mut second = Registry::new();
    let a = first.define("A")?;

    assert!(matches!(
        second.require(&a, ["B"]),
        Err(ModgraphError::InvalidUsage(_))
    ));
    assert!(matches!(
        second.set_initializer(&a, Initializer::noop()),
        Err(ModgraphError::InvalidUsage(_))
    ));
    assert!(!second.is_done(&a));
    Ok(())
}

#[test]
fn dependency_failure_leaves_completed_module_done() -> TestResult {
    init_tracing();
    let mut reg = Registry::new();
    let c = reg.define("C")?;
    reg.require(&c, ["G"])?;
    reg.set_async(&c, true)?;
    reg.set_done(&c, true)?;
    assert_eq!(reg.state_of("C"), Some(ModuleState::Done));

    reg.fail("G")?;
    let err = reg.set_initializer(&c, Initializer::noop()).unwrap_err();

    assert!(matches!(
        err,
        ModgraphError::DependencyFailed { ref module, ref dependency }
            if module == "C" && dependency == "G"
    ));
    assert_eq!(reg.state_of("C"), Some(ModuleState::Done));
    assert!(reg.is_done(&c));
    Ok(())
}
