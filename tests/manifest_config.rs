// tests/manifest_config.rs

use std::io::Write;
use tempfile::NamedTempFile;
use modgraph::config::{ManifestGraph, ModuleValue, load_and_validate, parse_manifest};
use modgraph::errors::ModgraphError;
use modgraph::types::CascadePolicy;

fn write_manifest(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_full_manifest_loads_with_defaults() {
    let file = write_manifest(
        r#"
[module.app]
requires = ["db", "log"]
value = "app-v1"

[module.db]
async = true
complete_after_ms = 20

[module.log]
value = 3
"#,
    );

    let manifest = load_and_validate(file.path()).expect("manifest should be valid");

    assert_eq!(manifest.config.root_module, "Program");
    assert_eq!(manifest.config.cascade_failure, CascadePolicy::Continue);
    assert!(!manifest.config.detect_cycles);

    let app = &manifest.module["app"];
    assert_eq!(app.requires, vec!["db", "log"]);
    assert_eq!(app.value, Some(ModuleValue::Text("app-v1".to_string())));
    assert!(!app.is_async);

    let db = &manifest.module["db"];
    assert!(db.is_async);
    assert_eq!(db.complete_after_ms, Some(20));

    assert_eq!(manifest.module["log"].value, Some(ModuleValue::Integer(3)));

    let graph = ManifestGraph::from_manifest(&manifest);
    assert_eq!(graph.entries(), vec!["app".to_string()]);
    assert_eq!(graph.required_by("db"), ["app"]);
    assert!(graph.undeclared_requires().is_empty());
}

#[test]
fn test_config_section_is_parsed() {
    let file = write_manifest(
        r#"
[config]
root_module = "Main"
cascade_failure = "abort"
detect_cycles = true

[module.a]
"#,
    );

    let manifest = load_and_validate(file.path()).expect("manifest should be valid");
    assert_eq!(manifest.config.root_module, "Main");
    assert_eq!(manifest.config.cascade_failure, CascadePolicy::Abort);
    assert_eq!(manifest.registry_options().root_module, "Main");
}

#[test]
fn test_invalid_cascade_policy_is_a_toml_error() {
    let result = parse_manifest(
        r#"
[config]
cascade_failure = "sometimes"

[module.a]
"#,
    );
    assert!(matches!(result, Err(ModgraphError::TomlError(_))));
}

#[test]
fn test_empty_manifest_is_rejected() {
    let file = write_manifest("[config]\n");

    match load_and_validate(file.path()) {
        Err(ModgraphError::ConfigError(msg)) => assert!(msg.contains("at least one")),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_self_require_returns_config_error() {
    let file = write_manifest(
        r#"
[module.A]
requires = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(ModgraphError::ConfigError(msg)) => {
            assert!(msg.contains("cannot require itself"));
            assert!(msg.contains("A"));
        }
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_timer_on_sync_module_returns_config_error() {
    let file = write_manifest(
        r#"
[module.A]
complete_after_ms = 5
"#,
    );

    match load_and_validate(file.path()) {
        Err(ModgraphError::ConfigError(msg)) => assert!(msg.contains("not async")),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_root_module_collision_returns_config_error() {
    let file = write_manifest(
        r#"
[module.Program]
"#,
    );

    match load_and_validate(file.path()) {
        Err(ModgraphError::ConfigError(msg)) => assert!(msg.contains("root module")),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_cycle_is_accepted_unless_detection_is_enabled() {
    let cyclic = r#"
[module.A]
requires = ["B"]

[module.B]
requires = ["A"]
"#;

    let file = write_manifest(cyclic);
    let manifest = load_and_validate(file.path()).expect("cycles are allowed by default");
    assert!(ManifestGraph::from_manifest(&manifest).entries().is_empty());

    let strict = format!("[config]\ndetect_cycles = true\n{cyclic}");
    let file = write_manifest(&strict);
    match load_and_validate(file.path()) {
        Err(ModgraphError::DagCycle(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains("A") || msg.contains("B"));
        }
        other => panic!("Expected DagCycle error, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_requires_are_allowed_and_reported() {
    let file = write_manifest(
        r#"
[module.A]
requires = ["NonExistent"]
"#,
    );

    let manifest = load_and_validate(file.path()).expect("unknown requires load lazily");
    let graph = ManifestGraph::from_manifest(&manifest);
    assert_eq!(
        graph.undeclared_requires(),
        vec![("A".to_string(), "NonExistent".to_string())]
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let result = load_and_validate("/definitely/not/here/Modgraph.toml");
    assert!(matches!(result, Err(ModgraphError::IoError(_))));
}
