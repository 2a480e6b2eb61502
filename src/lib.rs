// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod loader;
pub mod logging;
pub mod registry;
pub mod types;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::{Manifest, ManifestGraph};
use crate::engine::{Runtime, RuntimeEvent, Session, SessionReport, spawn_completion_timers};

pub use crate::errors::ModgraphError;
pub use crate::registry::{Export, Initializer, ModuleContext, ModuleHandle, ModuleState, Registry};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading
/// - session (registry + manifest loader) and entry attachment
/// - manual and timer-driven completion of async modules
/// - Ctrl-C handling
/// - the final report
pub async fn run(args: CliArgs) -> Result<()> {
    let manifest = load_and_validate(&args.config)?;

    if args.dry_run {
        print_dry_run(&manifest);
        return Ok(());
    }

    let graph = ManifestGraph::from_manifest(&manifest);
    let entries = if args.entries.is_empty() {
        graph.entries()
    } else {
        args.entries.clone()
    };
    info!(?entries, "entry modules");

    let mut session = Session::new(&manifest)?;
    let outcome = drive(&mut session, &entries, &args.complete).await;

    let report = session.report();
    print_report(&report);
    outcome?;

    if !report.is_complete() {
        warn!(
            stalled = ?report.stalled,
            abandoned = ?report.abandoned,
            "some modules never completed"
        );
        if args.strict {
            bail!(
                "{} module(s) left waiting, {} abandoned: {:?} {:?}",
                report.stalled.len(),
                report.abandoned.len(),
                report.stalled,
                report.abandoned
            );
        }
    }
    Ok(())
}

async fn drive(session: &mut Session, entries: &[String], complete: &[String]) -> Result<()> {
    session.attach_entries(entries)?;

    for module in complete {
        session.complete(module)?;
    }

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let outstanding = spawn_completion_timers(session.completion_timers(), &rt_tx);

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let runtime = Runtime::new(session, rt_rx, outstanding);
    runtime.run().await?;
    Ok(())
}

/// Print every module's final state, then stalled modules and any cycle.
fn print_report(report: &SessionReport) {
    println!("modules ({}):", report.modules.len());
    for m in report.modules.iter() {
        let value = m
            .value
            .as_ref()
            .map(|v| v.describe())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<20} {:<8} async={:<5} pending={} value={}",
            m.id, m.state, m.is_async, m.pending, value
        );
    }

    if !report.stalled.is_empty() {
        println!();
        println!("waiting: {}", report.stalled.join(", "));
    }
    if !report.abandoned.is_empty() {
        println!("abandoned: {}", report.abandoned.join(", "));
    }
    if let Some(ref cycle) = report.cycle {
        println!("cycle: {}", cycle.join(" -> "));
    }
    let failed = report.failed();
    if !failed.is_empty() {
        println!("failed: {}", failed.join(", "));
    }
}

/// Simple dry-run output: print config, modules and their requires.
fn print_dry_run(manifest: &Manifest) {
    let graph = ManifestGraph::from_manifest(manifest);

    println!("modgraph dry-run");
    println!("  config.root_module = {}", manifest.config.root_module);
    println!("  config.cascade_failure = {:?}", manifest.config.cascade_failure);
    println!("  config.detect_cycles = {}", manifest.config.detect_cycles);
    println!();

    println!("modules ({}):", manifest.module.len());
    for (name, spec) in manifest.module.iter() {
        println!("  - {name}");
        if !spec.requires.is_empty() {
            println!("      requires: {:?}", spec.requires);
        }
        let required_by = graph.required_by(name);
        if !required_by.is_empty() {
            println!("      required_by: {:?}", required_by);
        }
        if spec.is_async {
            println!("      async: true");
        }
        if let Some(ms) = spec.complete_after_ms {
            println!("      complete_after_ms: {ms}");
        }
        if let Some(ref value) = spec.value {
            println!("      value: {}", value.to_export().describe());
        }
        if spec.fail {
            println!("      fail: true");
        }
    }

    println!();
    println!("entries: {:?}", graph.entries());
    for (owner, dep) in graph.undeclared_requires() {
        println!("  warning: '{owner}' requires undeclared module '{dep}'");
    }

    debug!("dry-run complete (nothing executed)");
}
