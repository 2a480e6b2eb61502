// src/registry/cascade.rs

//! Initializer invocation and the completion cascade.
//!
//! Completing a module decrements the pending counter of each of its
//! dependants, in registration order. Dependants whose counter reaches zero
//! go on a FIFO work queue and are invoked one by one; those that complete
//! synchronously feed their own dependants into the same queue, so readiness
//! spreads breadth-first without recursion.

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};

use crate::errors::{ModgraphError, Result};
use crate::registry::core::Registry;
use crate::registry::export::{Export, ModuleHandle, ModuleId};
use crate::registry::initializer::ModuleContext;
use crate::registry::record::ModuleState;
use crate::types::CascadePolicy;

impl Registry {
    /// Run `id`'s initializer and, if that completed it, cascade.
    pub(super) fn invoke_and_complete(&mut self, id: &str) -> Result<()> {
        if self.run_initializer(id)? {
            self.mark_done(id)?;
        }
        Ok(())
    }

    /// Mark `id` as done and drain the resulting cascade.
    ///
    /// With [`CascadePolicy::Continue`] every ready dependant is invoked even if
    /// a sibling fails; the first failure is returned at the end.
    pub(super) fn mark_done(&mut self, id: &str) -> Result<()> {
        let mut queue = VecDeque::new();
        self.complete_record(id, &mut queue)?;

        let policy = self.options.cascade_failure;
        let mut first_failure: Option<ModgraphError> = None;

        while let Some(next) = queue.pop_front() {
            let ready = self.record(&next)?.ready_for_cascade();
            if !ready {
                trace!(module = %next, "no longer ready; skipping");
                continue;
            }

            match self.run_initializer(&next) {
                Ok(true) => self.complete_record(&next, &mut queue)?,
                Ok(false) => {}
                Err(err) => match policy {
                    CascadePolicy::Abort => {
                        warn!(
                            module = %next,
                            skipped = queue.len(),
                            "dependant failed; aborting cascade"
                        );
                        return Err(err);
                    }
                    CascadePolicy::Continue => {
                        if first_failure.is_none() {
                            first_failure = Some(err);
                        } else {
                            warn!(module = %next, error = %err, "additional failure during cascade");
                        }
                    }
                },
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Transition `id` to done and queue every dependant whose counter drains.
    fn complete_record(&mut self, id: &str, queue: &mut VecDeque<ModuleId>) -> Result<()> {
        let record = self.record_mut(id)?;
        if record.state == ModuleState::Done {
            return Ok(());
        }
        record.state = ModuleState::Done;
        let dependants = record.dependants.clone();
        debug!(module = %id, dependants = dependants.len(), "module done");

        for dependant in dependants {
            let waiting = self.record_mut(&dependant)?;
            if waiting.pending == 0 {
                warn!(module = %dependant, completed = %id, "pending counter already zero");
                continue;
            }
            waiting.pending -= 1;
            trace!(module = %dependant, pending = waiting.pending, completed = %id, "dependency completed");

            if waiting.ready_for_cascade() {
                queue.push_back(dependant);
            }
        }
        Ok(())
    }

    /// Call the initializer with the resolved dependency exports.
    ///
    /// Returns whether the module is complete once the initializer returned,
    /// i.e. `true` for synchronous modules and `false` for async ones.
    fn run_initializer(&mut self, id: &str) -> Result<bool> {
        let record = self.record_mut(id)?;
        let initializer = record.initializer.clone().ok_or_else(|| {
            ModgraphError::InvalidUsage(format!("module '{id}' has no initializer"))
        })?;
        record.invoked = true;
        let receiver = record
            .value
            .clone()
            .unwrap_or_else(|| Export::Handle(ModuleHandle::new(id)));
        let deps = record.dependencies.clone();

        let args = deps
            .iter()
            .map(|dep| {
                self.record(dep).map(|r| {
                    r.value
                        .clone()
                        .unwrap_or_else(|| Export::Handle(ModuleHandle::new(dep.as_str())))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(module = %id, deps = args.len(), "running initializer");

        let outcome = {
            let mut ctx = ModuleContext::new(self, ModuleHandle::new(id), receiver);
            initializer.call(&mut ctx, &args)
        };

        match outcome {
            Ok(export) => {
                if let Some(export) = export {
                    self.override_value(id, export)?;
                }
                let record = self.record(id)?;
                if record.is_async {
                    debug!(module = %id, "async initializer returned; waiting for done");
                    Ok(false)
                } else {
                    Ok(true)
                }
            }
            Err(source) => {
                let record = self.record_mut(id)?;
                if record.state == ModuleState::Done {
                    warn!(module = %id, error = %source, "initializer failed after completing; module stays done");
                } else {
                    record.state = ModuleState::Error;
                    warn!(module = %id, error = %source, "initializer failed");
                }
                Err(ModgraphError::InitializerFailure {
                    module: id.to_string(),
                    source,
                })
            }
        }
    }

    /// Replace the default export. A concrete value, once set, is final.
    fn override_value(&mut self, id: &str, export: Export) -> Result<()> {
        let record = self.record_mut(id)?;
        if record.has_default_value() {
            debug!(module = %id, value = %export.describe(), "module exports a value");
            record.value = Some(export);
        } else {
            warn!(module = %id, "module already exports a value; ignoring initializer result");
        }
        Ok(())
    }
}
