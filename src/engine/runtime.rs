// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::registry::ModuleId;

use super::session::Session;
use super::{CompletionReason, RuntimeEvent};

/// Feeds completion events into a [`Session`].
///
/// The registry is single-threaded, so the runtime must be driven from the
/// thread that owns the session (a current-thread Tokio runtime). Only the
/// event producers run as separate tasks.
pub struct Runtime<'s> {
    session: &'s mut Session,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    /// Completion events still expected from timers.
    outstanding: usize,
}

impl fmt::Debug for Runtime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("session", &self.session)
            .field("outstanding", &self.outstanding)
            .finish_non_exhaustive()
    }
}

impl<'s> Runtime<'s> {
    pub fn new(
        session: &'s mut Session,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        outstanding: usize,
    ) -> Self {
        Self {
            session,
            event_rx,
            outstanding,
        }
    }

    /// Main event loop.
    ///
    /// Runs until every expected timer event has been handled, the channel
    /// closes, or shutdown is requested. A failing completion stops the loop
    /// and is returned.
    pub async fn run(mut self) -> Result<()> {
        info!(outstanding = self.outstanding, "modgraph runtime started");

        while self.outstanding > 0 {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            match event {
                RuntimeEvent::ModuleCompleted { module, reason } => {
                    if reason == CompletionReason::Timer {
                        self.outstanding = self.outstanding.saturating_sub(1);
                    }
                    self.session.complete(&module)?;
                }
                RuntimeEvent::ShutdownRequested => {
                    warn!(
                        outstanding = self.outstanding,
                        "shutdown requested; abandoning pending completions"
                    );
                    break;
                }
            }
        }

        info!("modgraph runtime finished");
        Ok(())
    }
}

/// Spawn one timer task per `(module, delay)` that reports the module as
/// completed once its delay has elapsed. Returns the number of tasks spawned.
pub fn spawn_completion_timers(
    timers: Vec<(ModuleId, Duration)>,
    tx: &mpsc::Sender<RuntimeEvent>,
) -> usize {
    let count = timers.len();
    for (module, delay) in timers {
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(module = %module, ?delay, "completion timer fired");
            let _ = tx
                .send(RuntimeEvent::ModuleCompleted {
                    module,
                    reason: CompletionReason::Timer,
                })
                .await;
        });
    }
    count
}
