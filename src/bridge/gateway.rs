//! Dispatch gateway: the cross-thread handoff between connection threads and
//! the host's main loop.
//!
//! `dispatch` is called from an arbitrary network thread but never runs
//! handler code there. It schedules a work item onto the main-loop executor
//! and blocks on a one-shot reply channel with a fixed deadline.
//!
//! # Consistency caveat
//!
//! A timed-out work item is not retracted from the host's schedule. The host
//! offers no cooperative cancellation, so the handler may still run after the
//! client has already received `Timeout after 60s`; its late result is
//! discarded. A client that times out must treat the host-side effect as
//! unknown, not as "did not happen".

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::host::{MainLoopExecutor, WorkItem};
use crate::log_debug;

use super::protocol::{Request, Response};
use super::registry::CommandRegistry;

/// Fixed per-command deadline. Not configurable per request.
pub const DISPATCH_DEADLINE: Duration = Duration::from_secs(60);

/// Routes decoded requests onto the host thread and waits for results.
pub struct DispatchGateway {
    registry: Arc<CommandRegistry>,
    executor: Arc<dyn MainLoopExecutor>,
    deadline: Duration,
}

impl DispatchGateway {
    pub fn new(registry: Arc<CommandRegistry>, executor: Arc<dyn MainLoopExecutor>) -> Self {
        Self {
            registry,
            executor,
            deadline: DISPATCH_DEADLINE,
        }
    }

    /// Same gateway with a shorter deadline. Crate-internal: production code
    /// always waits the fixed 60 seconds.
    #[cfg(test)]
    pub(crate) fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Execute one request on the host thread and block until its response or
    /// the deadline, whichever comes first.
    pub fn dispatch(&self, request: Request) -> Response {
        if self.registry.resolve(&request.command).is_none() {
            return Response::unknown_command(&request.command, self.registry.command_names());
        }

        let command = request.command.clone();
        let (reply_tx, reply_rx) = mpsc::channel();
        let started = Instant::now();
        self.executor
            .schedule(WorkItem::new(request, Arc::clone(&self.registry), reply_tx));

        match reply_rx.recv_timeout(self.deadline) {
            Ok(response) => {
                tracing::debug!(
                    command = command.as_str(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = response.ok,
                    "dispatch complete"
                );
                response
            }
            Err(RecvTimeoutError::Timeout) => {
                log_debug(&format!(
                    "dispatch of '{command}' timed out after {}s; work not retracted",
                    self.deadline.as_secs()
                ));
                Response::failure(format!("Timeout after {}s", self.deadline.as_secs()))
            }
            Err(RecvTimeoutError::Disconnected) => {
                // The executor dropped the item without running it, which
                // means the host loop has shut down.
                Response::failure(format!("Host loop unavailable; '{command}' was not executed"))
            }
        }
    }
}
