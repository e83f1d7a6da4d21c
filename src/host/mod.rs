//! The main-loop executor: a single-threaded execution context that work can
//! be scheduled onto from any thread.
//!
//! The bridge never calls host mutation code on a network thread. Connection
//! threads package each request as a [`WorkItem`] and hand it to a
//! [`MainLoopExecutor`]; the host drains its queue at its own cadence and runs
//! exactly one item at a time. An embedding application with its own tick or
//! timer API can implement [`MainLoopExecutor`] directly; [`HostLoop`] is the
//! channel-drain implementation the `scenebridged` binary uses.


use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use crate::bridge::protocol::{Request, Response};
use crate::bridge::registry::CommandRegistry;
use crate::log_debug;

/// How long the host loop sleeps in its queue wait before rechecking the stop
/// flag.
pub const HOST_TICK: Duration = Duration::from_millis(50);

/// Capability to move work onto the host's single logical thread.
pub trait MainLoopExecutor: Send + Sync {
    /// Queue a work item for the host's next opportunity. Fire-and-forget:
    /// the caller must never be re-entered from here.
    fn schedule(&self, work: WorkItem);
}

/// Envelope moving one command's execution from a network thread to the host.
///
/// Created and awaited by the network thread, executed and filled by the host
/// thread, and never touched by either after the handoff completes. The reply
/// channel tolerates the waiter having already given up: a send after the
/// dispatch deadline is discarded without error.
pub struct WorkItem {
    request: Request,
    registry: Arc<CommandRegistry>,
    reply: mpsc::Sender<Response>,
}

impl WorkItem {
    pub(crate) fn new(
        request: Request,
        registry: Arc<CommandRegistry>,
        reply: mpsc::Sender<Response>,
    ) -> Self {
        Self {
            request,
            registry,
            reply,
        }
    }

    pub fn command(&self) -> &str {
        &self.request.command
    }

    /// Run the handler on the current thread and deliver the response.
    ///
    /// Must only be called from the host's own execution context.
    pub fn execute(self) {
        let response = run_handler(&self.registry, &self.request);
        if self.reply.send(response).is_err() {
            // Waiter timed out; the mutation still happened. See the gateway
            // docs for the documented consistency caveat.
            log_debug(&format!(
                "late result for '{}' dropped (dispatch already timed out)",
                self.request.command
            ));
        }
    }
}

fn run_handler(registry: &CommandRegistry, request: &Request) -> Response {
    let Some(handler) = registry.resolve(&request.command) else {
        // The gateway resolves before scheduling, so this only fires if the
        // wiring changes underneath us.
        return Response::unknown_command(&request.command, registry.command_names());
    };
    match catch_unwind(AssertUnwindSafe(|| handler(&request.params))) {
        Ok(Ok(result)) => Response::success(result),
        Ok(Err(failure)) => match failure.detail {
            Some(detail) => Response::failure_with_detail(failure.message, detail),
            None => Response::failure(failure.message),
        },
        Err(payload) => {
            let text = panic_text(payload.as_ref());
            Response::failure_with_detail(
                format!("Command '{}' panicked: {text}", request.command),
                format!("panic in handler '{}': {text}", request.command),
            )
        }
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Cloneable, thread-safe handle used by gateways to enqueue work.
#[derive(Clone)]
pub struct HostScheduler {
    tx: Sender<WorkItem>,
}

impl MainLoopExecutor for HostScheduler {
    fn schedule(&self, work: WorkItem) {
        // If the host loop is gone the item is dropped; the waiting dispatch
        // observes the disconnect instead of hanging.
        let _ = self.tx.send(work);
    }
}

/// The queue-draining side, owned by the thread that plays host.
pub struct HostLoop {
    rx: Receiver<WorkItem>,
}

impl HostLoop {
    pub fn new() -> (HostScheduler, HostLoop) {
        let (tx, rx) = unbounded();
        (HostScheduler { tx }, HostLoop { rx })
    }

    /// Run every item currently queued, then return. For hosts that fold the
    /// bridge into an existing tick.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            match self.rx.try_recv() {
                Ok(work) => {
                    work.execute();
                    ran += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return ran,
            }
        }
    }

    /// Block servicing the queue until `stop` flips or every scheduler handle
    /// is dropped.
    pub fn run_until_stopped(&self, stop: &AtomicBool) {
        while !stop.load(Ordering::SeqCst) {
            match self.rx.recv_timeout(HOST_TICK) {
                Ok(work) => work.execute(),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}
