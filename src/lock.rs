use std::sync::{Mutex, MutexGuard};

/// Take a mutex even if a previous holder panicked. The scene document must
/// stay reachable after a handler panic; that panic has already been turned
/// into a failure response, so the poison flag carries no extra information.
pub(crate) fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        crate::log_debug(&format!("recovering poisoned lock on {what}"));
        poisoned.into_inner()
    })
}
