use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Acquire a cache mutex, recovering the guard if a previous holder panicked.
///
/// Every critical section in the book cache is a handful of map or field
/// writes, so the protected state is still structurally valid after a panic.
pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    target: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                target_module = target,
                lock_kind = "mutex.lock",
                result = "poisoned_recovered",
                "Recovered from poisoned book cache lock"
            );
            poisoned.into_inner()
        }
    }
}
