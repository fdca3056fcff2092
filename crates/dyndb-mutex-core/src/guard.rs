//! Scoped acquisition guard.

use std::sync::Arc;

use tracing::warn;

use crate::clock::Clock;
use crate::error::LockResult;
use crate::mutex::DistributedMutex;
use crate::store::LockStore;

/// Holds a lease on behalf of a [`DistributedMutex`] for the duration of a
/// scope.
///
/// Obtained from [`DistributedMutex::acquire`]. Call
/// [`release`](Self::release) for proper error handling; if the guard is
/// dropped instead (early return, `?` propagation, or unwinding out of the
/// scope), the lease is relinquished by a best-effort conditional delete
/// spawned onto the runtime. Either way the mutex reports
/// `is_locked() == false` as soon as the guard is gone.
pub struct MutexGuard<'a, S: LockStore + 'static, C: Clock> {
    mutex: &'a mut DistributedMutex<S, C>,
    released: bool,
}

impl<'a, S: LockStore + 'static, C: Clock> MutexGuard<'a, S, C> {
    pub(crate) fn new(mutex: &'a mut DistributedMutex<S, C>) -> Self {
        Self {
            mutex,
            released: false,
        }
    }

    /// Returns the resource name the guarded lease covers.
    pub fn name(&self) -> &str {
        self.mutex.name()
    }

    /// Explicitly relinquishes the lease.
    pub async fn release(mut self) -> LockResult<()> {
        self.released = true;
        self.mutex.release().await
    }
}

impl<S: LockStore + 'static, C: Clock> Drop for MutexGuard<'_, S, C> {
    fn drop(&mut self) {
        if self.released || !self.mutex.locked {
            return;
        }
        self.mutex.locked = false;

        let store: Arc<S> = Arc::clone(&self.mutex.store);
        let name = self.mutex.name.clone();
        let holder = self.mutex.holder.clone();

        // Drop cannot await, so the conditional delete is pushed onto the
        // runtime. If it never runs (runtime shutting down, process exit),
        // the lease expires on its own.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(error) = store.release(&name, &holder).await {
                        warn!(%name, %error, "best-effort release on drop failed");
                    }
                });
            }
            Err(_) => {
                warn!(%name, "no runtime for release on drop; lease will expire on its own");
            }
        }
    }
}
