//! The mutex state machine: claim loop, blocking retry, lease bookkeeping.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::{LockError, LockResult};
use crate::guard::MutexGuard;
use crate::holder::generate_holder;
use crate::store::LockStore;

/// Configuration for a [`DistributedMutex`]. Fixed for the lifetime of the
/// instance.
#[derive(Debug, Clone)]
pub struct MutexOptions {
    /// Identity of this claimant. Generated per instance when `None`.
    pub holder: Option<String>,
    /// Lease duration requested on each claim.
    pub expiration: Duration,
    /// Whether `lock()` waits for the lease instead of failing fast.
    pub blocking: bool,
    /// Maximum wait in blocking mode. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Fixed interval between claim attempts in blocking mode. Contention is
    /// expected to be short-lived and bounded by `timeout`, so no backoff is
    /// applied.
    pub poll_interval: Duration,
}

impl Default for MutexOptions {
    fn default() -> Self {
        Self {
            holder: None,
            expiration: Duration::from_secs(30),
            blocking: false,
            timeout: Some(Duration::from_secs(10)),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// A distributed mutex bound to one resource name.
///
/// Instances are independent even within a single process and share no local
/// state; correctness relies solely on the store's atomic conditional write.
/// The instance is reusable: `lock()` may be called again after `release()`.
pub struct DistributedMutex<S, C = SystemClock> {
    pub(crate) name: String,
    pub(crate) holder: String,
    expiration: Duration,
    blocking: bool,
    timeout: Option<Duration>,
    poll_interval: Duration,
    pub(crate) store: Arc<S>,
    clock: C,
    pub(crate) locked: bool,
}

impl<S: LockStore> DistributedMutex<S, SystemClock> {
    /// Creates a mutex over `store` using wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::InvalidName`] if `name` is empty.
    pub fn new(store: Arc<S>, name: impl Into<String>, options: MutexOptions) -> LockResult<Self> {
        Self::with_clock(store, name, options, SystemClock)
    }
}

impl<S: LockStore, C: Clock> DistributedMutex<S, C> {
    /// Creates a mutex with an explicit time source.
    pub fn with_clock(
        store: Arc<S>,
        name: impl Into<String>,
        options: MutexOptions,
        clock: C,
    ) -> LockResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(LockError::InvalidName(
                "mutex name cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            name,
            holder: options.holder.unwrap_or_else(generate_holder),
            expiration: options.expiration,
            blocking: options.blocking,
            timeout: options.timeout,
            poll_interval: options.poll_interval,
            store,
            clock,
            locked: false,
        })
    }

    /// Returns the resource name this mutex is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the holder identity used on every claim.
    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Local cached acquisition state.
    ///
    /// Does not re-query the store, so it may be stale relative to concurrent
    /// expiration. Best effort, not authoritative.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Attempts to take the lease.
    ///
    /// Non-blocking mode returns `Ok(false)` on contention without delay.
    /// Blocking mode retries on a fixed interval and fails with
    /// [`LockError::AcquireLockFailed`] once `timeout` elapses; it never
    /// returns `Ok(false)`, since the caller explicitly asked to wait.
    pub async fn lock(&mut self) -> LockResult<bool> {
        self.store.ensure_table().await?;

        let start = Instant::now();
        loop {
            let now = self.clock.now();
            if self
                .store
                .try_claim(&self.name, &self.holder, self.expiration, now)
                .await?
            {
                self.locked = true;
                debug!(name = %self.name, holder = %self.holder, "lock acquired");
                return Ok(true);
            }

            if !self.blocking {
                debug!(name = %self.name, "lock held elsewhere");
                return Ok(false);
            }

            let mut sleep_for = self.poll_interval;
            if let Some(timeout) = self.timeout {
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    debug!(name = %self.name, ?elapsed, "gave up waiting for lock");
                    return Err(LockError::AcquireLockFailed {
                        name: self.name.clone(),
                        waited: elapsed,
                    });
                }
                // One last claim attempt lands exactly at the deadline.
                sleep_for = sleep_for.min(timeout - elapsed);
            }
            tokio::time::sleep(sleep_for).await;
        }
    }

    /// Relinquishes the lease.
    ///
    /// Issues the conditional delete keyed on this instance's holder; if the
    /// lease already expired and was stolen, the delete matches nothing and
    /// the other holder's lease is left intact. The local flag is cleared
    /// regardless of whether the store-side delete matched, so release is
    /// idempotent from the caller's perspective.
    pub async fn release(&mut self) -> LockResult<()> {
        self.locked = false;
        self.store.release(&self.name, &self.holder).await?;
        debug!(name = %self.name, holder = %self.holder, "lock released");
        Ok(())
    }

    /// Scoped acquisition.
    ///
    /// Fails entry with [`LockError::AcquireLockFailed`] when the lease
    /// cannot be obtained (non-blocking contention, or a blocking timeout).
    /// The returned guard relinquishes the lease on every exit path,
    /// including early returns and `?` propagation out of the scope.
    pub async fn acquire(&mut self) -> LockResult<MutexGuard<'_, S, C>>
    where
        S: 'static,
    {
        if self.lock().await? {
            Ok(MutexGuard::new(self))
        } else {
            Err(LockError::AcquireLockFailed {
                name: self.name.clone(),
                waited: Duration::ZERO,
            })
        }
    }

    /// Removes the shared backing table.
    ///
    /// Administrative cleanup, independent of any lock state; affects every
    /// mutex using the table.
    pub async fn delete_table(&self) -> LockResult<()> {
        self.store.delete_table().await
    }
}
