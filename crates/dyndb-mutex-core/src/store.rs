//! Abstraction over the backing conditionally-writable table.

use std::future::Future;
use std::time::Duration;

use crate::clock::EpochMillis;
use crate::error::LockResult;
use crate::record::LockRecord;

/// The conditionally-writable store a mutex coordinates through.
///
/// Correctness rests entirely on the atomicity of [`try_claim`]: it must be a
/// single conditional write executed by the store (compare-and-write), never
/// a read followed by a write performed as two steps by the client, or two
/// concurrent claimants could both succeed.
///
/// [`try_claim`]: LockStore::try_claim
pub trait LockStore: Send + Sync {
    /// Creates the backing table if absent.
    ///
    /// Idempotent: "already exists / already being created" is success rather
    /// than an error, and the call waits until the table reaches a usable
    /// state before returning. Concurrent callers across threads and
    /// processes all converge without error. Fails with
    /// [`LockError::StoreUnavailable`](crate::LockError::StoreUnavailable)
    /// if creation cannot complete.
    fn ensure_table(&self) -> impl Future<Output = LockResult<()>> + Send;

    /// Atomically writes `LockRecord { name, holder, expires_at: now + expiration }`.
    ///
    /// The write succeeds iff no record exists for `name` or the existing
    /// record is stale (`expires_at <= now`), regardless of which holder
    /// owned it. Any live record blocks the claim, including one held by the
    /// same holder: there is no lease renewal.
    ///
    /// Ordinary contention is `Ok(false)`, never an error; backend faults
    /// surface as `StoreUnavailable` after the store's built-in transient
    /// retries.
    fn try_claim(
        &self,
        name: &str,
        holder: &str,
        expiration: Duration,
        now: EpochMillis,
    ) -> impl Future<Output = LockResult<bool>> + Send;

    /// Deletes the record for `name` only if its current holder matches.
    ///
    /// A mismatch (expired and stolen) or a missing record is a no-op, not an
    /// error: release is best effort.
    fn release(&self, name: &str, holder: &str) -> impl Future<Output = LockResult<()>> + Send;

    /// Strongly consistent point read.
    ///
    /// A record whose `expires_at <= now` is reported as absent even if
    /// physically present.
    fn lookup(
        &self,
        name: &str,
        now: EpochMillis,
    ) -> impl Future<Output = LockResult<Option<LockRecord>>> + Send;

    /// Administrative removal of the entire backing table.
    ///
    /// Affects every mutex sharing the table; never invoked implicitly.
    fn delete_table(&self) -> impl Future<Output = LockResult<()>> + Send;
}
