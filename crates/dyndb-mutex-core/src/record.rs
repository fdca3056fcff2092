//! The lock record stored in the backing table.

use std::time::Duration;

use crate::clock::EpochMillis;

/// One row per resource name in the backing table.
///
/// At any instant, for a given `name`, either no record exists or exactly one
/// does. A record is live iff `expires_at > now`; an expired record is
/// logically absent even while physically present, until overwritten or
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    /// Primary key, unique per logical mutex.
    pub name: String,
    /// Identity of the current claimant.
    pub holder: String,
    /// Absolute timestamp after which the record is considered abandoned.
    pub expires_at: EpochMillis,
}

impl LockRecord {
    /// Whether this record still holds the resource at `now`.
    pub fn is_live(&self, now: EpochMillis) -> bool {
        self.expires_at > now
    }

    /// Deadline for a claim made at `now` with the given lease duration.
    ///
    /// Saturates at `EpochMillis::MAX` for oversized leases; a wrapped
    /// (negative) deadline would make a successful claim instantly stale.
    pub fn expiry_after(now: EpochMillis, lease: Duration) -> EpochMillis {
        let lease_millis = EpochMillis::try_from(lease.as_millis()).unwrap_or(EpochMillis::MAX);
        now.saturating_add(lease_millis)
    }
}
