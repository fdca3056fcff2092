//! Convenience prelude for mutex types.

pub use crate::clock::{Clock, EpochMillis, SystemClock};
pub use crate::error::{LockError, LockResult};
pub use crate::guard::MutexGuard;
pub use crate::mutex::{DistributedMutex, MutexOptions};
pub use crate::record::LockRecord;
pub use crate::store::LockStore;
