//! In-memory lock store for exercising the mutex state machine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use dyndb_mutex::{EpochMillis, LockRecord, LockResult, LockStore};

/// Lock store over a process-local map, honoring the same absent-or-expired
/// claim predicate as the DynamoDB table.
#[derive(Default)]
pub struct MemoryLockStore {
    records: StdMutex<HashMap<String, LockRecord>>,
    ensure_calls: AtomicUsize,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `ensure_table` has been invoked.
    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    /// Raw view of the physical record, expired or not.
    pub fn raw_record(&self, name: &str) -> Option<LockRecord> {
        self.records.lock().unwrap().get(name).cloned()
    }
}

impl LockStore for MemoryLockStore {
    async fn ensure_table(&self) -> LockResult<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn try_claim(
        &self,
        name: &str,
        holder: &str,
        expiration: Duration,
        now: EpochMillis,
    ) -> LockResult<bool> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records.get(name) {
            if existing.is_live(now) {
                return Ok(false);
            }
        }
        records.insert(
            name.to_string(),
            LockRecord {
                name: name.to_string(),
                holder: holder.to_string(),
                expires_at: LockRecord::expiry_after(now, expiration),
            },
        );
        Ok(true)
    }

    async fn release(&self, name: &str, holder: &str) -> LockResult<()> {
        let mut records = self.records.lock().unwrap();
        if records.get(name).is_some_and(|record| record.holder == holder) {
            records.remove(name);
        }
        Ok(())
    }

    async fn lookup(&self, name: &str, now: EpochMillis) -> LockResult<Option<LockRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(name)
            .filter(|record| record.is_live(now))
            .cloned())
    }

    async fn delete_table(&self) -> LockResult<()> {
        self.records.lock().unwrap().clear();
        Ok(())
    }
}
