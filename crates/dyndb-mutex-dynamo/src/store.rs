//! DynamoDB implementation of the lock store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tokio::sync::OnceCell;
use tracing::debug;

use dyndb_mutex_core::clock::EpochMillis;
use dyndb_mutex_core::error::{LockError, LockResult};
use dyndb_mutex_core::record::LockRecord;
use dyndb_mutex_core::store::LockStore;

use crate::config::DynamoStoreConfig;
use crate::table;

/// Partition key of the lock item.
pub(crate) const ATTR_NAME: &str = "lockname";
/// Identity of the current claimant.
pub(crate) const ATTR_HOLDER: &str = "holder";
/// Lease deadline, epoch milliseconds.
pub(crate) const ATTR_EXPIRES: &str = "expires_at";

/// The absent-or-expired claim predicate. This single conditional write is
/// what makes acquisition atomic; it must never be split into a read
/// followed by a write.
const CLAIM_CONDITION: &str = "attribute_not_exists(lockname) OR expires_at <= :now";

/// Release only deletes a record that is still ours.
const RELEASE_CONDITION: &str = "holder = :holder";

/// Lock store backed by one DynamoDB table.
///
/// Every mutex pointing at the same table should share one store so they
/// reuse a single client and pay the table-creation check once; see
/// [`shared`](Self::shared).
pub struct DynamoLockStore {
    client: Client,
    table_name: String,
    table_ready: OnceCell<()>,
}

/// Process-wide registry of stores, keyed by table name.
static SHARED_STORES: OnceLock<Mutex<HashMap<String, Arc<DynamoLockStore>>>> = OnceLock::new();

impl DynamoLockStore {
    /// Builds a dedicated store. Prefer [`shared`](Self::shared) unless the
    /// caller manages its own sharing.
    pub async fn connect(config: DynamoStoreConfig) -> Self {
        let table_name = config.resolved_table_name();
        let client = config.build_client().await;
        Self {
            client,
            table_name,
            table_ready: OnceCell::new(),
        }
    }

    /// Returns the process-wide store for the table this configuration
    /// names, connecting on first use.
    ///
    /// The registry is keyed by table name alone: once a store exists for a
    /// table, later callers get it unchanged and their region/endpoint
    /// settings are ignored. To reach a table of the same name through a
    /// differently configured client, use [`connect`](Self::connect).
    pub async fn shared(config: DynamoStoreConfig) -> Arc<Self> {
        let table_name = config.resolved_table_name();
        if let Some(store) = Self::registry()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&table_name)
        {
            return Arc::clone(store);
        }

        // Connecting happens outside the registry lock; a concurrent caller
        // may get there first, in which case the earlier store wins.
        let store = Arc::new(Self::connect(config).await);
        let mut registry = Self::registry()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(registry.entry(table_name).or_insert(store))
    }

    fn registry() -> &'static Mutex<HashMap<String, Arc<DynamoLockStore>>> {
        SHARED_STORES.get_or_init(|| Mutex::new(HashMap::new()))
    }

    /// Returns the name of the backing table.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl LockStore for DynamoLockStore {
    async fn ensure_table(&self) -> LockResult<()> {
        // Memoized per store: once the table has been seen ACTIVE, repeated
        // lock() calls skip the DescribeTable round trip entirely.
        self.table_ready
            .get_or_try_init(|| table::create_and_await_active(&self.client, &self.table_name))
            .await?;
        Ok(())
    }

    async fn try_claim(
        &self,
        name: &str,
        holder: &str,
        expiration: Duration,
        now: EpochMillis,
    ) -> LockResult<bool> {
        let expires_at = LockRecord::expiry_after(now, expiration);

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item(ATTR_NAME, AttributeValue::S(name.to_string()))
            .item(ATTR_HOLDER, AttributeValue::S(holder.to_string()))
            .item(ATTR_EXPIRES, AttributeValue::N(expires_at.to_string()))
            .condition_expression(CLAIM_CONDITION)
            .expression_attribute_values(":now", AttributeValue::N(now.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(name, holder, expires_at, "claim accepted");
                Ok(true)
            }
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    debug!(name, "claim rejected: live record present");
                    Ok(false)
                } else {
                    Err(LockError::StoreUnavailable(Box::new(service_error)))
                }
            }
        }
    }

    async fn release(&self, name: &str, holder: &str) -> LockResult<()> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(ATTR_NAME, AttributeValue::S(name.to_string()))
            .condition_expression(RELEASE_CONDITION)
            .expression_attribute_values(":holder", AttributeValue::S(holder.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_error = err.into_service_error();
                // Expired-and-stolen, never held, or table already gone:
                // nothing of ours to delete.
                if service_error.is_conditional_check_failed_exception()
                    || service_error.is_resource_not_found_exception()
                {
                    debug!(name, holder, "release matched nothing");
                    Ok(())
                } else {
                    Err(LockError::StoreUnavailable(Box::new(service_error)))
                }
            }
        }
    }

    async fn lookup(&self, name: &str, now: EpochMillis) -> LockResult<Option<LockRecord>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_NAME, AttributeValue::S(name.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|err| LockError::StoreUnavailable(Box::new(err.into_service_error())))?;

        let Some(item) = output.item() else {
            return Ok(None);
        };
        Ok(parse_record(name, item).filter(|record| record.is_live(now)))
    }

    async fn delete_table(&self) -> LockResult<()> {
        // The creation memo is deliberately left set: a store whose table was
        // deleted has finished serving locks.
        table::delete(&self.client, &self.table_name).await
    }
}

fn parse_record(name: &str, item: &HashMap<String, AttributeValue>) -> Option<LockRecord> {
    let holder = item.get(ATTR_HOLDER)?.as_s().ok()?.clone();
    let expires_at = item
        .get(ATTR_EXPIRES)?
        .as_n()
        .ok()?
        .parse::<EpochMillis>()
        .ok()?;
    Some(LockRecord {
        name: name.to_string(),
        holder,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(holder: &str, expires_at: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (
                ATTR_HOLDER.to_string(),
                AttributeValue::S(holder.to_string()),
            ),
            (
                ATTR_EXPIRES.to_string(),
                AttributeValue::N(expires_at.to_string()),
            ),
        ])
    }

    #[test]
    fn parses_well_formed_item() {
        let record = parse_record("resource", &item("someone", "1700000000000")).unwrap();
        assert_eq!(record.name, "resource");
        assert_eq!(record.holder, "someone");
        assert_eq!(record.expires_at, 1_700_000_000_000);
    }

    #[test]
    fn rejects_item_with_malformed_expiry() {
        assert!(parse_record("resource", &item("someone", "not-a-number")).is_none());
    }

    #[test]
    fn rejects_item_missing_holder() {
        let mut incomplete = item("someone", "1");
        incomplete.remove(ATTR_HOLDER);
        assert!(parse_record("resource", &incomplete).is_none());
    }
}
