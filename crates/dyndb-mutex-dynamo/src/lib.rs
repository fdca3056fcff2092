//! DynamoDB backend for dyndb-mutex.
//!
//! Implements the `LockStore` contract over a DynamoDB table with a single
//! string partition key, using conditional `PutItem` for the atomic
//! absent-or-expired claim and conditional `DeleteItem` for best-effort
//! release.

pub mod config;
pub mod store;
mod table;

pub use config::{DynamoStoreConfig, DEFAULT_TABLE_NAME, TABLE_NAME_ENV};
pub use store::DynamoLockStore;

/// A distributed mutex over the DynamoDB store.
pub type DynamoDbMutex = dyndb_mutex_core::DistributedMutex<DynamoLockStore>;
