//! Distributed mutexes for Rust backed by DynamoDB conditional writes.
//!
//! Clients lock a named resource by inserting a record the table accepts only
//! if no live (non-expired) record already exists for that name, and release
//! it by conditionally deleting their own record. Leases expire automatically,
//! so a crashed holder never wedges the resource forever.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dyndb_mutex::{DistributedMutex, DynamoLockStore, DynamoStoreConfig, MutexOptions};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One store per table, shared process-wide.
//!     let store = DynamoLockStore::shared(DynamoStoreConfig::new()).await;
//!
//!     let mut mutex = DistributedMutex::new(
//!         store,
//!         "my-resource",
//!         MutexOptions {
//!             expiration: Duration::from_secs(30),
//!             ..MutexOptions::default()
//!         },
//!     )?;
//!
//!     if mutex.lock().await? {
//!         // Critical section - we hold the lease.
//!         mutex.release().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `dyndb-mutex-core`: the mutex state machine, the `LockStore` abstraction,
//!   clock and error types
//! - `dyndb-mutex-dynamo`: the DynamoDB implementation of `LockStore`
//!
//! For fine-grained control, depend on the individual crates instead. The
//! `dyndb-mutex-cli` crate provides the command-line binary.

// Re-export core types and traits
pub use dyndb_mutex_core::*;

// Re-export the DynamoDB backend
#[allow(ambiguous_glob_reexports)]
pub use dyndb_mutex_dynamo::*;
