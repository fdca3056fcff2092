//! Example: guarding a critical section with a DynamoDB mutex.
//!
//! Run with: `cargo run --example lock_demo`
//!
//! Needs AWS credentials, or DynamoDB Local via
//! `DYNAMODB_ENDPOINT`-style configuration in the code below.

use std::time::Duration;

use dyndb_mutex::{DistributedMutex, DynamoLockStore, DynamoStoreConfig, MutexOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // One store per table, shared by every mutex in the process.
    let store = DynamoLockStore::shared(DynamoStoreConfig::new()).await;
    println!("Using table: {}", store.table_name());

    let mut mutex = DistributedMutex::new(
        store,
        "example-resource",
        MutexOptions {
            expiration: Duration::from_secs(10),
            ..MutexOptions::default()
        },
    )?;

    if mutex.lock().await? {
        println!("Lock acquired, doing critical work...");
        tokio::time::sleep(Duration::from_secs(2)).await;
        mutex.release().await?;
        println!("Lock released");
    } else {
        println!("Lock is currently held by another process");
    }

    // Scoped acquisition: the guard releases on every exit path.
    let guard = mutex.acquire().await?;
    println!("Guarded critical section for '{}'", guard.name());
    guard.release().await?;

    Ok(())
}
