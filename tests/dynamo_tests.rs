//! Integration tests against DynamoDB Local.
//!
//! Run a local DynamoDB first, e.g.:
//!
//! ```text
//! docker run -p 8000:8000 amazon/dynamodb-local
//! export AWS_ACCESS_KEY_ID=local AWS_SECRET_ACCESS_KEY=local
//! DYNAMODB_ENDPOINT=http://localhost:8000 cargo test -- --ignored
//! ```

use std::sync::Arc;
use std::time::Duration;

use dyndb_mutex::{
    Clock, DistributedMutex, DynamoLockStore, DynamoStoreConfig, LockStore, MutexOptions,
    SystemClock,
};

fn endpoint() -> String {
    std::env::var("DYNAMODB_ENDPOINT").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Each test gets its own table so runs never interfere.
fn config() -> DynamoStoreConfig {
    DynamoStoreConfig::new()
        .region("us-east-1")
        .endpoint_url(endpoint())
        .table_name(format!("mutex-test-{}", uuid::Uuid::new_v4()))
}

fn resource() -> String {
    format!("resource-{}", uuid::Uuid::new_v4())
}

#[tokio::test]
#[ignore] // Requires DynamoDB Local
async fn dynamo_lock_acquire_release() {
    let store = Arc::new(DynamoLockStore::connect(config()).await);
    let name = resource();

    let mut m = DistributedMutex::new(Arc::clone(&store), &name, MutexOptions::default()).unwrap();
    assert!(m.lock().await.unwrap());

    // A different holder is rejected while the lease is live.
    let mut other =
        DistributedMutex::new(Arc::clone(&store), &name, MutexOptions::default()).unwrap();
    assert!(!other.lock().await.unwrap());

    m.release().await.unwrap();
    assert!(other.lock().await.unwrap());
    other.release().await.unwrap();

    store.delete_table().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires DynamoDB Local
async fn dynamo_expired_lease_is_stealable() {
    let store = Arc::new(DynamoLockStore::connect(config()).await);
    let name = resource();
    let short_lease = MutexOptions {
        expiration: Duration::from_secs(1),
        ..MutexOptions::default()
    };

    let mut first =
        DistributedMutex::new(Arc::clone(&store), &name, short_lease.clone()).unwrap();
    assert!(first.lock().await.unwrap());

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    let mut second = DistributedMutex::new(Arc::clone(&store), &name, short_lease).unwrap();
    assert!(second.lock().await.unwrap());

    // The stale holder's release leaves the new lease in place.
    first.release().await.unwrap();
    let now = SystemClock.now();
    let record = store.lookup(&name, now).await.unwrap().unwrap();
    assert_eq!(record.holder, second.holder());

    second.release().await.unwrap();
    store.delete_table().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires DynamoDB Local
async fn dynamo_lookup_hides_expired_records() {
    let store = Arc::new(DynamoLockStore::connect(config()).await);
    let name = resource();

    let mut m = DistributedMutex::new(
        Arc::clone(&store),
        &name,
        MutexOptions {
            expiration: Duration::from_secs(1),
            ..MutexOptions::default()
        },
    )
    .unwrap();
    assert!(m.lock().await.unwrap());

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    // Physically present, logically absent.
    let now = SystemClock.now();
    assert!(store.lookup(&name, now).await.unwrap().is_none());

    store.delete_table().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires DynamoDB Local
async fn dynamo_concurrent_table_creation() {
    // Both stores target the same fresh table; creation must converge for
    // every racer.
    let shared_config = config();

    let mut workers = Vec::new();
    for index in 0..2 {
        let config = shared_config.clone();
        workers.push(tokio::spawn(async move {
            let store = Arc::new(DynamoLockStore::connect(config).await);
            let mut m = DistributedMutex::new(
                Arc::clone(&store),
                format!("racer-{index}"),
                MutexOptions::default(),
            )
            .unwrap();
            assert!(m.lock().await.unwrap());
            m.release().await.unwrap();
        }));
    }
    for worker in workers {
        worker.await.unwrap();
    }

    let store = DynamoLockStore::connect(shared_config).await;
    store.delete_table().await.unwrap();
}
