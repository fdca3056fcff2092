//! Table lifecycle: lazy creation, active-state wait, administrative delete.

use std::time::Duration;

use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use tokio::time::Instant;
use tracing::{debug, info};

use dyndb_mutex_core::error::{LockError, LockResult};

use crate::store::ATTR_NAME;

/// How long a fresh table gets to reach ACTIVE before creation is declared
/// failed.
const ACTIVE_WAIT_TIMEOUT: Duration = Duration::from_secs(120);
const ACTIVE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Creates the mutex table if absent and waits until it is usable.
///
/// A creation race with another caller ("already exists / already being
/// created") is success, and every racer waits for the ACTIVE state before
/// returning.
pub(crate) async fn create_and_await_active(client: &Client, table_name: &str) -> LockResult<()> {
    let key_attribute = AttributeDefinition::builder()
        .attribute_name(ATTR_NAME)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(|err| LockError::StoreUnavailable(Box::new(err)))?;
    let key_schema = KeySchemaElement::builder()
        .attribute_name(ATTR_NAME)
        .key_type(KeyType::Hash)
        .build()
        .map_err(|err| LockError::StoreUnavailable(Box::new(err)))?;

    let result = client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(key_attribute)
        .key_schema(key_schema)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    match result {
        Ok(_) => info!(table_name, "created mutex table"),
        Err(err) => {
            let service_error = err.into_service_error();
            if service_error.is_resource_in_use_exception() {
                debug!(table_name, "table already exists or is being created");
            } else {
                return Err(LockError::StoreUnavailable(Box::new(service_error)));
            }
        }
    }

    await_active(client, table_name).await
}

async fn await_active(client: &Client, table_name: &str) -> LockResult<()> {
    let start = Instant::now();
    loop {
        match client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
        {
            Ok(output) => {
                let status = output.table().and_then(|table| table.table_status()).cloned();
                if status == Some(TableStatus::Active) {
                    return Ok(());
                }
                debug!(table_name, ?status, "waiting for table to become active");
            }
            Err(err) => {
                let service_error = err.into_service_error();
                // The table can be briefly invisible right after CreateTable.
                if !service_error.is_resource_not_found_exception() {
                    return Err(LockError::StoreUnavailable(Box::new(service_error)));
                }
            }
        }

        if start.elapsed() >= ACTIVE_WAIT_TIMEOUT {
            return Err(LockError::StoreUnavailable(
                format!("table '{table_name}' did not become active within {ACTIVE_WAIT_TIMEOUT:?}")
                    .into(),
            ));
        }
        tokio::time::sleep(ACTIVE_POLL_INTERVAL).await;
    }
}

/// Removes the whole backing table. A table that is already gone is success.
pub(crate) async fn delete(client: &Client, table_name: &str) -> LockResult<()> {
    match client.delete_table().table_name(table_name).send().await {
        Ok(_) => {
            info!(table_name, "deleted mutex table");
            Ok(())
        }
        Err(err) => {
            let service_error = err.into_service_error();
            if service_error.is_resource_not_found_exception() {
                Ok(())
            } else {
                Err(LockError::StoreUnavailable(Box::new(service_error)))
            }
        }
    }
}
