//! Store configuration and client construction.

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;

/// Environment variable overriding the backing table name.
pub const TABLE_NAME_ENV: &str = "DD_MUTEX_TABLE_NAME";

/// Backing table name used when neither the configuration nor the
/// environment names one.
pub const DEFAULT_TABLE_NAME: &str = "mutex-table";

/// Configuration for a [`DynamoLockStore`](crate::DynamoLockStore).
///
/// Credentials, and the region when unset here, resolve through the standard
/// AWS provider chain. The SDK's standard retry policy supplies the built-in
/// transient-fault retries; only persistent faults reach the mutex layer.
#[derive(Debug, Clone, Default)]
pub struct DynamoStoreConfig {
    region: Option<String>,
    endpoint_url: Option<String>,
    table_name: Option<String>,
}

impl DynamoStoreConfig {
    /// Creates an empty configuration; everything resolves to defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the AWS region hosting the mutex table.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Points the client at a non-standard endpoint, e.g. DynamoDB Local.
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Sets the backing table name explicitly.
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Resolves the table name: explicit configuration, then
    /// `DD_MUTEX_TABLE_NAME`, then [`DEFAULT_TABLE_NAME`].
    pub(crate) fn resolved_table_name(&self) -> String {
        self.table_name
            .clone()
            .or_else(|| std::env::var(TABLE_NAME_ENV).ok())
            .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string())
    }

    pub(crate) async fn build_client(&self) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared_config = loader.load().await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&shared_config);
        if let Some(endpoint) = &self.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        Client::from_conf(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_resolution_order() {
        // Single test so the env manipulation cannot race a sibling.
        let previous = std::env::var(TABLE_NAME_ENV).ok();

        std::env::remove_var(TABLE_NAME_ENV);
        assert_eq!(
            DynamoStoreConfig::new().resolved_table_name(),
            DEFAULT_TABLE_NAME
        );

        std::env::set_var(TABLE_NAME_ENV, "from-env");
        assert_eq!(DynamoStoreConfig::new().resolved_table_name(), "from-env");
        assert_eq!(
            DynamoStoreConfig::new()
                .table_name("explicit")
                .resolved_table_name(),
            "explicit"
        );

        match previous {
            Some(value) => std::env::set_var(TABLE_NAME_ENV, value),
            None => std::env::remove_var(TABLE_NAME_ENV),
        }
    }
}
