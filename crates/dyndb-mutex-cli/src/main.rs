//! Command-line mutexes for AWS using conditional PUTs in DynamoDB.
//!
//! Exit codes: `0` on a successful lock or release, `1` on a non-blocking
//! failed lock attempt, `2` on any unexpected error (including a blocking
//! timeout).

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use dyndb_mutex_core::{DistributedMutex, LockResult, MutexOptions};
use dyndb_mutex_dynamo::{DynamoLockStore, DynamoStoreConfig};

#[derive(Debug, Parser)]
#[command(
    name = "dyndb-mutex",
    version,
    about = "Mutexes for AWS using conditional PUTs in DynamoDB"
)]
struct Cli {
    /// The name of the mutex.
    #[arg(value_name = "MUTEX")]
    mutex: String,

    /// The action to take on the mutex.
    #[arg(value_name = "ACTION", value_enum)]
    action: Action,

    /// The AWS region hosting the mutex table. The default comes from the
    /// standard AWS configuration chain.
    #[arg(short, long, value_name = "NAME")]
    region: Option<String>,

    /// Overrides the DynamoDB endpoint, e.g. for DynamoDB Local.
    #[arg(long, value_name = "URL")]
    endpoint_url: Option<String>,

    /// The backing table name. Defaults to $DD_MUTEX_TABLE_NAME, then
    /// "mutex-table".
    #[arg(long, value_name = "NAME")]
    table: Option<String>,

    /// A name identifying the lock holder. The default is a generated
    /// unique token.
    #[arg(short = 'H', long, value_name = "NAME")]
    holder: Option<String>,

    /// The number of seconds after which the lock is released automatically.
    #[arg(short, long, value_name = "SECONDS", default_value = "30", value_parser = parse_seconds)]
    expiration: Duration,

    /// Do not exit until the mutex is locked or the timeout elapses.
    #[arg(short, long)]
    blocking: bool,

    /// The maximum number of seconds to block on attempting to lock.
    #[arg(short, long, value_name = "SECONDS", default_value = "10", value_parser = parse_seconds)]
    timeout: Duration,
}

/// Seconds as a decimal number, validated at parse time so a negative or
/// non-finite value surfaces as a usage error instead of a panic in the
/// duration conversion.
fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|err| format!("invalid number of seconds: {err}"))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| "seconds must be a finite, non-negative number".to_string())
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    /// Take the lease on the mutex.
    Lock,
    /// Relinquish the lease held by this holder.
    Release,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            error!(error = %err, "mutex operation failed");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> LockResult<bool> {
    let mut config = DynamoStoreConfig::new();
    if let Some(region) = cli.region {
        config = config.region(region);
    }
    if let Some(endpoint) = cli.endpoint_url {
        config = config.endpoint_url(endpoint);
    }
    if let Some(table) = cli.table {
        config = config.table_name(table);
    }
    let store = DynamoLockStore::shared(config).await;

    let options = MutexOptions {
        holder: cli.holder,
        expiration: cli.expiration,
        blocking: cli.blocking,
        timeout: Some(cli.timeout),
        ..MutexOptions::default()
    };
    let mut mutex = DistributedMutex::new(store, cli.mutex, options)?;

    match cli.action {
        Action::Lock => mutex.lock().await,
        Action::Release => {
            // A fresh process never "holds" the lock locally; the conditional
            // delete keyed on --holder is what makes cross-process release
            // work, and it is a no-op if the record is not ours.
            mutex.release().await?;
            Ok(true)
        }
    }
}
