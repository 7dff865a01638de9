//! AWS Lambda entry point for the outage watcher.
//!
//! Deploy with `cargo lambda build --release --features lambda` and trigger it
//! from a recurring schedule.
//!
//! ## Environment Variables
//!
//! - `S3_BUCKET`: bucket holding config and state (default: `outage-watch`)
//! - `S3_PREFIX`: key prefix inside the bucket (default: `outage-watch`)
//! - `CONFIG_S3_KEY`: config object key under the prefix
//!   (default: `config/outage-watch.toml`)
//! - `OUTAGE_DISTRICT`, `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`,
//!   `REQUEST_TIMEOUT_SECS`: config overrides
//! - `RUST_LOG`: log filter (e.g., `info`, `outage_watch=debug`)

use lambda_runtime::{Error as LambdaError, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use outage_watch::lambda::handler;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Outage watch Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}
