// src/lambda/mod.rs

//! AWS Lambda handler for the outage watcher.
//!
//! Invoked on a recurring schedule with no meaningful payload. Each
//! invocation:
//! 1. Loads configuration from S3 (or defaults) plus environment overrides
//! 2. Checks every category against its S3-persisted state
//! 3. Returns a status and a one-line summary
//!
//! Category failures never fail the invocation; they show up in `outcomes`.

use std::time::Instant;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::config::LambdaConfigLoader;
use crate::error::Result;
use crate::models::RunSummary;
use crate::pipeline::run_watch;
use crate::services::{HttpFetcher, notifier};
use crate::storage::S3Storage;
use crate::utils::http::create_async_client;

/// Lambda response payload.
#[derive(Debug, Serialize)]
pub struct WatchResponse {
    /// `success` whenever the run completed, `error` if it could not start
    pub status: &'static str,

    /// One-line per-category summary
    pub summary: String,

    /// Per-category outcomes in processing order
    pub outcomes: RunSummary,

    /// Setup error, if the run could not start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl WatchResponse {
    fn completed(outcomes: RunSummary, elapsed_ms: u64) -> Self {
        Self {
            status: "success",
            summary: outcomes.summary_line(),
            outcomes,
            error: None,
            execution_time_ms: elapsed_ms,
        }
    }

    fn setup_failed(message: String, elapsed_ms: u64) -> Self {
        Self {
            status: "error",
            summary: "run did not start".to_string(),
            outcomes: RunSummary::default(),
            error: Some(message),
            execution_time_ms: elapsed_ms,
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(event: LambdaEvent<Value>) -> std::result::Result<WatchResponse, LambdaError> {
    let start = Instant::now();
    info!("Received event: {:?}", event.payload);

    match run_lambda_watch().await {
        Ok(outcomes) => {
            let response = WatchResponse::completed(outcomes, elapsed_ms(start));
            info!(
                "Watch completed in {}ms: {}",
                response.execution_time_ms, response.summary
            );
            Ok(response)
        }
        Err(e) => {
            error!("Watch could not start: {}", e);
            Ok(WatchResponse::setup_failed(e.to_string(), elapsed_ms(start)))
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Build collaborators from the environment and run all categories.
async fn run_lambda_watch() -> Result<RunSummary> {
    let storage = S3Storage::from_env().await;
    let config_key =
        std::env::var("CONFIG_S3_KEY").unwrap_or_else(|_| "config/outage-watch.toml".to_string());

    let config = LambdaConfigLoader::new(storage.clone(), &config_key)
        .load_config()
        .await?;

    let client = create_async_client(&config.http)?;
    let fetcher = HttpFetcher::new(client.clone());
    let notifier = notifier::from_config(&config.notify, client);

    run_watch(&config, &fetcher, &storage, notifier.as_ref()).await
}
