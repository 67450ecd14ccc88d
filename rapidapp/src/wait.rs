//! Polling loops for asynchronous database state transitions

use std::future::Future;
use std::time::Duration;

use tfplug::Context;
use thiserror::Error;

use crate::api::{ApiError, Client, PostgresDatabase};

#[derive(Debug, Clone)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("{0}")]
    Timeout(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout(_))
    }
}

enum Poll<T> {
    Done(T),
    Pending,
    Failed(ApiError),
}

/// Polls `get(id)` until the database reports `running`.
pub async fn wait_for_ready(
    ctx: &Context,
    client: &Client,
    id: &str,
    config: &WaitConfig,
) -> Result<PostgresDatabase, WaitError> {
    let what = format!("database {} to be ready", id);
    poll_until(ctx, config, &what, move || async move {
        match client.postgres().get(id).await {
            Ok(db) if db.is_running() => Poll::Done(db),
            Ok(db) => {
                tracing::debug!(id, status = %db.status, "database not ready yet");
                Poll::Pending
            }
            Err(e) => classify(id, e),
        }
    })
    .await
}

/// Polls `get(id)` until the API reports the database as not found.
pub async fn wait_for_deleted(
    ctx: &Context,
    client: &Client,
    id: &str,
    config: &WaitConfig,
) -> Result<(), WaitError> {
    let what = format!("database {} to be deleted", id);
    poll_until(ctx, config, &what, move || async move {
        match client.postgres().get(id).await {
            Ok(db) => {
                tracing::debug!(id, status = %db.status, "database still present");
                Poll::Pending
            }
            Err(e) if e.is_not_found() => Poll::Done(()),
            Err(e) => classify(id, e),
        }
    })
    .await
}

// Transient API errors are retried on the next tick; bad credentials never recover.
fn classify<T>(id: &str, e: ApiError) -> Poll<T> {
    match e {
        ApiError::Auth => Poll::Failed(e),
        e => {
            tracing::debug!(id, error = %e, "ignoring error while polling");
            Poll::Pending
        }
    }
}

async fn poll_until<T, F, Fut>(
    ctx: &Context,
    config: &WaitConfig,
    what: &str,
    mut check: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Poll<T>>,
{
    let ctx = ctx.with_timeout(config.timeout);
    let stopped = |ctx: &Context| {
        if ctx.deadline_exceeded() {
            WaitError::Timeout(format!("timeout waiting for {}", what))
        } else {
            WaitError::Cancelled
        }
    };

    loop {
        let outcome = tokio::select! {
            _ = ctx.cancelled() => return Err(stopped(&ctx)),
            outcome = check() => outcome,
        };

        match outcome {
            Poll::Done(value) => return Ok(value),
            Poll::Failed(e) => return Err(e.into()),
            Poll::Pending => {}
        }

        tokio::select! {
            _ = ctx.cancelled() => return Err(stopped(&ctx)),
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}
