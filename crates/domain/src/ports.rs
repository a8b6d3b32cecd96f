//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{Platform, TaskRecord};

/// Error type for task store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task store unavailable: {0}")]
    Unavailable(String),
    #[error("Task store command failed ({status}): {stderr}")]
    CommandFailed { status: String, stderr: String },
    #[error("Could not parse task store output: {0}")]
    Parse(String),
}

/// Port for the external tagged-task store.
///
/// Arguments follow the store's command line: a verb, then an ID or summary,
/// then tag deltas (`+tag`, `-tag`) and `field:value` pairs.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Run a mutation command and return its text output
    async fn run(&self, args: &[String]) -> Result<String, StoreError>;

    /// Run a query command and return the records embedded in its output
    async fn query(&self, args: &[String]) -> Result<Vec<TaskRecord>, StoreError>;
}

/// Error type for platform publishing
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{0} publishing is not supported")]
    NotSupported(String),
    #[error("Not logged in to {0}")]
    NotLoggedIn(String),
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Post rejected: {0}")]
    Rejected(String),
}

/// Result of a successful platform publish
#[derive(Debug, Clone, Default)]
pub struct PublishReceipt {
    /// URL of the published post, if the platform revealed one
    pub url: Option<String>,
}

/// Port for delivering a post to one destination platform
#[async_trait]
pub trait PlatformPublisher: Send + Sync {
    /// Deliver the content, returning a receipt or the reason it failed
    async fn publish(&self, content: &str) -> Result<PublishReceipt, PublishError>;

    /// Platform this publisher delivers to
    fn platform(&self) -> Platform;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
