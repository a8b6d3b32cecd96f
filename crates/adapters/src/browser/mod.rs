//! Browser automation client
//!
//! Publishing drives a logged-in browser session: open a compose page, replay
//! cookies, run a script that fills and submits the form. The browser itself
//! lives behind an HTTP control endpoint.

mod http;
#[cfg(test)]
mod stub;

pub use http::HttpBrowser;
#[cfg(test)]
pub(crate) use stub::{BrowserCall, StubBrowser};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Browser request failed: {0}")]
    Request(String),
    #[error("Browser endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Script failed: {0}")]
    Script(String),
}

/// What the current page looks like
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Visible text, possibly truncated by the endpoint
    #[serde(default)]
    pub text: String,
}

#[async_trait]
pub trait BrowserAutomation: Send + Sync {
    /// Open a tab on `url`
    async fn open(&self, url: &str) -> Result<(), BrowserError>;

    /// Navigate the current tab
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Evaluate a script in the page and return its JSON result
    async fn eval(&self, script: &str) -> Result<Value, BrowserError>;

    async fn snapshot(&self) -> Result<PageSnapshot, BrowserError>;
}
