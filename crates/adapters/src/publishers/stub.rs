//! Publisher double for tests and dry runs

use async_trait::async_trait;
use social_scheduler_domain::{Platform, PlatformPublisher, PublishError, PublishReceipt};
use std::sync::Mutex;

/// Always succeeds or always fails, recording every payload it is given
pub struct StubPublisher {
    platform: Platform,
    failure: Option<String>,
    published: Mutex<Vec<String>>,
}

impl StubPublisher {
    pub fn succeeding(platform: Platform) -> Self {
        Self {
            platform,
            failure: None,
            published: Mutex::new(vec![]),
        }
    }

    pub fn failing(platform: Platform, reason: impl Into<String>) -> Self {
        Self {
            platform,
            failure: Some(reason.into()),
            published: Mutex::new(vec![]),
        }
    }

    /// Payloads received, including ones that were then failed
    pub fn published(&self) -> Vec<String> {
        self.published.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PlatformPublisher for StubPublisher {
    async fn publish(&self, content: &str) -> Result<PublishReceipt, PublishError> {
        if let Ok(mut published) = self.published.lock() {
            published.push(content.to_string());
        }

        match &self.failure {
            Some(reason) => Err(PublishError::Rejected(reason.clone())),
            None => {
                tracing::info!(platform = %self.platform, "Dry run: post not sent");
                Ok(PublishReceipt::default())
            }
        }
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_payloads() {
        let ok = StubPublisher::succeeding(Platform::Bluesky);
        ok.publish("one").await.unwrap();

        let bad = StubPublisher::failing(Platform::Linkedin, "session expired");
        let err = bad.publish("two").await.unwrap_err();

        assert_eq!(ok.published(), vec!["one"]);
        assert_eq!(bad.published(), vec!["two"]);
        assert_eq!(err.to_string(), "Post rejected: session expired");
    }
}
