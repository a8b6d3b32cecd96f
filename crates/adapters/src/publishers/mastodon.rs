use async_trait::async_trait;
use social_scheduler_domain::{Platform, PlatformPublisher, PublishError, PublishReceipt};

/// Mastodon has no single compose URL; posting depends on the user's instance
pub struct MastodonPublisher;

#[async_trait]
impl PlatformPublisher for MastodonPublisher {
    async fn publish(&self, _content: &str) -> Result<PublishReceipt, PublishError> {
        Err(PublishError::NotSupported("Mastodon".to_string()))
    }

    fn platform(&self) -> Platform {
        Platform::Mastodon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_not_supported() {
        let err = MastodonPublisher.publish("toot").await.unwrap_err();
        assert_eq!(err.to_string(), "Mastodon publishing is not supported");
    }
}
