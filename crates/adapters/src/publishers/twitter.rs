use async_trait::async_trait;
use social_scheduler_domain::{Platform, PlatformPublisher, PublishError, PublishReceipt};

use super::{ComposeFlow, ComposeTarget};

pub const TWITTER: ComposeTarget = ComposeTarget {
    platform: Platform::Twitter,
    compose_url: "https://x.com/compose/post",
    cookie_domain: "x.com",
    login_markers: &["/login", "/i/flow/login", "/logout"],
    max_chars: 280,
    opener: None,
    editor: r#"[data-testid="tweetTextarea_0"]"#,
    submit: r#"[data-testid="tweetButton"]"#,
};

/// Posts to X through its web composer
pub struct TwitterPublisher {
    flow: ComposeFlow,
}

impl TwitterPublisher {
    pub fn new(flow: ComposeFlow) -> Self {
        Self { flow }
    }
}

#[async_trait]
impl PlatformPublisher for TwitterPublisher {
    async fn publish(&self, content: &str) -> Result<PublishReceipt, PublishError> {
        self.flow.publish(&TWITTER, content).await
    }

    fn platform(&self) -> Platform {
        Platform::Twitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserCall, StubBrowser};
    use crate::publishers::tests::flow;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_long_post_truncated_to_280() {
        let browser = Arc::new(StubBrowser::new("https://x.com/compose/post"));
        let publisher = TwitterPublisher::new(flow(browser.clone()));

        publisher.publish(&"a".repeat(300)).await.unwrap();

        let expected = format!("\"{}…\"", "a".repeat(279));
        assert!(browser.scripts()[0].contains(&expected));
        assert_eq!(
            browser.calls()[0],
            BrowserCall::Open("https://x.com/compose/post".to_string())
        );
    }
}
