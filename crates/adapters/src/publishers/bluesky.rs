use async_trait::async_trait;
use social_scheduler_domain::{Platform, PlatformPublisher, PublishError, PublishReceipt};

use super::{ComposeFlow, ComposeTarget};

pub const BLUESKY: ComposeTarget = ComposeTarget {
    platform: Platform::Bluesky,
    compose_url: "https://bsky.app/",
    cookie_domain: "bsky.app",
    login_markers: &["/login", "/signin"],
    max_chars: 300,
    opener: Some(r#"[aria-label="Compose new post"]"#),
    editor: r#"[contenteditable="true"][role="textbox"]"#,
    submit: r#"[data-testid="composerPublishBtn"]"#,
};

/// Posts to Bluesky through the web app composer
pub struct BlueskyPublisher {
    flow: ComposeFlow,
}

impl BlueskyPublisher {
    pub fn new(flow: ComposeFlow) -> Self {
        Self { flow }
    }
}

#[async_trait]
impl PlatformPublisher for BlueskyPublisher {
    async fn publish(&self, content: &str) -> Result<PublishReceipt, PublishError> {
        self.flow.publish(&BLUESKY, content).await
    }

    fn platform(&self) -> Platform {
        Platform::Bluesky
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::StubBrowser;
    use crate::publishers::tests::flow;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_post_within_limit_is_untouched() {
        let browser = Arc::new(StubBrowser::new("https://bsky.app/"));
        let content = "b".repeat(300);
        BlueskyPublisher::new(flow(browser.clone()))
            .publish(&content)
            .await
            .unwrap();
        assert!(browser.scripts()[0].contains(&format!("\"{}\"", content)));
    }
}
