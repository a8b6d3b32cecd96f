use async_trait::async_trait;
use social_scheduler_domain::{Platform, PlatformPublisher, PublishError, PublishReceipt};

use super::{ComposeFlow, ComposeTarget};

pub const LINKEDIN: ComposeTarget = ComposeTarget {
    platform: Platform::Linkedin,
    compose_url: "https://www.linkedin.com/feed/",
    cookie_domain: "linkedin.com",
    login_markers: &["/login", "/authwall", "/checkpoint", "/uas/"],
    max_chars: 3000,
    opener: Some("button.share-box-feed-entry__trigger"),
    editor: r#"div.ql-editor[contenteditable="true"]"#,
    submit: "button.share-actions__primary-action",
};

/// Posts to LinkedIn through the feed's share box
pub struct LinkedinPublisher {
    flow: ComposeFlow,
}

impl LinkedinPublisher {
    pub fn new(flow: ComposeFlow) -> Self {
        Self { flow }
    }
}

#[async_trait]
impl PlatformPublisher for LinkedinPublisher {
    async fn publish(&self, content: &str) -> Result<PublishReceipt, PublishError> {
        self.flow.publish(&LINKEDIN, content).await
    }

    fn platform(&self) -> Platform {
        Platform::Linkedin
    }
}
