//! Platform publishers
//!
//! Twitter, LinkedIn and Bluesky share one compose flow over a logged-in
//! browser; each platform contributes a [`ComposeTarget`] describing where
//! its composer lives. Mastodon needs an instance and is not supported.

mod bluesky;
mod linkedin;
mod mastodon;
mod stub;
mod twitter;

pub use bluesky::BlueskyPublisher;
pub use linkedin::LinkedinPublisher;
pub use mastodon::MastodonPublisher;
pub use stub::StubPublisher;
pub use twitter::TwitterPublisher;

use serde::Deserialize;
use serde_json::Value;
use social_scheduler_domain::{Platform, PlatformPublisher, PublishError, PublishReceipt};
use std::sync::Arc;
use std::time::Duration;

use crate::browser::BrowserAutomation;
use crate::cookies::CookieJar;

/// Where and how a platform's composer is driven
#[derive(Debug, Clone, Copy)]
pub struct ComposeTarget {
    pub platform: Platform,
    pub compose_url: &'static str,
    /// Key into the cookie file
    pub cookie_domain: &'static str,
    /// URL fragments that mean the session landed on a login page
    pub login_markers: &'static [&'static str],
    pub max_chars: usize,
    /// Button that reveals the editor, when the compose URL does not
    pub opener: Option<&'static str>,
    pub editor: &'static str,
    pub submit: &'static str,
}

#[derive(Debug, Deserialize)]
struct ComposeResult {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Browser session plus cookies, shared by the browser-driven publishers
#[derive(Clone)]
pub struct ComposeFlow {
    browser: Arc<dyn BrowserAutomation>,
    cookies: Arc<CookieJar>,
    settle: Duration,
}

impl ComposeFlow {
    pub fn new(browser: Arc<dyn BrowserAutomation>, cookies: Arc<CookieJar>) -> Self {
        Self {
            browser,
            cookies,
            settle: Duration::from_secs(2),
        }
    }

    /// Pause after navigation before inspecting the page
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub async fn publish(
        &self,
        target: &ComposeTarget,
        content: &str,
    ) -> Result<PublishReceipt, PublishError> {
        let platform = target.platform;
        let text = truncate(content, target.max_chars);
        if text.chars().count() < content.chars().count() {
            tracing::info!(platform = %platform, max_chars = target.max_chars, "Truncated post to platform limit");
        }

        self.browser
            .open(target.compose_url)
            .await
            .map_err(browser_error)?;
        self.cookies
            .apply(self.browser.as_ref(), target.cookie_domain)
            .await;
        self.browser
            .navigate(target.compose_url)
            .await
            .map_err(browser_error)?;
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let snapshot = self.browser.snapshot().await.map_err(browser_error)?;
        if target
            .login_markers
            .iter()
            .any(|marker| snapshot.url.contains(marker))
        {
            return Err(PublishError::NotLoggedIn(platform.to_string()));
        }

        let value = self
            .browser
            .eval(&compose_script(target, &text))
            .await
            .map_err(browser_error)?;
        let result = parse_compose_result(value)?;

        tracing::info!(platform = %platform, url = ?result.url, "Submitted post");
        Ok(PublishReceipt { url: result.url })
    }
}

fn browser_error(e: crate::browser::BrowserError) -> PublishError {
    PublishError::Browser(e.to_string())
}

fn parse_compose_result(value: Value) -> Result<ComposeResult, PublishError> {
    let result: ComposeResult = serde_json::from_value(value)
        .map_err(|e| PublishError::Browser(format!("Unexpected compose result: {}", e)))?;
    if !result.ok {
        return Err(PublishError::Rejected(
            result
                .error
                .unwrap_or_else(|| "compose script reported failure".to_string()),
        ));
    }
    Ok(result)
}

/// Cut `text` to at most `max_chars` characters, ending in an ellipsis when cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

const COMPOSE_SCRIPT: &str = r#"(async () => {
  const sleep = (ms) => new Promise((resolve) => setTimeout(resolve, ms));
  const waitFor = async (selector) => {
    for (let i = 0; i < 40; i++) {
      const el = document.querySelector(selector);
      if (el) return el;
      await sleep(250);
    }
    return null;
  };
  const opener = __OPENER__;
  if (opener) {
    const button = await waitFor(opener);
    if (!button) return { ok: false, error: "Compose button not found" };
    button.click();
  }
  const editor = await waitFor(__EDITOR__);
  if (!editor) return { ok: false, error: "Editor not found" };
  editor.focus();
  const text = __TEXT__;
  if ("value" in editor) {
    editor.value = text;
    editor.dispatchEvent(new Event("input", { bubbles: true }));
  } else {
    document.execCommand("insertText", false, text);
  }
  const submit = await waitFor(__SUBMIT__);
  if (!submit) return { ok: false, error: "Submit button not found" };
  if (submit.disabled || submit.getAttribute("aria-disabled") === "true") {
    return { ok: false, error: "Submit button is disabled" };
  }
  submit.click();
  await sleep(1500);
  return { ok: true, url: location.href };
})()"#;

/// Script that fills the composer with `text` and submits it
pub fn compose_script(target: &ComposeTarget, text: &str) -> String {
    let literal = |value: &str| serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string());
    let opener = target.opener.map(literal).unwrap_or_else(|| "null".to_string());

    // Text goes in last so its contents are never scanned for placeholders
    COMPOSE_SCRIPT
        .replace("__OPENER__", &opener)
        .replace("__EDITOR__", &literal(target.editor))
        .replace("__SUBMIT__", &literal(target.submit))
        .replace("__TEXT__", &literal(text))
}

/// Publisher for `platform` driving the shared compose flow
pub fn browser_publisher(platform: Platform, flow: ComposeFlow) -> Arc<dyn PlatformPublisher> {
    match platform {
        Platform::Twitter => Arc::new(TwitterPublisher::new(flow)),
        Platform::Linkedin => Arc::new(LinkedinPublisher::new(flow)),
        Platform::Bluesky => Arc::new(BlueskyPublisher::new(flow)),
        Platform::Mastodon => Arc::new(MastodonPublisher),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::browser::{BrowserCall, PageSnapshot, StubBrowser};
    use serde_json::json;

    pub(crate) fn flow(browser: Arc<StubBrowser>) -> ComposeFlow {
        ComposeFlow::new(browser, Arc::new(CookieJar::new(vec![]))).with_settle(Duration::ZERO)
    }

    const TARGET: ComposeTarget = ComposeTarget {
        platform: Platform::Twitter,
        compose_url: "https://example.test/compose",
        cookie_domain: "example.test",
        login_markers: &["/login"],
        max_chars: 10,
        opener: None,
        editor: "#editor",
        submit: "#submit",
    };

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("héllo wörld", 6), "héllo…");
        assert_eq!(truncate("abc", 0), "…");
    }

    #[test]
    fn test_compose_script_embeds_text_as_literal() {
        let script = compose_script(&TARGET, "say \"hi\" __SUBMIT__\n");
        assert!(script.contains(r#"const text = "say \"hi\" __SUBMIT__\n";"#));
        assert!(script.contains(r##"waitFor("#submit")"##));
        assert!(script.contains("const opener = null;"));
    }

    #[tokio::test]
    async fn test_flow_order_and_receipt() {
        let browser = Arc::new(StubBrowser::new("https://example.test/compose"));
        browser.push_eval(Ok(json!({"ok": true, "url": "https://example.test/p/1"})));

        let receipt = flow(browser.clone())
            .publish(&TARGET, "hello there world")
            .await
            .unwrap();

        assert_eq!(receipt.url.as_deref(), Some("https://example.test/p/1"));
        let calls = browser.calls();
        assert_eq!(calls[0], BrowserCall::Open("https://example.test/compose".to_string()));
        assert_eq!(calls[1], BrowserCall::Navigate("https://example.test/compose".to_string()));
        assert_eq!(calls[2], BrowserCall::Snapshot);
        assert!(browser.scripts()[0].contains(r#""hello the…""#));
    }

    #[tokio::test]
    async fn test_login_wall_is_not_logged_in() {
        let browser = Arc::new(StubBrowser::new("").with_snapshot(PageSnapshot {
            url: "https://example.test/login?next=/compose".to_string(),
            ..Default::default()
        }));

        let err = flow(browser.clone()).publish(&TARGET, "hi").await.unwrap_err();
        assert!(matches!(err, PublishError::NotLoggedIn(p) if p == "twitter"));
        assert!(browser.scripts().is_empty());
    }

    #[tokio::test]
    async fn test_script_failure_is_rejected() {
        let browser = Arc::new(StubBrowser::new("https://example.test/compose"));
        browser.push_eval(Ok(json!({"ok": false, "error": "Submit button is disabled"})));

        let err = flow(browser).publish(&TARGET, "hi").await.unwrap_err();
        assert_eq!(err.to_string(), "Post rejected: Submit button is disabled");
    }

    #[tokio::test]
    async fn test_eval_error_is_browser_error() {
        let browser = Arc::new(StubBrowser::new("https://example.test/compose"));
        browser.push_eval(Err("target closed".to_string()));

        let err = flow(browser).publish(&TARGET, "hi").await.unwrap_err();
        assert!(matches!(err, PublishError::Browser(msg) if msg.contains("target closed")));
    }
}
