//! HTTP client for a browser-control endpoint

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{BrowserAutomation, BrowserError, PageSnapshot};

/// Drives a browser through `POST /open`, `POST /navigate`,
/// `POST /evaluate` and `GET /snapshot`
pub struct HttpBrowser {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
    profile: Option<String>,
}

#[derive(Serialize)]
struct UrlRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'a str>,
}

#[derive(Serialize)]
struct EvaluateRequest<'a> {
    script: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'a str>,
}

#[derive(Deserialize)]
struct EvaluateResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl HttpBrowser {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<SecretString>,
        profile: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BrowserError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrowserError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            profile: profile.filter(|p| !p.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(
                "Authorization",
                format!("Bearer {}", token.expose_secret()),
            ),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BrowserError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| BrowserError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BrowserError::Status { status, body });
        }
        Ok(response)
    }

    async fn post_url(&self, endpoint: &str, url: &str) -> Result<(), BrowserError> {
        let request = self
            .client
            .post(format!("{}/{}", self.base_url, endpoint))
            .json(&UrlRequest {
                url,
                profile: self.profile.as_deref(),
            });
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl BrowserAutomation for HttpBrowser {
    async fn open(&self, url: &str) -> Result<(), BrowserError> {
        tracing::debug!(url = %url, "Opening browser tab");
        self.post_url("open", url).await
    }

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        tracing::debug!(url = %url, "Navigating browser");
        self.post_url("navigate", url).await
    }

    async fn eval(&self, script: &str) -> Result<Value, BrowserError> {
        let request = self
            .client
            .post(format!("{}/evaluate", self.base_url))
            .json(&EvaluateRequest {
                script,
                profile: self.profile.as_deref(),
            });
        let response: EvaluateResponse = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| BrowserError::Request(e.to_string()))?;

        match response.error {
            Some(error) => Err(BrowserError::Script(error)),
            None => Ok(response.result),
        }
    }

    async fn snapshot(&self) -> Result<PageSnapshot, BrowserError> {
        let mut request = self.client.get(format!("{}/snapshot", self.base_url));
        if let Some(profile) = &self.profile {
            request = request.query(&[("profile", profile.as_str())]);
        }
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| BrowserError::Request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn browser(server: &MockServer, profile: Option<&str>) -> HttpBrowser {
        HttpBrowser::new(
            server.uri(),
            Some(SecretString::new("browser-token".into())),
            profile.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_open_sends_url_profile_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/open"))
            .and(header("Authorization", "Bearer browser-token"))
            .and(body_json(json!({"url": "https://x.com/compose/post", "profile": "social"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        browser(&server, Some("social"))
            .open("https://x.com/compose/post")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_eval_returns_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/evaluate"))
            .and(body_json(json!({"script": "1 + 1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 2})))
            .mount(&server)
            .await;

        let value = browser(&server, None).eval("1 + 1").await.unwrap();
        assert_eq!(value, json!(2));
    }

    #[tokio::test]
    async fn test_eval_script_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/evaluate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"error": "ReferenceError: foo is not defined"})),
            )
            .mount(&server)
            .await;

        let err = browser(&server, None).eval("foo").await.unwrap_err();
        assert!(matches!(err, BrowserError::Script(msg) if msg.contains("ReferenceError")));
    }

    #[tokio::test]
    async fn test_snapshot_with_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshot"))
            .and(query_param("profile", "social"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "url": "https://www.linkedin.com/feed/",
                "title": "Feed | LinkedIn"
            })))
            .mount(&server)
            .await;

        let snapshot = browser(&server, Some("social")).snapshot().await.unwrap();
        assert_eq!(snapshot.url, "https://www.linkedin.com/feed/");
        assert_eq!(snapshot.text, "");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/navigate"))
            .respond_with(ResponseTemplate::new(503).set_body_string("no browser running"))
            .mount(&server)
            .await;

        let err = browser(&server, None)
            .navigate("https://bsky.app")
            .await
            .unwrap_err();
        match err {
            BrowserError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "no browser running");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
