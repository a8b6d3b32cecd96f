//! Session cookie replay for browser publishing
//!
//! Cookies are exported per domain into a JSON file
//! (`{"x.com": [{"name": ..., "value": ...}]}`) and replayed into the page
//! through `document.cookie`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

use crate::browser::BrowserAutomation;

const COOKIE_FILE: &str = "cookies-for-browser.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Unix seconds; zero or negative means a session cookie
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

pub type CookieStore = HashMap<String, Vec<Cookie>>;

/// Cookie file loader with a cached parse
pub struct CookieJar {
    paths: Vec<PathBuf>,
    cache: Mutex<Option<Arc<CookieStore>>>,
}

impl CookieJar {
    /// Candidate paths are tried in order; the first existing one wins
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            cache: Mutex::new(None),
        }
    }

    /// `~/openclaw/cookies/…`, then the legacy `~/clawd/cookies/…`
    pub fn default_paths() -> Vec<PathBuf> {
        let Some(home) = dirs::home_dir() else {
            return vec![];
        };
        vec![
            home.join("openclaw").join("cookies").join(COOKIE_FILE),
            home.join("clawd").join("cookies").join(COOKIE_FILE),
        ]
    }

    /// First candidate path that exists
    pub fn resolve_path(&self) -> Option<&Path> {
        self.paths.iter().map(PathBuf::as_path).find(|p| p.exists())
    }

    /// Forget the cached store; the next load reads the file again
    pub fn reset(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
    }

    /// Parsed cookie store. Failures read as an empty store and are not cached.
    pub async fn load(&self) -> Arc<CookieStore> {
        if let Some(store) = self.cache.lock().ok().and_then(|c| c.clone()) {
            return store;
        }

        match self.read().await {
            Ok(store) => {
                let store = Arc::new(store);
                if let Ok(mut cache) = self.cache.lock() {
                    *cache = Some(Arc::clone(&store));
                }
                store
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load cookies");
                Arc::new(CookieStore::new())
            }
        }
    }

    async fn read(&self) -> Result<CookieStore, String> {
        let path = self
            .resolve_path()
            .ok_or_else(|| format!("no cookie file at {}", self.describe_paths()))?;
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        serde_json::from_str(&raw).map_err(|e| format!("{}: {}", path.display(), e))
    }

    fn describe_paths(&self) -> String {
        self.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub async fn cookies_for(&self, domain: &str) -> Vec<Cookie> {
        self.load().await.get(domain).cloned().unwrap_or_default()
    }

    /// Replay the domain's cookies into the current page, returning how many were set.
    ///
    /// HttpOnly cookies cannot be written from script and are skipped. A
    /// cookie the browser rejects is logged and skipped.
    pub async fn apply(&self, browser: &dyn BrowserAutomation, domain: &str) -> usize {
        let cookies = self.cookies_for(domain).await;
        if cookies.is_empty() {
            tracing::warn!(domain = %domain, "No cookies found");
            return 0;
        }

        let mut applied = 0;
        for cookie in cookies.iter().filter(|c| !c.http_only) {
            let script = cookie_script(cookie);
            match browser.eval(&script).await {
                Ok(_) => applied += 1,
                Err(e) => {
                    tracing::warn!(domain = %domain, cookie = %cookie.name, error = %e, "Could not set cookie");
                }
            }
        }

        tracing::debug!(domain = %domain, applied = applied, total = cookies.len(), "Replayed cookies");
        applied
    }
}

/// Script assigning one cookie through `document.cookie`
pub fn cookie_script(cookie: &Cookie) -> String {
    let literal = serde_json::to_string(&format_cookie(cookie))
        .unwrap_or_else(|_| "\"\"".to_string());
    format!("document.cookie = {};", literal)
}

/// `document.cookie` assignment string for a cookie
pub fn format_cookie(cookie: &Cookie) -> String {
    let mut parts = vec![
        format!("{}={}", cookie.name, cookie.value),
        format!("path={}", cookie.path),
        format!("domain={}", cookie.domain),
    ];

    if let Some(expires) = cookie.expires.filter(|e| *e > 0.0).and_then(http_date) {
        parts.push(format!("expires={}", expires));
    }
    if cookie.secure {
        parts.push("secure".to_string());
    }
    if let Some(same_site) = cookie
        .same_site
        .as_deref()
        .filter(|s| !s.is_empty() && *s != "Unspecified")
    {
        parts.push(format!("samesite={}", same_site));
    }

    parts.join("; ")
}

fn http_date(unix_seconds: f64) -> Option<String> {
    let format = time::format_description::parse(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT",
    )
    .ok()?;
    OffsetDateTime::from_unix_timestamp(unix_seconds as i64)
        .ok()?
        .format(&format)
        .ok()
}
