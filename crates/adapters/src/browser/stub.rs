use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{BrowserAutomation, BrowserError, PageSnapshot};

/// A call recorded by [`StubBrowser`]
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCall {
    Open(String),
    Navigate(String),
    Eval(String),
    Snapshot,
}

/// Scripted browser that records every call
pub struct StubBrowser {
    calls: Mutex<Vec<BrowserCall>>,
    eval_results: Mutex<VecDeque<Result<Value, String>>>,
    snapshot: PageSnapshot,
}

impl StubBrowser {
    /// A browser whose page is `url` and whose scripts all report success
    pub fn new(url: &str) -> Self {
        Self {
            calls: Mutex::new(vec![]),
            eval_results: Mutex::new(VecDeque::new()),
            snapshot: PageSnapshot {
                url: url.to_string(),
                title: String::new(),
                text: String::new(),
            },
        }
    }

    pub fn with_snapshot(mut self, snapshot: PageSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Queue the result of the next unscripted `eval`
    pub fn push_eval(&self, result: Result<Value, String>) {
        if let Ok(mut results) = self.eval_results.lock() {
            results.push_back(result);
        }
    }

    pub fn calls(&self) -> Vec<BrowserCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Scripts passed to `eval`, in order
    pub fn scripts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BrowserCall::Eval(script) => Some(script),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BrowserCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl BrowserAutomation for StubBrowser {
    async fn open(&self, url: &str) -> Result<(), BrowserError> {
        self.record(BrowserCall::Open(url.to_string()));
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.record(BrowserCall::Navigate(url.to_string()));
        Ok(())
    }

    async fn eval(&self, script: &str) -> Result<Value, BrowserError> {
        self.record(BrowserCall::Eval(script.to_string()));
        let next = self
            .eval_results
            .lock()
            .ok()
            .and_then(|mut results| results.pop_front());
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(BrowserError::Script(message)),
            None => Ok(json!({ "ok": true })),
        }
    }

    async fn snapshot(&self) -> Result<PageSnapshot, BrowserError> {
        self.record(BrowserCall::Snapshot);
        Ok(self.snapshot.clone())
    }
}
