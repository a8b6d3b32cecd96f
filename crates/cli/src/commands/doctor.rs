//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use social_scheduler_adapters::browser::BrowserAutomation;
use social_scheduler_adapters::cookies::CookieJar;
use social_scheduler_domain::{Platform, TaskStore};

use super::{GlobalOptions, build_browser, build_store};
use crate::args::{DoctorArgs, StoreKind};
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    store: CheckResult,
    browser: CheckResult,
    cookies: CheckResult,
    platforms: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, options: &GlobalOptions) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        store: CheckResult::error("Not checked"),
        browser: CheckResult::error("Not checked"),
        cookies: CheckResult::error("Not checked"),
        platforms: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(options.config.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.store = check_store(config, options.store).await;
        report.platforms = check_platforms(config);

        if options.dry_run {
            report.browser = CheckResult::ok("Dry run: browser not used");
            report.cookies = CheckResult::ok("Dry run: cookies not used");
        } else {
            report.browser = check_browser(config).await;
            report.cookies = check_cookies(config).await;
        }
    }

    // Determine overall status
    let checks = [
        &report.config,
        &report.store,
        &report.browser,
        &report.cookies,
        &report.platforms,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_store(config: &AppConfig, kind: StoreKind) -> CheckResult {
    let store = match build_store(config, kind) {
        Ok(store) => store,
        Err(e) => return CheckResult::error(format!("{:#}", e)),
    };

    let args = vec!["next".to_string(), "+social".to_string()];
    match store.query(&args).await {
        Ok(records) => CheckResult::ok(format!(
            "Store: {:?}, command: {}, {} open post(s)",
            kind,
            config.store.command,
            records.len()
        )),
        Err(e) => CheckResult::error(format!("Store: {:?}, {}", kind, e)),
    }
}

async fn check_browser(config: &AppConfig) -> CheckResult {
    let browser = match build_browser(config) {
        Ok(browser) => browser,
        Err(e) => return CheckResult::error(format!("{:#}", e)),
    };

    let token = if config.browser.token().is_some() {
        "set"
    } else {
        "not set"
    };

    match browser.snapshot().await {
        Ok(snapshot) => CheckResult::ok(format!(
            "Endpoint: {}, token: {} ({})",
            browser.base_url(),
            config.browser.token_env,
            token
        ))
        .with_details(serde_json::json!({ "url": snapshot.url, "title": snapshot.title })),
        Err(e) => CheckResult::warn(format!(
            "Endpoint: {} unreachable: {}",
            browser.base_url(),
            e
        )),
    }
}

async fn check_cookies(config: &AppConfig) -> CheckResult {
    let jar = CookieJar::new(config.cookies.paths.clone());
    let Some(path) = jar.resolve_path().map(|p| p.display().to_string()) else {
        return CheckResult::warn("No cookie file found; publishing will likely hit login pages");
    };

    let store = jar.load().await;
    let mut domains: Vec<&String> = store.keys().collect();
    domains.sort();

    if domains.is_empty() {
        CheckResult::warn(format!("Cookie file {} has no usable cookies", path))
    } else {
        CheckResult::ok(format!("Cookie file: {}, {} domain(s)", path, domains.len()))
            .with_details(serde_json::json!({ "domains": domains }))
    }
}

fn check_platforms(config: &AppConfig) -> CheckResult {
    let enabled = config.platforms.enabled();
    if enabled.is_empty() {
        return CheckResult::error("No platforms enabled");
    }

    let names: Vec<&str> = enabled.iter().map(Platform::as_str).collect();
    if enabled.contains(&Platform::Mastodon) {
        CheckResult::warn(format!(
            "Enabled: {} (mastodon publishing is not supported)",
            names.join(", ")
        ))
    } else {
        CheckResult::ok(format!("Enabled: {}", names.join(", ")))
    }
}

fn print_report(report: &DoctorReport) {
    println!("social-scheduler Doctor Report");
    println!("==============================");
    println!();

    print_check("Config", &report.config);
    print_check("Task Store", &report.store);
    print_check("Browser", &report.browser);
    print_check("Cookies", &report.cookies);
    print_check("Platforms", &report.platforms);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
