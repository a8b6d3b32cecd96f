//! Subcommand implementations and the wiring they share

pub mod config;
pub mod doctor;
pub mod posts;
pub mod rpc;
pub mod tool;

use anyhow::{Context, Result};
use social_scheduler_adapters::browser::{BrowserAutomation, HttpBrowser};
use social_scheduler_adapters::cookies::CookieJar;
use social_scheduler_adapters::publishers::{ComposeFlow, StubPublisher, browser_publisher};
use social_scheduler_adapters::store::{DstaskStore, InMemoryTaskStore, StoreLauncher};
use social_scheduler_domain::usecases::{PublisherRegistry, SocialService};
use social_scheduler_domain::{SystemClock, TaskStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::args::StoreKind;
use crate::config::AppConfig;

/// Flags accepted by every subcommand
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub store: StoreKind,
    pub dry_run: bool,
}

pub type Service = SocialService<dyn TaskStore, SystemClock>;

pub fn build_store(config: &AppConfig, kind: StoreKind) -> Result<Arc<dyn TaskStore>> {
    Ok(match kind {
        StoreKind::Memory => Arc::new(InMemoryTaskStore::new()),
        StoreKind::Dstask => {
            let launcher = StoreLauncher::new(
                config.store.command.clone(),
                config.store.args.clone(),
                config.store.mise_mode()?,
            );
            Arc::new(DstaskStore::new(
                Arc::new(launcher),
                config.store.parse_mode(),
            ))
        }
    })
}

pub fn build_browser(config: &AppConfig) -> Result<HttpBrowser> {
    HttpBrowser::new(
        config.browser.base_url.clone(),
        config.browser.token(),
        config.browser.profile.clone(),
        Duration::from_secs(config.browser.timeout_secs),
    )
    .context("Failed to initialize browser client")
}

/// Publishers for every enabled platform; stubs under dry-run
pub fn build_registry(config: &AppConfig, dry_run: bool) -> Result<PublisherRegistry> {
    let mut registry = PublisherRegistry::new();
    let enabled = config.platforms.enabled();

    if dry_run {
        for platform in enabled {
            registry.register(Arc::new(StubPublisher::succeeding(platform)));
        }
        return Ok(registry);
    }

    let browser: Arc<dyn BrowserAutomation> = Arc::new(build_browser(config)?);
    let cookies = Arc::new(CookieJar::new(config.cookies.paths.clone()));
    let flow = ComposeFlow::new(browser, cookies)
        .with_settle(Duration::from_millis(config.browser.settle_ms));

    for platform in enabled {
        registry.register(browser_publisher(platform, flow.clone()));
    }
    Ok(registry)
}

pub fn build_service(options: &GlobalOptions) -> Result<Service> {
    let config = AppConfig::load(options.config.as_deref())?;
    let store = build_store(&config, options.store)?;
    let registry = build_registry(&config, options.dry_run)?;

    tracing::debug!(
        store = ?options.store,
        dry_run = options.dry_run,
        platforms = ?registry.platforms(),
        "Built social service"
    );

    Ok(SocialService::new(store, Arc::new(SystemClock), registry))
}
