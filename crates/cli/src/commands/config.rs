//! Config command - configuration management

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::GlobalOptions;
use crate::args::{ConfigArgs, ConfigCommands};
use crate::config::AppConfig;

pub async fn execute(args: ConfigArgs, options: &GlobalOptions) -> Result<()> {
    match args.command {
        ConfigCommands::Init { path, force } => write_example(&path, force),
        ConfigCommands::Show => show_config(options),
    }
}

/// Write the example config, leaving an existing file alone unless forced
fn write_example(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (pass --force to replace it)",
            path.display()
        );
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
    }
    fs::write(path, AppConfig::example_toml())
        .with_context(|| format!("Failed to write config file {}", path.display()))?;

    println!("Wrote {}", path.display());
    println!();
    println!("Before publishing:");
    println!("  - check [store].command runs dstask on this machine");
    println!("  - start the browser control endpoint at [browser].base_url");
    println!("  - export logged-in cookies for x.com, linkedin.com and bsky.app");
    println!("  - run 'social-scheduler doctor', then try a post with --dry-run");

    Ok(())
}

fn show_config(options: &GlobalOptions) -> Result<()> {
    let config = AppConfig::load(options.config.as_deref())?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
