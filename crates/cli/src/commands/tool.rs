//! Tool command - handle one tool call given as JSON

use anyhow::{Context, Result, bail};
use serde_json::Value;
use social_scheduler_domain::usecases::tool_definition;
use std::io::Read;
use std::path::Path;

use super::{GlobalOptions, build_service};
use crate::args::ToolArgs;

pub async fn execute(args: ToolArgs, options: &GlobalOptions) -> Result<()> {
    if args.schema {
        println!("{}", serde_json::to_string_pretty(&tool_definition())?);
        return Ok(());
    }

    let raw = match (&args.params, &args.file) {
        (Some(params), _) => params.clone(),
        (None, Some(path)) => read_input(path)?,
        (None, None) => bail!("Either tool parameters or --file must be provided"),
    };
    let params: Value = serde_json::from_str(&raw).context("Tool parameters are not valid JSON")?;

    let service = build_service(options)?;
    let response = service.handle_tool_call(params).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Read a file, or stdin when the path is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }
}
