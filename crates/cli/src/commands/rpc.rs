//! RPC command - dispatch a `social.*` method

use anyhow::{Context, Result};
use serde_json::{Value, json};

use super::{GlobalOptions, build_service};
use crate::args::RpcArgs;

pub async fn execute(args: RpcArgs, options: &GlobalOptions) -> Result<()> {
    let params: Value =
        serde_json::from_str(&args.params).context("RPC parameters are not valid JSON")?;

    let service = build_service(options)?;
    match service.handle_rpc(&args.method, params).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            tracing::warn!(method = %args.method, error = %e, "RPC call failed");
            let value = json!({ "ok": false, "error": e.to_string() });
            println!("{}", serde_json::to_string_pretty(&value)?);
            std::process::exit(1);
        }
    }
}
