//! `tdusers users` – list active (or inactive) users as JSON.

use anyhow::Result;
use std::sync::Arc;
use tdusers_core::config::{ApiConfig, ScanConfig};
use tdusers_core::error::ScanError;
use tdusers_core::scanner::{self, ScanMode, ScanRequest};
use tdusers_core::transport::CurlTransport;
use tdusers_core::window::Window;

use crate::cli::{ApiContext, UsersArgs};

/// Command-line values win over config.toml.
pub(crate) fn effective_scan_config(base: &ScanConfig, args: &UsersArgs) -> ScanConfig {
    ScanConfig {
        page_size: args.page_size.unwrap_or(base.page_size),
        concurrency: args.concurrency.unwrap_or(base.concurrency),
        limit: args.limit.unwrap_or(base.limit),
        interval_days: args.interval_days.unwrap_or(base.interval_days),
    }
}

pub async fn run_users(ctx: &ApiContext, args: &UsersArgs, verbose: bool) -> Result<()> {
    let scan = effective_scan_config(&ctx.cfg.scan, args);
    let request = ScanRequest {
        options: scan.options()?,
        window: Window::ending_now(scan.interval_days)?,
        mode: ScanMode::from_inverse(args.inverse),
    };
    tracing::debug!(?request, "scan request");

    let transport = Arc::new(CurlTransport::rest(&ctx.cfg.api, ctx.headers.clone()));
    let users = scanner::fetch_users(transport, &request)
        .await
        .map_err(|err| scan_failure(err, &ctx.cfg.api))?;

    println!("{}", serde_json::to_string(&users)?);
    if verbose {
        eprintln!("result size: {}", users.len());
    }
    Ok(())
}

/// Point at the timeout setting when a page request ran out of time.
pub(crate) fn scan_failure(err: ScanError, api: &ApiConfig) -> anyhow::Error {
    let timed_out = matches!(&err, ScanError::Api(e) if e.is_timeout());
    let err = anyhow::Error::new(err);
    if timed_out {
        err.context(format!(
            "user scan timed out after {}s per request; raise api.request_timeout_secs",
            api.request_timeout_secs
        ))
    } else {
        err.context("user scan failed")
    }
}
