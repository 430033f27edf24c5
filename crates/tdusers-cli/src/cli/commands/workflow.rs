//! `tdusers workflow ...` – list, run and check Treasure Workflow sessions.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tdusers_core::config::WorkflowConfig;
use tdusers_core::error::WorkflowError;
use tdusers_core::transport::CurlTransport;
use tdusers_core::workflow::{
    offset_hours, AbortToken, PollOptions, Poller, SystemClock, WorkflowApi, WorkflowTarget,
};

use crate::cli::ApiContext;

/// Arguments of `tdusers workflow run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub id: Option<String>,
    pub name: Option<String>,
    pub params: Vec<String>,
    pub wait: bool,
    pub poll_interval: Option<u64>,
    pub timeout: Option<u64>,
}

fn workflow_api(ctx: &ApiContext) -> Result<WorkflowApi> {
    let hours = ctx.cfg.workflow.timezone_offset_hours;
    let offset = offset_hours(hours)
        .with_context(|| format!("workflow.timezone_offset_hours out of range: {hours}"))?;
    let transport = Arc::new(CurlTransport::workflow(&ctx.cfg.api, ctx.headers.clone()));
    Ok(WorkflowApi::new(transport, offset))
}

/// Run a blocking workflow call off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, WorkflowError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow!("workflow task join: {}", e))?
        .map_err(report)
}

/// Print failure details to stderr before turning the error into anyhow.
fn report(err: WorkflowError) -> anyhow::Error {
    if let WorkflowError::Failed { session } = &err {
        if let Ok(details) = serde_json::to_string_pretty(session) {
            eprintln!("{details}");
        }
    }
    err.into()
}

/// Parse repeated `--param key=value` flags.
pub(crate) fn parse_params(raw: &[String]) -> Result<Map<String, Value>> {
    let mut params = Map::new();
    for item in raw {
        let Some((key, value)) = item.split_once('=') else {
            bail!("--param expects KEY=VALUE, got {item:?}");
        };
        if key.is_empty() {
            bail!("--param key is empty in {item:?}");
        }
        params.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(params)
}

pub(crate) fn target_of(opts: &RunOptions) -> Result<WorkflowTarget> {
    match (&opts.id, &opts.name) {
        (Some(id), _) => Ok(WorkflowTarget::Id(id.clone())),
        (None, Some(name)) => Ok(WorkflowTarget::parse_name(name)?),
        (None, None) => bail!("give either --id or --name to identify the workflow"),
    }
}

/// `--poll-interval` / `--timeout` over `[workflow]` in config.toml.
pub(crate) fn poll_options(cfg: &WorkflowConfig, opts: &RunOptions) -> Result<PollOptions> {
    Ok(PollOptions::new(
        Duration::from_secs(opts.poll_interval.unwrap_or(cfg.poll_interval_secs)),
        Duration::from_secs(opts.timeout.unwrap_or(cfg.poll_timeout_secs)),
    )?)
}

pub async fn run_list(ctx: &ApiContext) -> Result<()> {
    let api = workflow_api(ctx)?;
    let workflows = blocking(move || api.workflows()).await?;
    println!("{}", serde_json::to_string_pretty(&workflows)?);
    Ok(())
}

pub async fn run_sessions(ctx: &ApiContext) -> Result<()> {
    let api = workflow_api(ctx)?;
    let sessions = blocking(move || api.sessions()).await?;
    println!("{}", serde_json::to_string_pretty(&sessions)?);
    Ok(())
}

pub async fn run_workflow(ctx: &ApiContext, opts: RunOptions) -> Result<()> {
    let api = workflow_api(ctx)?;
    let target = target_of(&opts)?;
    let params = parse_params(&opts.params)?;
    let poll = poll_options(&ctx.cfg.workflow, &opts)?;

    if !opts.wait {
        let session_id = blocking(move || api.run_workflow(&target, &params)).await?;
        println!("{session_id}");
        return Ok(());
    }

    let abort = AbortToken::new();
    let on_ctrl_c = abort.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; stopping workflow poll");
            on_ctrl_c.abort();
        }
    });

    let result = blocking(move || {
        let clock = SystemClock;
        let poller = Poller::new(poll, &clock, abort);
        api.run_workflow_and_wait(&target, &params, &poller)
    })
    .await;
    ctrl_c.abort();

    let session = result?;
    println!("{}", session.id);
    tracing::info!(session = %session.id, "workflow succeeded");
    Ok(())
}

pub async fn run_check(ctx: &ApiContext, session_id: &str) -> Result<()> {
    let api = workflow_api(ctx)?;
    let id = session_id.to_string();
    let session = blocking(move || api.check_failed(&id)).await?;
    println!("session {} {}", session.id, session.status_label());
    Ok(())
}
