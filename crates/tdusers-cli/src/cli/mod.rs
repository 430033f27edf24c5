//! CLI for tdusers.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tdusers_core::config::{self, TdConfig};
use tdusers_core::transport::RequestHeaders;

use commands::{
    run_check, run_completions, run_list, run_sessions, run_users, run_workflow, RunOptions,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tdusers")]
#[command(
    about = "List active/inactive Treasure Data users and run Treasure Workflow sessions",
    long_about = None
)]
pub struct Cli {
    /// Print progress log to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API key; overrides TD_API_KEY and api.api_key in config.toml.
    #[arg(long, global = true, value_name = "KEY")]
    pub apikey: Option<String>,

    /// Config file (default: ~/.config/tdusers/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List users who ran a job within the interval (or, with --inverse, who did not).
    Users(UsersArgs),

    /// Treasure Workflow operations.
    Workflow {
        #[command(subcommand)]
        command: WorkflowCommand,
    },

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

/// Flags of `tdusers users`; unset values come from config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct UsersArgs {
    /// List inactive users instead.
    #[arg(short = 'r', long)]
    pub inverse: bool,

    /// Days of job history that make a user active.
    #[arg(short, long, value_name = "DAYS")]
    pub interval_days: Option<u32>,

    /// Jobs per API request.
    #[arg(short, long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Maximum job offset to scan.
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Number of concurrent requests.
    #[arg(short, long, value_name = "N")]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum WorkflowCommand {
    /// List registered workflows.
    List,

    /// Show workflow session history.
    Sessions,

    /// Start a workflow and print its session id.
    Run {
        /// Workflow id. Ids change when a project is re-pushed; prefer --name.
        #[arg(long, conflicts_with = "name", required_unless_present = "name")]
        id: Option<String>,

        /// Workflow as project_name.workflow_name.
        #[arg(long, value_name = "PROJECT.WORKFLOW")]
        name: Option<String>,

        /// Session parameter; repeatable.
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Wait for the session to finish and fail if it did not succeed.
        #[arg(long)]
        wait: bool,

        /// Seconds between status checks while waiting.
        #[arg(long, value_name = "SECS")]
        poll_interval: Option<u64>,

        /// Give up waiting after this many seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Fail unless the session's last attempt succeeded.
    Check {
        /// Session identifier.
        session_id: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let Cli {
            verbose,
            apikey,
            config,
            command,
        } = self;
        // Config and credentials are resolved before any request goes out.
        let context = || ApiContext::load(config.as_deref(), apikey.as_deref());

        match command {
            CliCommand::Users(args) => run_users(&context()?, &args, verbose).await?,
            CliCommand::Workflow { command } => match command {
                WorkflowCommand::List => run_list(&context()?).await?,
                WorkflowCommand::Sessions => run_sessions(&context()?).await?,
                WorkflowCommand::Run {
                    id,
                    name,
                    params,
                    wait,
                    poll_interval,
                    timeout,
                } => {
                    let opts = RunOptions {
                        id,
                        name,
                        params,
                        wait,
                        poll_interval,
                        timeout,
                    };
                    run_workflow(&context()?, opts).await?
                }
                WorkflowCommand::Check { session_id } => {
                    run_check(&context()?, &session_id).await?
                }
            },
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

/// Loaded config plus the request headers for this invocation.
pub struct ApiContext {
    pub cfg: TdConfig,
    pub headers: RequestHeaders,
}

impl ApiContext {
    fn load(path: Option<&Path>, apikey: Option<&str>) -> Result<Self> {
        let cfg = match path {
            Some(path) => config::load_or_init_at(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => config::load_or_init().context("loading config")?,
        };
        tracing::debug!(
            endpoint = %cfg.api.endpoint,
            workflow_endpoint = %cfg.api.workflow_endpoint,
            scan = ?cfg.scan,
            "loaded config"
        );
        let api_key = cfg.api.resolve_api_key(apikey)?;
        Ok(Self {
            cfg,
            headers: RequestHeaders::now(api_key),
        })
    }
}

#[cfg(test)]
mod tests;
