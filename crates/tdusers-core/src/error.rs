//! Error types shared by the transport, scanner and workflow client.
//!
//! Library callers match on these; the CLI wraps them in `anyhow` with context.

use thiserror::Error;

use crate::workflow::Session;

/// Configuration problems. Raised before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key from the command line, `TD_API_KEY`, or the config file.
    #[error("API key missing: set TD_API_KEY or pass --apikey (or api.api_key in config.toml)")]
    MissingApiKey,
    /// A scan or poll parameter is out of range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
    #[error("config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config file: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config dir: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
}

/// Failure of a single API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{url}: {source}")]
    Curl {
        url: String,
        #[source]
        source: curl::Error,
    },
    /// HTTP response had a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u32 },
    /// Body was not the JSON shape we expected.
    #[error("{url}: unexpected response body: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The blocking task running the request panicked or was cancelled.
    #[error("request task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// True when curl gave up because the per-request timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Curl { source, .. } if source.is_operation_timedout())
    }
}

/// Failure of an active-user scan. No partial result is returned.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    /// A job carried a `created_at` that is not `YYYY-MM-DD HH:MM:SS UTC`.
    #[error("job created_at {value:?} is not in YYYY-MM-DD HH:MM:SS UTC format")]
    Timestamp { value: String },
}

/// Failure of a workflow operation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid workflow target {target:?}: expected project_name.workflow_name")]
    InvalidTarget { target: String },
    #[error("workflow {workflow:?} not found in project {project:?}")]
    WorkflowNotFound { project: String, workflow: String },
    #[error("session {0} not found")]
    SessionNotFound(String),
    /// The session's last attempt finished without success.
    #[error("workflow session {} failed (status: {})", .session.id, .session.status_label())]
    Failed { session: Box<Session> },
    #[error("session {session_id} still running after {waited_secs}s")]
    PollTimeout { session_id: String, waited_secs: u64 },
    #[error("polling for session {0} cancelled")]
    Cancelled(String),
}
