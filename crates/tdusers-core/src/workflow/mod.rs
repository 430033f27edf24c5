//! Treasure Workflow client: list workflows and sessions, start attempts, wait for them.
//!
//! All calls block the current thread; async callers should use `spawn_blocking`.

mod poll;
mod types;

pub use poll::{AbortToken, Clock, PollOptions, Poller, SystemClock};
pub use types::{Attempt, ProjectRef, Session, Workflow};

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::error::WorkflowError;
use crate::transport::Transport;
use types::{SessionList, StartedAttempt, WorkflowList};

pub const WORKFLOWS_PATH: &str = "workflows";
pub const SESSIONS_PATH: &str = "sessions";
pub const ATTEMPTS_PATH: &str = "attempts";

/// How a workflow is named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowTarget {
    /// Numeric workflow id. Ids change when a project is re-pushed.
    Id(String),
    /// `project_name.workflow_name`; stable across pushes.
    Name { project: String, workflow: String },
}

impl WorkflowTarget {
    /// Parse `project_name.workflow_name`. Anything after a second dot is ignored.
    pub fn parse_name(names: &str) -> Result<Self, WorkflowError> {
        let mut parts = names.split('.');
        match (parts.next(), parts.next()) {
            (Some(project), Some(workflow)) if !project.is_empty() && !workflow.is_empty() => {
                Ok(WorkflowTarget::Name {
                    project: project.to_string(),
                    workflow: workflow.to_string(),
                })
            }
            _ => Err(WorkflowError::InvalidTarget {
                target: names.to_string(),
            }),
        }
    }
}

/// REST wrapper over the workflow API.
pub struct WorkflowApi {
    transport: Arc<dyn Transport>,
    offset: FixedOffset,
}

impl WorkflowApi {
    /// `offset` is the zone used for `sessionTime` when starting attempts.
    pub fn new(transport: Arc<dyn Transport>, offset: FixedOffset) -> Self {
        Self { transport, offset }
    }

    /// Registered workflows (`GET /workflows`).
    pub fn workflows(&self) -> Result<Vec<Workflow>, WorkflowError> {
        let list: WorkflowList = self.transport.get(WORKFLOWS_PATH, &[])?.json()?;
        Ok(list.workflows)
    }

    /// Session history (`GET /sessions`).
    pub fn sessions(&self) -> Result<Vec<Session>, WorkflowError> {
        let list: SessionList = self.transport.get(SESSIONS_PATH, &[])?.json()?;
        Ok(list.sessions)
    }

    pub fn session(&self, session_id: &str) -> Result<Session, WorkflowError> {
        self.sessions()?
            .into_iter()
            .find(|s| s.id == session_id)
            .ok_or_else(|| WorkflowError::SessionNotFound(session_id.to_string()))
    }

    pub fn workflow_id_by_name(&self, project: &str, workflow: &str) -> Result<String, WorkflowError> {
        self.workflows()?
            .into_iter()
            .find(|w| w.name == workflow && w.project.name == project)
            .map(|w| w.id)
            .ok_or_else(|| WorkflowError::WorkflowNotFound {
                project: project.to_string(),
                workflow: workflow.to_string(),
            })
    }

    pub fn resolve(&self, target: &WorkflowTarget) -> Result<String, WorkflowError> {
        match target {
            WorkflowTarget::Id(id) => Ok(id.clone()),
            WorkflowTarget::Name { project, workflow } => self.workflow_id_by_name(project, workflow),
        }
    }

    /// Start an attempt (`PUT /attempts`) and return its session id.
    ///
    /// `session_time` defaults to now in the configured offset.
    pub fn start_attempt(
        &self,
        workflow_id: &str,
        params: &Map<String, Value>,
        session_time: Option<DateTime<FixedOffset>>,
    ) -> Result<String, WorkflowError> {
        let session_time = session_time.unwrap_or_else(|| Utc::now().with_timezone(&self.offset));
        let body = json!({
            "workflowId": workflow_id,
            "params": params,
            "sessionTime": session_time.to_rfc3339_opts(SecondsFormat::Secs, false),
        });
        let started: StartedAttempt = self.transport.put_json(ATTEMPTS_PATH, &body)?.json()?;
        tracing::info!(workflow = workflow_id, session = %started.session_id, "started attempt");
        Ok(started.session_id)
    }

    /// Start `target` and return the session id without waiting.
    pub fn run_workflow(
        &self,
        target: &WorkflowTarget,
        params: &Map<String, Value>,
    ) -> Result<String, WorkflowError> {
        let workflow_id = self.resolve(target)?;
        self.start_attempt(&workflow_id, params, None)
    }

    /// Start `target` and block until its session finishes.
    pub fn run_workflow_and_wait(
        &self,
        target: &WorkflowTarget,
        params: &Map<String, Value>,
        poller: &Poller<'_>,
    ) -> Result<Session, WorkflowError> {
        let session_id = self.run_workflow(target, params)?;
        poller.wait(self, &session_id)
    }

    /// Error unless the session's last attempt succeeded.
    pub fn check_failed(&self, session_id: &str) -> Result<Session, WorkflowError> {
        let session = self.session(session_id)?;
        if session.succeeded() {
            Ok(session)
        } else {
            Err(WorkflowError::Failed {
                session: Box::new(session),
            })
        }
    }
}

/// Fixed offset from whole hours, e.g. 9 for JST.
pub fn offset_hours(hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours.checked_mul(3600)?)
}
