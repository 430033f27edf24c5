//! Workflow API payloads. Unknown fields are kept so failures can be reported in full.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

/// Entry of `GET /workflows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub project: ProjectRef,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WorkflowList {
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

/// State of the most recent attempt of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub cancel_requested: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of `GET /sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub last_attempt: Option<Attempt>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    pub fn is_done(&self) -> bool {
        self.last_attempt.as_ref().is_some_and(|a| a.done)
    }

    /// Only an explicit `success: true` counts.
    pub fn succeeded(&self) -> bool {
        self.last_attempt
            .as_ref()
            .is_some_and(|a| a.success == Some(true))
    }

    pub fn status_label(&self) -> &'static str {
        match &self.last_attempt {
            None => "no attempt",
            Some(a) if !a.done => "running",
            Some(a) if a.success == Some(true) => "success",
            Some(a) if a.cancel_requested => "killed",
            Some(_) => "error",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SessionList {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// Body returned by `PUT /attempts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartedAttempt {
    pub session_id: String,
}
