//! Wire types for the roster and job-history endpoints.
//!
//! Users are kept as the raw API object so the CLI prints them exactly as
//! returned, key order included. Jobs type only the fields the scanner reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of `GET /v3/user/list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User {
    pub fields: Map<String, Value>,
}

impl User {
    /// User with only a name; mostly for tests and fixtures.
    pub fn named(name: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        Self { fields }
    }

    /// `name`, when present and a string.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Body of `GET /v3/user/list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<User>,
}

/// One entry of `GET /v3/job/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// `YYYY-MM-DD HH:MM:SS UTC`; absent means "now".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /v3/job/list?from=..&to=..`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPage {
    #[serde(default)]
    pub jobs: Vec<Job>,
}
