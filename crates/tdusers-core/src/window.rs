//! Trailing time window used to decide whether a job counts as recent.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::error::{ConfigError, ScanError};

/// Format of `created_at` in job-history records.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// `[past, now]`, fixed for the duration of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    now: DateTime<Utc>,
    past: DateTime<Utc>,
}

impl Window {
    /// Window ending at `now` and reaching back `interval_days`.
    ///
    /// Fails when the boundary falls outside the representable date range.
    pub fn trailing_days(now: DateTime<Utc>, interval_days: u32) -> Result<Self, ConfigError> {
        let past = Duration::try_days(i64::from(interval_days))
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| ConfigError::Invalid {
                field: "interval_days",
                reason: format!("{interval_days} days reaches past the supported date range"),
            })?;
        Ok(Self { now, past })
    }

    /// Window ending at the current wall-clock time.
    pub fn ending_now(interval_days: u32) -> Result<Self, ConfigError> {
        Self::trailing_days(Utc::now(), interval_days)
    }

    /// Window boundary; jobs created at or after it are in the window.
    pub fn past(&self) -> DateTime<Utc> {
        self.past
    }

    /// Resolve a job's `created_at`. A missing value means "now".
    pub fn created_at(&self, raw: Option<&str>) -> Result<DateTime<Utc>, ScanError> {
        match raw {
            None => Ok(self.now),
            Some(text) => parse_created_at(text),
        }
    }

    /// True when the job timestamp is `>= past`.
    pub fn contains(&self, raw: Option<&str>) -> Result<bool, ScanError> {
        Ok(self.created_at(raw)? >= self.past)
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS UTC`.
pub fn parse_created_at(text: &str) -> Result<DateTime<Utc>, ScanError> {
    NaiveDateTime::parse_from_str(text.trim(), CREATED_AT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ScanError::Timestamp {
            value: text.to_string(),
        })
}
