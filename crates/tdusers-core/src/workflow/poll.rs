//! Waiting for a workflow session to finish.
//!
//! Polling is bounded by [`PollOptions::timeout`] and can be stopped from
//! another thread through an [`AbortToken`]. Time goes through [`Clock`] so
//! tests can run the loop without real sleeps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{Session, WorkflowApi};
use crate::error::{ConfigError, WorkflowError};

/// Longest uninterrupted sleep; abort requests are noticed within this.
const ABORT_CHECK: Duration = Duration::from_secs(1);

/// Source of time for the poller.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time and blocking `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Shared flag; set it to stop a running poll.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Pause between session checks.
    pub interval: Duration,
    /// Give up once this much time has passed since polling started.
    pub timeout: Duration,
}

impl PollOptions {
    /// Validated options; a zero interval would poll without pausing.
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "poll_interval_secs",
                reason: "must be at least 1 second".into(),
            });
        }
        Ok(Self { interval, timeout })
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(6 * 60 * 60),
        }
    }
}

/// Polls one session until its last attempt is done.
pub struct Poller<'a> {
    options: PollOptions,
    clock: &'a dyn Clock,
    abort: AbortToken,
}

impl<'a> Poller<'a> {
    pub fn new(options: PollOptions, clock: &'a dyn Clock, abort: AbortToken) -> Self {
        Self {
            options,
            clock,
            abort,
        }
    }

    /// Block until the session is done.
    ///
    /// Returns the finished session when its last attempt succeeded and
    /// [`WorkflowError::Failed`] when it did not.
    pub fn wait(&self, api: &WorkflowApi, session_id: &str) -> Result<Session, WorkflowError> {
        let started = self.clock.now();
        loop {
            if self.abort.is_aborted() {
                return Err(WorkflowError::Cancelled(session_id.to_string()));
            }

            let session = api.session(session_id)?;
            if session.is_done() {
                tracing::info!(session = session_id, status = session.status_label(), "session finished");
                return if session.succeeded() {
                    Ok(session)
                } else {
                    Err(WorkflowError::Failed {
                        session: Box::new(session),
                    })
                };
            }

            let waited = self.clock.now().saturating_duration_since(started);
            if waited >= self.options.timeout {
                return Err(WorkflowError::PollTimeout {
                    session_id: session_id.to_string(),
                    waited_secs: waited.as_secs(),
                });
            }
            tracing::debug!(session = session_id, waited_secs = waited.as_secs(), "session still running");
            self.pause(self.options.interval.min(self.options.timeout - waited));
        }
    }

    fn pause(&self, total: Duration) {
        let mut remaining = total;
        while !remaining.is_zero() && !self.abort.is_aborted() {
            let step = remaining.min(ABORT_CHECK);
            self.clock.sleep(step);
            remaining -= step;
        }
    }
}
