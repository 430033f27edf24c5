//! Active-user scan: who on the roster ran a job recently.
//!
//! Roster fetch (one request), then a batched walk over the job history
//! ([`fetch_active_users`]), then a membership split of the roster
//! ([`filter_roster`]).

mod analyze;
mod driver;
mod pages;
mod roster;

pub use analyze::{analyze_page, PageSummary};
pub use driver::{fetch_active_users, is_short_batch, JOB_LIST_PATH};
pub use pages::{plan_pages, PageRequest};
pub use roster::{fetch_roster, filter_roster, ScanMode, ROSTER_PATH};

use std::sync::Arc;

use crate::error::{ApiError, ConfigError, ScanError};
use crate::model::User;
use crate::transport::Transport;
use crate::window::Window;

/// Upper bound on the number of page requests one scan may plan.
pub const MAX_PAGES: usize = 1_000_000;

/// Paging parameters for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Jobs requested per page.
    pub page_size: usize,
    /// Pages requested at once.
    pub concurrency: usize,
    /// Offsets at or above this are never requested.
    pub limit: usize,
}

impl ScanOptions {
    pub fn new(page_size: usize, concurrency: usize, limit: usize) -> Result<Self, ConfigError> {
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "page_size",
                reason: "must be at least 1".into(),
            });
        }
        if concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "concurrency",
                reason: "must be at least 1".into(),
            });
        }
        if limit.checked_add(page_size).is_none() {
            return Err(ConfigError::Invalid {
                field: "limit",
                reason: format!("limit {limit} plus page_size {page_size} overflows"),
            });
        }
        let options = Self {
            page_size,
            concurrency,
            limit,
        };
        if options.max_pages() > MAX_PAGES {
            return Err(ConfigError::Invalid {
                field: "limit",
                reason: format!(
                    "{} pages of {page_size} exceeds the maximum of {MAX_PAGES}",
                    options.max_pages()
                ),
            });
        }
        Ok(options)
    }

    /// Page requests in the worst case (no early stop).
    pub fn max_pages(&self) -> usize {
        self.limit.div_ceil(self.page_size)
    }
}

/// Everything one scan needs besides the transport.
#[derive(Debug, Clone, Copy)]
pub struct ScanRequest {
    pub options: ScanOptions,
    pub window: Window,
    pub mode: ScanMode,
}

/// Fetch the roster, scan the job history, and return the active (or inactive) users.
pub async fn fetch_users(
    transport: Arc<dyn Transport>,
    request: &ScanRequest,
) -> Result<Vec<User>, ScanError> {
    let roster = {
        let transport = Arc::clone(&transport);
        tokio::task::spawn_blocking(move || fetch_roster(transport.as_ref()))
            .await
            .map_err(ApiError::from)??
    };
    tracing::debug!(roster = roster.len(), "fetched user roster");

    let active = fetch_active_users(transport, &request.options, &request.window).await?;
    tracing::info!(
        active = active.len(),
        mode = ?request.mode,
        "job history scan finished"
    );

    Ok(filter_roster(&roster, &active, request.mode))
}
