//! Batched, concurrent walk over the job-history pages.
//!
//! Keeps up to `concurrency` page requests in flight at once. A batch is
//! joined completely before its results are folded into the active set and
//! the stopping rule is checked, so batch N+1 never starts before batch N is
//! accounted for.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;

use super::analyze::{analyze_page, PageSummary};
use super::pages::{plan_pages, PageRequest};
use super::ScanOptions;
use crate::error::{ApiError, ScanError};
use crate::model::JobPage;
use crate::transport::Transport;
use crate::window::Window;

pub const JOB_LIST_PATH: &str = "v3/job/list";

/// Names of users with at least one job inside `window`.
///
/// The job-history endpoint must return jobs newest-first: once a page holds
/// fewer in-window jobs than `page_size`, later pages are assumed to be
/// entirely outside the window and are not requested.
///
/// Any failed request fails the whole scan; nothing partial is returned.
pub async fn fetch_active_users(
    transport: Arc<dyn Transport>,
    options: &ScanOptions,
    window: &Window,
) -> Result<HashSet<String>, ScanError> {
    let pages = plan_pages(options.page_size, options.limit);
    tracing::debug!(
        pages = pages.len(),
        page_size = options.page_size,
        concurrency = options.concurrency,
        past = %window.past(),
        "starting job history scan"
    );

    let mut active = HashSet::new();
    for (batch_no, batch) in pages.chunks(options.concurrency).enumerate() {
        let summaries = fetch_batch(&transport, batch, window).await?;
        let short = is_short_batch(&summaries, options.page_size);
        for summary in summaries {
            active.extend(summary.users);
        }
        tracing::debug!(batch = batch_no, users = active.len(), short, "batch done");
        if short {
            break;
        }
    }

    Ok(active)
}

/// True if any page's in-window count differs from `page_size`.
///
/// This compares the *in-window* count, not the raw number of jobs returned,
/// so a full page of jobs older than the window also ends the scan.
/// End-of-data and end-of-window are conflated here; kept until the intended
/// behaviour is confirmed.
pub fn is_short_batch(summaries: &[PageSummary], page_size: usize) -> bool {
    summaries.iter().any(|s| s.matched != page_size)
}

async fn fetch_batch(
    transport: &Arc<dyn Transport>,
    batch: &[PageRequest],
    window: &Window,
) -> Result<Vec<PageSummary>, ScanError> {
    let mut join_set = JoinSet::new();
    for &page in batch {
        let transport = Arc::clone(transport);
        join_set.spawn_blocking(move || fetch_page(transport.as_ref(), page));
    }

    // Dropping the set on error aborts whatever is still queued.
    let mut fetched = Vec::with_capacity(batch.len());
    while let Some(res) = join_set.join_next().await {
        fetched.push(res.map_err(ApiError::from)??);
    }

    fetched
        .iter()
        .map(|page| analyze_page(page, window))
        .collect()
}

fn fetch_page(transport: &dyn Transport, page: PageRequest) -> Result<JobPage, ApiError> {
    transport.get(JOB_LIST_PATH, &page.query())?.json()
}
