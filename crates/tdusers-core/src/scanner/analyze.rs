//! Per-page filtering: which jobs are in the window and who ran them.

use std::collections::HashSet;

use crate::error::ScanError;
use crate::model::JobPage;
use crate::window::Window;

/// What one page contributes to the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    /// Jobs created at or after the window boundary, with or without a user.
    pub matched: usize,
    /// Distinct `user_name`s among those jobs.
    pub users: HashSet<String>,
}

/// Count in-window jobs and collect their user names.
///
/// Jobs without `created_at` count as created now. Jobs without `user_name`
/// are still counted in `matched`. Pure; safe to call on pages in any order.
pub fn analyze_page(page: &JobPage, window: &Window) -> Result<PageSummary, ScanError> {
    let mut summary = PageSummary::default();
    for job in &page.jobs {
        if !window.contains(job.created_at.as_deref())? {
            continue;
        }
        summary.matched += 1;
        if let Some(name) = &job.user_name {
            summary.users.insert(name.clone());
        }
    }
    Ok(summary)
}
