//! Offset ranges requested from the job-history endpoint.

/// One `from`/`to` request against `/v3/job/list`. `to` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub from: usize,
    pub to: usize,
}

impl PageRequest {
    pub fn new(from: usize, page_size: usize) -> Self {
        Self {
            from,
            to: from.saturating_add(page_size.saturating_sub(1)),
        }
    }

    pub fn query(&self) -> [(&'static str, String); 2] {
        [("from", self.from.to_string()), ("to", self.to.to_string())]
    }
}

/// Every page for offsets `0, page_size, 2*page_size, ...` below `limit`.
///
/// The last page is never clipped to `limit`; it keeps the full `page_size`
/// width. `page_size` must be non-zero.
pub fn plan_pages(page_size: usize, limit: usize) -> Vec<PageRequest> {
    (0..limit)
        .step_by(page_size)
        .map(|from| PageRequest::new(from, page_size))
        .collect()
}
