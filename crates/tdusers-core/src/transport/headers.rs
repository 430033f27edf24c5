//! Request headers sent with every API call.

use chrono::{DateTime, Utc};

pub const USER_AGENT: &str = concat!("tdusers/", env!("CARGO_PKG_VERSION"));

/// Headers fixed for the lifetime of one invocation.
#[derive(Clone)]
pub struct RequestHeaders {
    api_key: String,
    date: String,
}

impl RequestHeaders {
    /// `date` is sent as the `Date` header of every request.
    pub fn new(api_key: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            api_key: api_key.into(),
            date: http_date(date),
        }
    }

    /// Headers dated at the current time.
    pub fn now(api_key: impl Into<String>) -> Self {
        Self::new(api_key, Utc::now())
    }

    pub fn authorization(&self) -> String {
        format!("TD1 {}", self.api_key)
    }

    /// `Name: value` lines for curl.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Authorization: {}", self.authorization()),
            format!("Date: {}", self.date),
            format!("User-Agent: {}", USER_AGENT),
        ]
    }
}

// Keep the key out of debug logs.
impl std::fmt::Debug for RequestHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHeaders")
            .field("api_key", &"<redacted>")
            .field("date", &self.date)
            .finish()
    }
}

/// RFC 7231 HTTP-date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
