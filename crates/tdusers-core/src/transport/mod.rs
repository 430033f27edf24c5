//! Authenticated HTTP access to the REST and workflow APIs.
//!
//! [`Transport`] is the seam the scanner and workflow client are written
//! against. [`CurlTransport`] implements it with the curl crate (libcurl);
//! calls block the current thread, so async code runs them through
//! `spawn_blocking`.

mod headers;
#[cfg(test)]
pub(crate) mod fake;

pub use headers::{http_date, RequestHeaders, USER_AGENT};

use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// A successful (2xx) response body and the URL that produced it.
#[derive(Debug, Clone)]
pub struct Response {
    pub url: String,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|source| ApiError::Decode {
            url: self.url.clone(),
            source,
        })
    }
}

/// Issues authenticated requests relative to a base URL.
///
/// Shared read-only by every in-flight request of a scan batch.
pub trait Transport: Send + Sync {
    /// `GET {base}/{path}?{query}`. Non-2xx statuses are errors.
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, ApiError>;

    /// `PUT {base}/{path}` with a JSON body. Non-2xx statuses are errors.
    fn put_json(&self, path: &str, body: &serde_json::Value) -> Result<Response, ApiError>;
}

/// Build `{base}/{path}?k=v&...`, percent-encoding the query.
pub fn build_url(base: &str, path: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
    let raw = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = url::Url::parse(&raw).map_err(|source| ApiError::InvalidUrl {
        url: raw.clone(),
        source,
    })?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in query {
            pairs.append_pair(k, v);
        }
    }
    Ok(url.into())
}

/// libcurl-backed transport. One `Easy` handle per request.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    base_url: String,
    headers: RequestHeaders,
    timeout: Duration,
    connect_timeout: Duration,
}

impl CurlTransport {
    pub fn new(base_url: impl Into<String>, headers: RequestHeaders) -> Self {
        Self {
            base_url: base_url.into(),
            headers,
            timeout: Duration::from_secs(180),
            connect_timeout: Duration::from_secs(15),
        }
    }

    /// Transport for the REST API (`api.endpoint`).
    pub fn rest(cfg: &ApiConfig, headers: RequestHeaders) -> Self {
        Self::new(cfg.endpoint.clone(), headers).with_timeouts(cfg)
    }

    /// Transport for the workflow API (`api.workflow_endpoint`).
    pub fn workflow(cfg: &ApiConfig, headers: RequestHeaders) -> Self {
        Self::new(cfg.workflow_endpoint.clone(), headers).with_timeouts(cfg)
    }

    fn with_timeouts(mut self, cfg: &ApiConfig) -> Self {
        self.timeout = cfg.request_timeout();
        self.connect_timeout = cfg.connect_timeout();
        self
    }

    fn perform(&self, url: &str, put_body: Option<&[u8]>) -> Result<Response, ApiError> {
        let curl_err = |source: curl::Error| ApiError::Curl {
            url: url.to_string(),
            source,
        };
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(curl_err)?;
        easy.follow_location(true).map_err(curl_err)?;
        easy.connect_timeout(self.connect_timeout).map_err(curl_err)?;
        easy.timeout(self.timeout).map_err(curl_err)?;
        // Sends Accept-Encoding and transparently decodes the body.
        easy.accept_encoding("deflate, gzip").map_err(curl_err)?;

        let mut list = curl::easy::List::new();
        for line in self.headers.lines() {
            list.append(&line).map_err(curl_err)?;
        }
        if let Some(payload) = put_body {
            list.append("Content-Type: application/json")
                .map_err(curl_err)?;
            easy.custom_request("PUT").map_err(curl_err)?;
            easy.post_fields_copy(payload).map_err(curl_err)?;
        }
        easy.http_headers(list).map_err(curl_err)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(curl_err)?;
            transfer.perform().map_err(curl_err)?;
        }

        let status = easy.response_code().map_err(curl_err)?;
        if !(200..300).contains(&status) {
            return Err(ApiError::Http {
                url: url.to_string(),
                status,
            });
        }

        Ok(Response {
            url: url.to_string(),
            body,
        })
    }
}

impl Transport for CurlTransport {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, ApiError> {
        let url = build_url(&self.base_url, path, query)?;
        tracing::info!("SEND REQUEST: {}", url);
        self.perform(&url, None)
    }

    fn put_json(&self, path: &str, body: &serde_json::Value) -> Result<Response, ApiError> {
        let url = build_url(&self.base_url, path, &[])?;
        tracing::info!("SEND REQUEST: PUT {}", url);
        let payload = body.to_string();
        self.perform(&url, Some(payload.as_bytes()))
    }
}
