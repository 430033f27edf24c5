//! Minimal HTTP/1.1 server imitating the roster, job-history and workflow endpoints.
//!
//! Serves a fixed roster and a newest-first job list sliced by `from`/`to`.
//! Every request must carry `Authorization: TD1 <key>`; others get 401.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

pub const API_KEY: &str = "1/test-key";

/// How long a stalled job page waits before answering.
pub const STALL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Default)]
pub struct Fixture {
    /// Objects returned by `/v3/user/list`.
    pub users: Vec<Value>,
    /// Objects returned by `/v3/job/list`, newest first.
    pub jobs: Vec<Value>,
    /// `from` offsets of job pages that answer 500.
    pub failing_pages: Vec<usize>,
    /// `from` offsets of job pages that answer only after [`STALL`].
    pub stalled_pages: Vec<usize>,
    /// Objects returned by `/api/workflows`.
    pub workflows: Vec<Value>,
    /// Successive bodies of `/api/sessions`; the last one repeats.
    pub sessions: Vec<Value>,
}

/// One request as seen by the server.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub target: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

pub struct TdServer {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl TdServer {
    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    /// Request targets (path + query) for `path`, in arrival order.
    pub fn targets(&self, path: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|s| s.target)
            .filter(|t| t.split('?').next() == Some(path))
            .collect()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(fixture: Fixture) -> TdServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let fixture = Arc::new(fixture);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_srv = Arc::clone(&seen);
    let session_polls = Arc::new(Mutex::new(0usize));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let fixture = Arc::clone(&fixture);
            let seen = Arc::clone(&seen_srv);
            let polls = Arc::clone(&session_polls);
            thread::spawn(move || handle(stream, &fixture, &seen, &polls));
        }
    });
    TdServer {
        base_url: format!("http://127.0.0.1:{}", port),
        seen,
    }
}

fn handle(mut stream: TcpStream, fixture: &Fixture, seen: &Mutex<Vec<Seen>>, polls: &Mutex<usize>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };
    seen.lock().unwrap().push(req.clone());

    let expected = format!("TD1 {}", API_KEY);
    let authorized = req.headers.get("authorization") == Some(&expected);
    let (status, body) = if !authorized {
        ("401 Unauthorized", json!({"error": "unauthorized"}))
    } else {
        route(&req, fixture, polls)
    };

    let body = body.to_string();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body.as_bytes());
}

fn route(req: &Seen, fixture: &Fixture, polls: &Mutex<usize>) -> (&'static str, Value) {
    let (path, query) = req.target.split_once('?').unwrap_or((req.target.as_str(), ""));
    match (req.method.as_str(), path) {
        ("GET", "/v3/user/list") => ("200 OK", json!({ "users": fixture.users })),
        ("GET", "/v3/job/list") => {
            let params = parse_query(query);
            let from = params.get("from").copied().unwrap_or(0);
            let to = params.get("to").copied().unwrap_or(from);
            if fixture.failing_pages.contains(&from) {
                return ("500 Internal Server Error", json!({"error": "boom"}));
            }
            if fixture.stalled_pages.contains(&from) {
                thread::sleep(STALL);
            }
            let jobs: Vec<Value> = fixture
                .jobs
                .iter()
                .skip(from)
                .take(to.saturating_sub(from) + 1)
                .cloned()
                .collect();
            ("200 OK", json!({ "jobs": jobs }))
        }
        ("GET", "/api/workflows") => ("200 OK", json!({ "workflows": fixture.workflows })),
        ("GET", "/api/sessions") => {
            let mut n = polls.lock().unwrap();
            let idx = (*n).min(fixture.sessions.len().saturating_sub(1));
            *n += 1;
            let body = fixture.sessions.get(idx).cloned().unwrap_or(json!({"sessions": []}));
            ("200 OK", body)
        }
        ("PUT", "/api/attempts") => ("200 OK", json!({"id": "1", "sessionId": "900"})),
        _ => ("404 Not Found", json!({"error": "not found"})),
    }
}

fn parse_query(query: &str) -> HashMap<&str, usize> {
    query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .filter_map(|(k, v)| v.parse().ok().map(|n| (k, n)))
        .collect()
}

fn read_request(stream: &mut TcpStream) -> Option<Seen> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = std::str::from_utf8(&data[..header_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    while data.len() < header_end + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    let body = String::from_utf8_lossy(&data[header_end..]).to_string();

    Some(Seen {
        method,
        target,
        headers,
        body,
    })
}
