//! Minimal HTTP/1.1 server for integration tests.
//!
//! Routes map a request path to a canned reply (fixed body, chunked body,
//! redirect or bare status). Every request is logged so tests can count hits.
//! One request per connection; responses always carry `Connection: close`.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with `Content-Length`.
    Body(Vec<u8>),
    /// 200 with `Transfer-Encoding: chunked`, split into pieces of the given size.
    Chunked(Vec<u8>, usize),
    /// Redirect status with a `Location` header.
    Redirect(u16, String),
    /// Redirect status without a `Location` header.
    RedirectNoLocation(u16),
    /// Bare status with an empty body.
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct LoggedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl LoggedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

type Routes = Arc<Mutex<HashMap<String, Reply>>>;
type Log = Arc<Mutex<Vec<LoggedRequest>>>;

pub struct TestServer {
    base: String,
    routes: Routes,
    log: Log,
}

impl TestServer {
    /// Bind to an ephemeral port and serve in background threads until exit.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let (r, l) = (Arc::clone(&routes), Arc::clone(&log));
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let (r, l) = (Arc::clone(&r), Arc::clone(&l));
                thread::spawn(move || handle(stream, &r, &l));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}/", port),
            routes,
            log,
        }
    }

    /// Base URL ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Absolute URL for `path` (with or without leading `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn route(&self, path: &str, reply: Reply) {
        let key = format!("/{}", path.trim_start_matches('/'));
        self.routes.lock().unwrap().insert(key, reply);
    }

    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn hits(&self, path: &str) -> usize {
        let key = format!("/{}", path.trim_start_matches('/'));
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == key)
            .count()
    }
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(buf).ok()
}

fn parse_request(head: &str) -> Option<LoggedRequest> {
    let mut lines = head.split("\r\n");
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let headers = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    Some(LoggedRequest {
        method,
        path,
        headers,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

fn handle(mut stream: TcpStream, routes: &Routes, log: &Log) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let head = match read_head(&mut stream) {
        Some(h) => h,
        None => return,
    };
    let request = match parse_request(&head) {
        Some(r) => r,
        None => return,
    };
    let reply = routes.lock().unwrap().get(&request.path).cloned();
    log.lock().unwrap().push(request);

    let mut out: Vec<u8> = Vec::new();
    match reply {
        Some(Reply::Body(body)) => {
            out.extend_from_slice(
                format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                )
                .as_bytes(),
            );
            out.extend_from_slice(&body);
        }
        Some(Reply::Chunked(body, piece)) => {
            out.extend_from_slice(
                b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
            );
            for part in body.chunks(piece.max(1)) {
                out.extend_from_slice(format!("{:x}\r\n", part.len()).as_bytes());
                out.extend_from_slice(part);
                out.extend_from_slice(b"\r\n");
            }
            out.extend_from_slice(b"0\r\n\r\n");
        }
        Some(Reply::Redirect(status, location)) => {
            out.extend_from_slice(
                format!(
                    "HTTP/1.1 {} {}\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    status,
                    reason(status),
                    location
                )
                .as_bytes(),
            );
        }
        Some(Reply::RedirectNoLocation(status)) | Some(Reply::Status(status)) => {
            out.extend_from_slice(
                format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    status,
                    reason(status)
                )
                .as_bytes(),
            );
        }
        None => {
            out.extend_from_slice(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        }
    }
    let _ = stream.write_all(&out);
    let _ = stream.flush();
    let _ = stream.shutdown(std::net::Shutdown::Write);
}
