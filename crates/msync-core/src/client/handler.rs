//! Easy2 handler for one request: records the status line and headers of the
//! latest response and stages body bytes until the reader collects them.

use std::str;

/// Per-request state shared with libcurl's callbacks.
#[derive(Debug, Default)]
pub struct ResponseHandler {
    status: Option<u32>,
    headers: Vec<(String, String)>,
    headers_complete: bool,
    staged: Vec<u8>,
    staged_pos: usize,
}

/// Parse the code out of a status line such as `HTTP/1.1 302 Found`.
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    let proto = parts.next()?;
    if !proto.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

impl ResponseHandler {
    /// Status of the most recent response, if its status line arrived.
    pub fn status(&self) -> Option<u32> {
        self.status
    }

    /// True once a final (non-1xx) response has delivered its full header block.
    pub fn response_ready(&self) -> bool {
        self.headers_complete && self.status.map_or(false, |s| s >= 200)
    }

    /// First value of header `name` (case-insensitive) in the latest response.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Advisory `Content-Length`; absent for chunked bodies and never trusted.
    pub fn content_length_hint(&self) -> Option<u64> {
        self.header_value("content-length")?.parse().ok()
    }

    pub fn has_staged(&self) -> bool {
        self.staged_pos < self.staged.len()
    }

    /// Move up to `dst.len()` staged bytes into `dst`.
    pub fn take_staged(&mut self, dst: &mut [u8]) -> usize {
        let available = &self.staged[self.staged_pos..];
        let n = available.len().min(dst.len());
        dst[..n].copy_from_slice(&available[..n]);
        self.staged_pos += n;
        if self.staged_pos == self.staged.len() {
            self.staged.clear();
            self.staged_pos = 0;
        }
        n
    }
}

impl curl::easy::Handler for ResponseHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        let line = String::from_utf8_lossy(data);
        let line = line.trim_end();
        if let Some(code) = parse_status_line(line) {
            // A new response (interim 1xx or the final one) starts here.
            self.status = Some(code);
            self.headers.clear();
            self.headers_complete = false;
        } else if line.is_empty() {
            self.headers_complete = true;
        } else if let Some((name, value)) = line.split_once(':') {
            self.headers
                .push((name.trim().to_string(), value.trim().to_string()));
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        self.staged.extend_from_slice(data);
        Ok(data.len())
    }
}
