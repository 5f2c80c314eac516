//! One in-flight GET against a single URL.
//!
//! The Easy2 handle sits on its own `Multi` so the caller can pull the body in
//! steps: each `pump` lets libcurl make progress, and staged bytes are handed
//! out through `BodySource`. Dropping the session detaches and closes the
//! handle, which is how a redirect hop or an error path releases it.

use std::time::Duration;

use curl::easy::{Easy2, List};
use curl::multi::{Easy2Handle, Multi};

use crate::error::SyncError;
use crate::transfer::{BodySource, ReadStatus};

use super::handler::ResponseHandler;
use super::ClientOptions;

/// Upper bound on one `multi.wait` so a quiet socket does not hide completion.
const WAIT_SLICE: Duration = Duration::from_millis(100);

/// Exclusively owned request context for one URL; never reopened.
pub struct DownloadSession {
    url: String,
    handle: Easy2Handle<ResponseHandler>,
    multi: Multi,
    finished: Option<Result<(), curl::Error>>,
}

fn setup_err(url: &str) -> impl Fn(curl::Error) -> SyncError + '_ {
    move |e| SyncError::Connection {
        url: url.to_string(),
        message: e.to_string(),
    }
}

impl DownloadSession {
    /// Open a request context for `url`, begin the request and wait for the
    /// status line and headers of the final response.
    pub fn begin(url: &str, opts: &ClientOptions) -> Result<Self, SyncError> {
        let err = setup_err(url);
        let mut easy = Easy2::new(ResponseHandler::default());
        easy.url(url).map_err(&err)?;
        easy.get(true).map_err(&err)?;
        // Redirects are walked by the client, one session per hop.
        easy.follow_location(false).map_err(&err)?;
        // Certificate verification is disabled on purpose.
        easy.ssl_verify_peer(false).map_err(&err)?;
        easy.ssl_verify_host(false).map_err(&err)?;
        easy.useragent(&opts.user_agent).map_err(&err)?;
        let mut list = List::new();
        list.append("Connection: keep-alive").map_err(&err)?;
        easy.http_headers(list).map_err(&err)?;
        if let Some(t) = opts.connect_timeout {
            easy.connect_timeout(t).map_err(&err)?;
        }

        let multi = Multi::new();
        let handle = multi.add2(easy).map_err(|e| SyncError::Connection {
            url: url.to_string(),
            message: format!("curl multi add: {}", e),
        })?;
        let mut session = DownloadSession {
            url: url.to_string(),
            handle,
            multi,
            finished: None,
        };

        while !session.handle.get_ref().response_ready() {
            match &session.finished {
                Some(Err(e)) => {
                    return Err(SyncError::Connection {
                        url: session.url.clone(),
                        message: e.to_string(),
                    })
                }
                Some(Ok(())) => {
                    // Transfer ended without a complete header block.
                    if session.handle.get_ref().status().is_some() {
                        break;
                    }
                    return Err(SyncError::Connection {
                        url: session.url.clone(),
                        message: "no response received".to_string(),
                    });
                }
                None => session.pump()?,
            }
        }
        Ok(session)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Status code of the latest response.
    pub fn status(&self) -> u32 {
        self.handle.get_ref().status().unwrap_or(0)
    }

    pub fn location(&self) -> Option<&str> {
        self.handle.get_ref().header_value("location")
    }

    pub fn content_length_hint(&self) -> Option<u64> {
        self.handle.get_ref().content_length_hint()
    }

    /// Let libcurl make progress; records completion once the handle reports it.
    fn pump(&mut self) -> Result<(), SyncError> {
        let running = self.multi.perform().map_err(|e| SyncError::Transfer {
            url: self.url.clone(),
            message: format!("curl multi perform: {}", e),
        })?;

        let mut result = None;
        let handle = &self.handle;
        self.multi.messages(|msg| {
            if let Some(r) = msg.result_for2(handle) {
                result = Some(r);
            }
        });
        if let Some(r) = result {
            self.finished = Some(r);
            return Ok(());
        }
        if running == 0 {
            // Nothing left to drive and no message pending: the transfer is over.
            self.finished = Some(Ok(()));
            return Ok(());
        }
        if !self.handle.get_ref().has_staged() {
            self.multi
                .wait(&mut [], WAIT_SLICE)
                .map_err(|e| SyncError::Transfer {
                    url: self.url.clone(),
                    message: format!("curl multi wait: {}", e),
                })?;
        }
        Ok(())
    }
}

impl BodySource for DownloadSession {
    fn read_into(&mut self, dst: &mut [u8]) -> Result<ReadStatus, SyncError> {
        loop {
            if self.handle.get_ref().has_staged() {
                let n = self.handle.get_mut().take_staged(dst);
                return Ok(ReadStatus::Pending(n));
            }
            match &self.finished {
                Some(Ok(())) => return Ok(ReadStatus::Complete(0)),
                Some(Err(e)) => {
                    return Err(SyncError::Transfer {
                        url: self.url.clone(),
                        message: e.to_string(),
                    })
                }
                None => self.pump()?,
            }
        }
    }
}

impl std::fmt::Debug for DownloadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadSession")
            .field("url", &self.url)
            .field("status", &self.status())
            .field("finished", &self.finished.is_some())
            .finish()
    }
}
