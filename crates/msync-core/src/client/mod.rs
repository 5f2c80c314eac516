//! Redirect-following HTTP GET over libcurl.
//!
//! Each hop gets a fresh `DownloadSession`; the previous one is closed before
//! the next is opened. The loop stops at the first non-redirect status and
//! only a 200 is handed back as a readable body.

mod handler;
mod session;

pub use handler::ResponseHandler;
pub use session::DownloadSession;

use std::sync::OnceLock;
use std::time::Duration;

use crate::error::SyncError;

/// Capacity of the scratch space for a `Location` value, terminator included.
/// The longest usable value is one byte shorter.
pub const MAX_LOCATION_LEN: usize = 4096;

/// Default cap on redirect hops per request.
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Redirect statuses that are followed.
pub fn is_redirect(status: u32) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

static CURL_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Bring up libcurl once per process. `curl::init` panics when the global
/// setup fails; that panic is caught and reported as an initialization error.
pub fn ensure_initialized() -> Result<(), SyncError> {
    CURL_INIT
        .get_or_init(|| {
            std::panic::catch_unwind(curl::init).map_err(|payload| {
                payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "curl global init failed".to_string())
            })
        })
        .clone()
        .map_err(SyncError::Initialization)
}

/// Resolve a `Location` value against the URL that returned it.
pub fn resolve_location(current: &str, location: Option<&str>) -> Result<String, SyncError> {
    let invalid = |reason: &str| SyncError::InvalidRedirect {
        url: current.to_string(),
        reason: reason.to_string(),
    };
    let location = location.map(str::trim).filter(|l| !l.is_empty());
    let location = location.ok_or_else(|| invalid("missing Location header"))?;
    if location.len() >= MAX_LOCATION_LEN {
        return Err(invalid(&format!(
            "Location is {} bytes, limit is {}",
            location.len(),
            MAX_LOCATION_LEN - 1
        )));
    }
    let base = url::Url::parse(current).map_err(|e| SyncError::InvalidUrl {
        url: current.to_string(),
        reason: e.to_string(),
    })?;
    let next = base
        .join(location)
        .map_err(|e| invalid(&format!("cannot resolve {:?}: {}", location, e)))?;
    Ok(next.into())
}

/// Request settings shared by every hop.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    /// `None` keeps following redirects without limit.
    pub max_redirects: Option<u32>,
    /// `None` leaves libcurl's default in place.
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("msync/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: Some(DEFAULT_MAX_REDIRECTS),
            connect_timeout: None,
        }
    }
}

/// A 200 response ready to be read.
#[derive(Debug)]
pub struct OpenResponse {
    pub status: u32,
    /// URL that produced the final response.
    pub final_url: String,
    /// Number of redirect hops taken.
    pub redirects: u32,
    pub session: DownloadSession,
}

#[derive(Debug, Clone, Default)]
pub struct RedirectFollowingClient {
    opts: ClientOptions,
}

impl RedirectFollowingClient {
    pub fn new(opts: ClientOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.opts
    }

    /// Open one logical GET for `url`, following redirects to the final body.
    pub fn open(&self, url: &str) -> Result<OpenResponse, SyncError> {
        ensure_initialized()?;

        let mut current = url.to_string();
        let mut redirects = 0u32;
        loop {
            let session = DownloadSession::begin(&current, &self.opts)?;
            let status = session.status();

            if is_redirect(status) {
                let next = resolve_location(&current, session.location())?;
                drop(session);
                redirects += 1;
                if let Some(max) = self.opts.max_redirects {
                    if redirects > max {
                        return Err(SyncError::TooManyRedirects {
                            url: url.to_string(),
                            hops: max,
                        });
                    }
                }
                tracing::debug!(status, from = %current, to = %next, "following redirect");
                current = next;
                continue;
            }

            if status != 200 {
                return Err(SyncError::Protocol {
                    url: current,
                    status,
                });
            }

            tracing::debug!(
                url = %current,
                redirects,
                content_length_hint = ?session.content_length_hint(),
                "response ready"
            );
            return Ok(OpenResponse {
                status,
                final_url: current,
                redirects,
                session,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_statuses() {
        for s in [301, 302, 303, 307, 308] {
            assert!(is_redirect(s), "{} should redirect", s);
        }
        for s in [200, 204, 300, 304, 305, 306, 404, 500] {
            assert!(!is_redirect(s), "{} should not redirect", s);
        }
    }

    #[test]
    fn resolve_absolute_location() {
        let next = resolve_location("http://a.example/x", Some("https://b.example/y")).unwrap();
        assert_eq!(next, "https://b.example/y");
    }

    #[test]
    fn resolve_relative_location() {
        let next = resolve_location("http://a.example/dir/x", Some("y?z=1")).unwrap();
        assert_eq!(next, "http://a.example/dir/y?z=1");
        let root = resolve_location("http://a.example/dir/x", Some("/top")).unwrap();
        assert_eq!(root, "http://a.example/top");
    }

    #[test]
    fn missing_location_is_invalid_redirect() {
        let err = resolve_location("http://a.example/x", None).unwrap_err();
        assert!(matches!(err, SyncError::InvalidRedirect { .. }));
        let err = resolve_location("http://a.example/x", Some("  ")).unwrap_err();
        assert!(matches!(err, SyncError::InvalidRedirect { .. }));
    }

    #[test]
    fn oversized_location_is_rejected() {
        let long = format!("http://b.example/{}", "a".repeat(MAX_LOCATION_LEN));
        let err = resolve_location("http://a.example/x", Some(&long)).unwrap_err();
        assert!(matches!(err, SyncError::InvalidRedirect { .. }));
    }

    #[test]
    fn location_limit_leaves_room_for_terminator() {
        let prefix = "http://b.example/";
        let at_cap = format!("{}{}", prefix, "a".repeat(MAX_LOCATION_LEN - prefix.len()));
        assert_eq!(at_cap.len(), MAX_LOCATION_LEN);
        let err = resolve_location("http://a.example/x", Some(&at_cap)).unwrap_err();
        assert!(matches!(err, SyncError::InvalidRedirect { .. }));

        let fits = &at_cap[..MAX_LOCATION_LEN - 1];
        assert_eq!(resolve_location("http://a.example/x", Some(fits)).unwrap(), fits);
    }

    #[test]
    fn default_options() {
        let opts = ClientOptions::default();
        assert!(opts.user_agent.starts_with("msync/"));
        assert_eq!(opts.max_redirects, Some(DEFAULT_MAX_REDIRECTS));
        assert!(opts.connect_timeout.is_none());
    }

    #[test]
    fn initialization_is_idempotent() {
        ensure_initialized().unwrap();
        ensure_initialized().unwrap();
    }
}
