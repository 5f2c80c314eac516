//! Single-resource download: open, accumulate, persist.

use std::path::Path;

use crate::client::RedirectFollowingClient;
use crate::error::SyncError;
use crate::storage;
use crate::transfer;

/// Fetch `url` into memory, following redirects. Returns the exact body.
pub fn fetch_bytes(client: &RedirectFollowingClient, url: &str) -> Result<Vec<u8>, SyncError> {
    let mut response = client.open(url)?;
    let bytes = transfer::read_body(&mut response.session)?;
    tracing::debug!(
        url,
        final_url = %response.final_url,
        redirects = response.redirects,
        bytes = bytes.len(),
        "downloaded"
    );
    Ok(bytes)
}

/// Fetch `url` and write the body to `dest`. Returns the number of bytes written.
///
/// The session is closed before the file is opened; a write failure leaves
/// whatever reached the disk in place.
pub fn fetch_to_path(
    client: &RedirectFollowingClient,
    url: &str,
    dest: &Path,
) -> Result<u64, SyncError> {
    let bytes = fetch_bytes(client, url)?;
    storage::persist(dest, &bytes)?;
    tracing::info!("saved {} ({} bytes)", dest.display(), bytes.len());
    Ok(bytes.len() as u64)
}
