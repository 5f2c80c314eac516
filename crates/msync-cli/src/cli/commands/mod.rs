//! CLI command handlers, one per file.

mod digest;
mod fetch;
mod regions;
mod sync;

pub use digest::run_digest;
pub use fetch::run_fetch;
pub use regions::run_regions;
pub use sync::{run_sync, SyncArgs};
