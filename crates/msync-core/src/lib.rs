pub mod config;
pub mod logging;

pub mod checksum;
pub mod client;
pub mod downloader;
pub mod error;
pub mod manifest;
pub mod region;
pub mod storage;
pub mod sync;
pub mod transfer;

pub use error::SyncError;
