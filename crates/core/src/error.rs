//! Core Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Only hard stops live here. Accelerator failures (database, cache) are
//! raised too, but the pipeline discards them at the call site.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A core error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The live hardware read failed.
    #[display("failed to read system EEPROM")]
    LiveRead,
    /// The live hardware read was interrupted.
    #[display("Interrupted")]
    Interrupted,
    /// The blob could not be decoded for display.
    #[display("failed to decode system EEPROM")]
    Decode,
    /// The cache root could not be created.
    #[display("cache root unavailable: {}", _0.display())]
    CacheRoot(#[error(not(source))] PathBuf),
    /// The driver's cache capability failed.
    #[display("cache unavailable")]
    Cache,
    /// A record under the cache root could not be removed.
    #[display("failed to clear cache: {}", _0.display())]
    CacheClear(#[error(not(source))] PathBuf),
    /// Writing to stdout or stderr failed.
    #[display("failed to write output")]
    Output,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LiveRead | Self::Interrupted)
    }
}
