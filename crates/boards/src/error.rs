//! Board Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A board selection error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for board selection.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No platform identifier in the configuration, the environment, or
    /// the machine configuration file.
    #[display("could not determine the platform of this device")]
    PlatformUndetected,
    /// Machine configuration exists but could not be read.
    #[display("could not read machine configuration: {}", _0.display())]
    MachineConf(#[error(not(source))] PathBuf),
    /// No registered driver handles this platform.
    #[display("no board driver for platform `{_0}`")]
    UnsupportedPlatform(#[error(not(source))] String),
    /// Configuration names a driver that isn't registered.
    #[display("unknown board driver `{_0}`")]
    UnknownDriver(#[error(not(source))] String),
    /// The selected driver could not be constructed.
    #[display("failed to initialize board driver `{_0}`")]
    Driver(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
