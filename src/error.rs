//! Setup Error Types
//!
//! Failures that stop an invocation before (or instead of) producing output.
//! Each lower crate's error is raised into one of these, keeping its tree for
//! the `debug` log while the top-level message stays short.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("{_0}")]
    Config(#[error(not(source))] String),
    #[display("Root privileges are required for this operation")]
    NotRoot,
    /// No platform, or no driver for it.
    #[display("{_0}")]
    Setup(#[error(not(source))] String),
    /// Acquisition or output failed.
    #[display("{_0}")]
    Run(#[error(not(source))] String),
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Run(_))
    }
}
