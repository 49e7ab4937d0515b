//! Tiered system EEPROM acquisition.
//!
//! One invocation is one [`Request`]: the [`AcquisitionPipeline`] walks the
//! database, cache and live-read tiers until one of them yields a blob, and
//! the [`CommandDispatcher`] renders that blob as the request's projection.
//! [`run`] does both.
//!
//! ```
//! use syseeprom_config::CacheConfig;
//! use syseeprom_core::{Console, ExitStatus, Request, run};
//! use syseeprom_driver::{Field, MockDriver};
//!
//! # fn main() -> syseeprom_core::error::Result<()> {
//! # let cache_dir = tempfile::tempdir().unwrap();
//! let mut driver = MockDriver::ready(b"eeprom").with_serial(Field::Supported("SN-1".into()));
//! let (mut out, mut err) = (Vec::new(), Vec::new());
//! let mut console = Console::new(&mut out, &mut err);
//! let cache = CacheConfig::new(cache_dir.path(), "syseeprom_cache");
//! assert_eq!(run(&mut driver, cache, Request::default(), &mut console)?, ExitStatus::Success);
//! assert!(String::from_utf8(out).unwrap().ends_with("(checksum valid)\n"));
//! # Ok(())
//! # }
//! ```

mod cache;
mod checksum;
mod console;
mod dispatch;
pub mod error;
mod gate;
mod pipeline;
mod request;

pub use crate::cache::CacheStore;
pub use crate::checksum::{CHECKSUM_INVALID, CHECKSUM_VALID, ChecksumValidator};
pub use crate::console::Console;
pub use crate::dispatch::{CommandDispatcher, DATABASE_WRITE_FAILED, ExitStatus, UNDEFINED};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::gate::ReadinessGate;
pub use crate::pipeline::AcquisitionPipeline;
pub use crate::request::{QueryMode, Request};

use syseeprom_config::CacheConfig;
use syseeprom_driver::BoardDriver;

/// Acquire once and dispatch the result.
pub fn run(
    driver: &mut dyn BoardDriver,
    cache: CacheConfig,
    request: Request,
    console: &mut Console<'_>,
) -> Result<ExitStatus> {
    let blob = AcquisitionPipeline::new(&mut *driver, CacheStore::new(cache)).acquire(&request, console)?;
    let status = CommandDispatcher::dispatch(driver, &request, blob.as_ref(), console)?;
    console.flush()?;
    Ok(status)
}
