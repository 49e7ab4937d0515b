//! Board driver contract for system EEPROM access.
//!
//! Everything hardware-specific about reading a system EEPROM sits behind the
//! [`BoardDriver`] trait: readiness, the raw read, decoding, checksum
//! verification and the identity field extractors. Caching and database
//! persistence are optional capabilities ([`EepromCache`], [`EepromDatabase`]).
//!
//! The `mock` feature provides [`MockDriver`], a scripted driver that counts
//! every call, for use in other crates' tests.

mod cache;
mod driver;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod models;

pub use crate::cache::{FileCache, MAX_RECORD_SIZE};
pub use crate::driver::{BoardDriver, DriverHandle, EepromCache, EepromDatabase};
#[cfg(feature = "mock")]
pub use crate::mock::{Calls, MockDriver};
pub use crate::models::{
    ChecksumOutcome, DecodedBlob, DecodedField, DecodedFields, DeviceStatus, Field, FieldKind, Provenance,
};
