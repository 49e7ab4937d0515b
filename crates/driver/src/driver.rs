//! Board driver contract.
//!
//! A [`BoardDriver`] is the hardware-specific half of EEPROM access: it knows
//! how to check whether the device is usable, how to read its EEPROM, and how
//! to interpret the bytes it read. Caching and database persistence are
//! optional capabilities a driver may expose through [`cache()`](BoardDriver::cache)
//! and [`database()`](BoardDriver::database); drivers that don't implement
//! them get `None` for free.

use crate::error::Result;
use crate::models::{ChecksumOutcome, DecodedBlob, DecodedFields, DeviceStatus, Field, FieldKind};
use std::path::Path;

/// Hardware-specific EEPROM access.
///
/// All I/O is synchronous. Any blocking (bus access, database round-trips)
/// happens inside the driver; callers never suspend.
///
/// # Examples
///
/// ```
/// use syseeprom_driver::{BoardDriver, Field};
/// # use syseeprom_driver::error::Result;
///
/// fn serial_of(driver: &mut dyn BoardDriver) -> Result<Option<String>> {
///     if !driver.status().is_ready() {
///         return Ok(None);
///     }
///     let Some(blob) = driver.read_eeprom()? else {
///         return Ok(None);
///     };
///     match driver.serial_number(&blob) {
///         Field::Supported(serial) => Ok(Some(serial)),
///         Field::NotSupported | Field::Empty => Ok(None),
///     }
/// }
/// ```
pub trait BoardDriver {
    /// Registry name of this driver (used for logging only).
    fn name(&self) -> &str;

    /// Whether the device is operational.
    fn status(&self) -> DeviceStatus;

    /// Read the EEPROM from hardware.
    ///
    /// Returns `Ok(None)` when the hardware produced no data; that is an
    /// empty result, not a failure.
    fn read_eeprom(&mut self) -> Result<Option<DecodedBlob>>;

    /// Interpret a blob for full display.
    fn decode(&self, blob: &DecodedBlob) -> Result<DecodedFields>;

    /// Verify a blob's integrity. Never fails: data too damaged to check is
    /// reported as invalid.
    fn is_checksum_valid(&self, blob: &DecodedBlob) -> ChecksumOutcome;

    /// Whether `blob` is structured well enough to decode. A cache record
    /// failing this is treated as a miss. A checksum mismatch alone does not
    /// make a blob malformed.
    fn is_well_formed(&self, blob: &DecodedBlob) -> bool {
        !blob.is_empty()
    }

    fn serial_number(&self, blob: &DecodedBlob) -> Field;

    fn model_string(&self, blob: &DecodedBlob) -> Field;

    fn mgmt_mac(&self, blob: &DecodedBlob) -> Field;

    /// Extract one of the identity fields by kind.
    fn field(&self, blob: &DecodedBlob, kind: FieldKind) -> Field {
        match kind {
            FieldKind::SerialNumber => self.serial_number(blob),
            FieldKind::ModelString => self.model_string(blob),
            FieldKind::MgmtMac => self.mgmt_mac(blob),
        }
    }

    /// Caching capability, if this driver supports one.
    fn cache(&mut self) -> Option<&mut dyn EepromCache> {
        None
    }

    /// Database capability, if this driver supports one.
    fn database(&mut self) -> Option<&mut dyn EepromDatabase> {
        None
    }
}

/// Persisted copy of the last EEPROM read, addressed by path.
pub trait EepromCache {
    /// Bind the cache to the record at `path`.
    fn set_cache_identity(&mut self, path: &Path) -> Result<()>;

    /// Read the bound record. A missing or unusable record is `Ok(None)`.
    fn read_cache(&self) -> Result<Option<DecodedBlob>>;

    /// Overwrite the bound record with `blob`.
    fn write_cache(&mut self, blob: &DecodedBlob) -> Result<()>;
}

/// Authoritative store of EEPROM contents, populated on initialization.
pub trait EepromDatabase {
    /// Fetch the stored contents, or `Ok(None)` if nothing has been stored.
    fn read_database(&mut self) -> Result<Option<DecodedBlob>>;

    fn write_database(&mut self, blob: &DecodedBlob) -> Result<()>;
}

/// Owned driver selected once at startup.
pub type DriverHandle = Box<dyn BoardDriver>;
