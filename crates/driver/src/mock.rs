//! Scripted board driver for testing.

use crate::driver::{BoardDriver, EepromCache, EepromDatabase};
use crate::error::{ErrorKind, Result};
use crate::models::{ChecksumOutcome, DecodedBlob, DecodedFields, DeviceStatus, Field, Provenance};
use crate::FileCache;
use std::cell::Cell;
use std::path::Path;

/// How many times each driver entry point was invoked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Calls {
    pub status: usize,
    pub live_reads: usize,
    pub cache_binds: usize,
    pub cache_reads: usize,
    pub cache_writes: usize,
    pub database_reads: usize,
    pub database_writes: usize,
}

enum CacheMode {
    Unsupported,
    Memory(Option<Vec<u8>>),
    File(FileCache),
}

struct DatabaseState {
    record: Option<Vec<u8>>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory board driver for testing.
///
/// Every capability is opt-in, and every call is counted so tests can assert
/// which tiers were touched. The panics in the builder methods are
/// DELIBERATE: a test that misconfigures its mock should not pass.
///
/// # Examples
///
/// ```
/// use syseeprom_driver::{BoardDriver, MockDriver};
///
/// let mut driver = MockDriver::ready(b"eeprom").with_memory_cache();
/// let blob = driver.read_eeprom().unwrap().unwrap();
/// assert_eq!(blob.as_bytes(), b"eeprom");
/// assert_eq!(driver.calls().live_reads, 1);
/// ```
pub struct MockDriver {
    status: DeviceStatus,
    live: Option<Vec<u8>>,
    live_fails: bool,
    checksum_valid: bool,
    well_formed: bool,
    serial: Field,
    model: Field,
    mac: Field,
    cache: CacheMode,
    fail_cache_writes: bool,
    database: Option<DatabaseState>,
    status_calls: Cell<usize>,
    cache_reads: Cell<usize>,
    calls: Calls,
}

impl MockDriver {
    /// A ready device whose live read returns `live`.
    pub fn ready(live: impl Into<Vec<u8>>) -> Self {
        Self::with_status(DeviceStatus::Ready).with_live(Some(live.into()))
    }

    /// A device reporting itself not ready for `reason`.
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self::with_status(DeviceStatus::not_ready(reason))
    }

    pub fn with_status(status: DeviceStatus) -> Self {
        Self {
            status,
            live: None,
            live_fails: false,
            checksum_valid: true,
            well_formed: true,
            serial: Field::NotSupported,
            model: Field::NotSupported,
            mac: Field::NotSupported,
            cache: CacheMode::Unsupported,
            fail_cache_writes: false,
            database: None,
            status_calls: Cell::new(0),
            cache_reads: Cell::new(0),
            calls: Calls::default(),
        }
    }

    pub fn with_live(mut self, live: Option<Vec<u8>>) -> Self {
        self.live = live;
        self
    }

    /// Make the live read fail with a hardware error.
    pub fn with_failing_live_read(mut self) -> Self {
        self.live_fails = true;
        self
    }

    pub fn with_checksum(mut self, valid: bool) -> Self {
        self.checksum_valid = valid;
        self
    }

    /// Report every blob as too damaged to decode.
    pub fn with_malformed_blobs(mut self) -> Self {
        self.well_formed = false;
        self
    }

    pub fn with_serial(mut self, serial: Field) -> Self {
        self.serial = serial;
        self
    }

    pub fn with_model(mut self, model: Field) -> Self {
        self.model = model;
        self
    }

    pub fn with_mac(mut self, mac: Field) -> Self {
        self.mac = mac;
        self
    }

    /// Support caching, keeping the record in memory.
    pub fn with_memory_cache(mut self) -> Self {
        self.cache = CacheMode::Memory(None);
        self
    }

    /// Support caching with a record already present.
    pub fn with_cached(mut self, cached: impl Into<Vec<u8>>) -> Self {
        self.cache = CacheMode::Memory(Some(cached.into()));
        self
    }

    /// Support caching, keeping the record on disk at whatever identity
    /// the caller binds.
    pub fn with_file_cache(mut self) -> Self {
        self.cache = CacheMode::File(FileCache::new());
        self
    }

    pub fn with_failing_cache_writes(mut self) -> Self {
        if matches!(self.cache, CacheMode::Unsupported) {
            panic!("MockDriver::with_failing_cache_writes: caching not enabled");
        }
        self.fail_cache_writes = true;
        self
    }

    /// Support the database tier, optionally with a stored record.
    pub fn with_database(mut self, record: Option<Vec<u8>>) -> Self {
        self.database = Some(DatabaseState { record, fail_reads: false, fail_writes: false });
        self
    }

    pub fn with_failing_database_reads(mut self) -> Self {
        let Some(db) = self.database.as_mut() else {
            panic!("MockDriver::with_failing_database_reads: database not enabled");
        };
        db.fail_reads = true;
        self
    }

    pub fn with_failing_database_writes(mut self) -> Self {
        let Some(db) = self.database.as_mut() else {
            panic!("MockDriver::with_failing_database_writes: database not enabled");
        };
        db.fail_writes = true;
        self
    }

    pub fn calls(&self) -> Calls {
        Calls {
            status: self.status_calls.get(),
            cache_reads: self.cache_reads.get(),
            ..self.calls.clone()
        }
    }

    /// Current in-memory cache record, if caching is kept in memory.
    pub fn cached(&self) -> Option<&[u8]> {
        match &self.cache {
            CacheMode::Memory(record) => record.as_deref(),
            CacheMode::Unsupported | CacheMode::File(_) => None,
        }
    }

    pub fn database_record(&self) -> Option<&[u8]> {
        self.database.as_ref().and_then(|db| db.record.as_deref())
    }
}

impl BoardDriver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    fn status(&self) -> DeviceStatus {
        self.status_calls.set(self.status_calls.get() + 1);
        self.status.clone()
    }

    fn read_eeprom(&mut self) -> Result<Option<DecodedBlob>> {
        self.calls.live_reads += 1;
        if self.live_fails {
            exn::bail!(ErrorKind::Hardware("mock live read failure".to_string()));
        }
        Ok(self.live.clone().map(|data| DecodedBlob::new(data, Provenance::Live)))
    }

    fn decode(&self, blob: &DecodedBlob) -> Result<DecodedFields> {
        let mut decoded = DecodedFields::new("Mock EEPROM").with_header("Total Length", blob.len());
        for (name, field) in [("Serial Number", &self.serial), ("Product Name", &self.model), ("Base MAC Address", &self.mac)] {
            if let Field::Supported(value) = field {
                decoded = decoded.with_field(name, value.clone());
            }
        }
        Ok(decoded)
    }

    fn is_checksum_valid(&self, _blob: &DecodedBlob) -> ChecksumOutcome {
        match self.checksum_valid {
            true => ChecksumOutcome::valid("0x00000000"),
            false => ChecksumOutcome::mismatch("0x00000000"),
        }
    }

    fn is_well_formed(&self, blob: &DecodedBlob) -> bool {
        self.well_formed && !blob.is_empty()
    }

    fn serial_number(&self, _blob: &DecodedBlob) -> Field {
        self.serial.clone()
    }

    fn model_string(&self, _blob: &DecodedBlob) -> Field {
        self.model.clone()
    }

    fn mgmt_mac(&self, _blob: &DecodedBlob) -> Field {
        self.mac.clone()
    }

    fn cache(&mut self) -> Option<&mut dyn EepromCache> {
        match self.cache {
            CacheMode::Unsupported => None,
            CacheMode::Memory(_) | CacheMode::File(_) => Some(self),
        }
    }

    fn database(&mut self) -> Option<&mut dyn EepromDatabase> {
        match self.database {
            Some(_) => Some(self),
            None => None,
        }
    }
}

impl EepromCache for MockDriver {
    fn set_cache_identity(&mut self, path: &Path) -> Result<()> {
        self.calls.cache_binds += 1;
        match &mut self.cache {
            CacheMode::File(cache) => cache.set_cache_identity(path),
            CacheMode::Memory(_) | CacheMode::Unsupported => Ok(()),
        }
    }

    fn read_cache(&self) -> Result<Option<DecodedBlob>> {
        self.cache_reads.set(self.cache_reads.get() + 1);
        match &self.cache {
            CacheMode::Memory(record) => Ok(record.clone().map(|data| DecodedBlob::new(data, Provenance::Cache))),
            CacheMode::File(cache) => cache.read_cache(),
            CacheMode::Unsupported => Ok(None),
        }
    }

    fn write_cache(&mut self, blob: &DecodedBlob) -> Result<()> {
        self.calls.cache_writes += 1;
        if self.fail_cache_writes {
            exn::bail!(ErrorKind::PermissionDenied("/mock/cache".into()));
        }
        match &mut self.cache {
            CacheMode::Memory(record) => {
                *record = Some(blob.as_bytes().to_vec());
                Ok(())
            },
            CacheMode::File(cache) => cache.write_cache(blob),
            CacheMode::Unsupported => Ok(()),
        }
    }
}

impl EepromDatabase for MockDriver {
    fn read_database(&mut self) -> Result<Option<DecodedBlob>> {
        self.calls.database_reads += 1;
        let Some(db) = self.database.as_ref() else {
            return Ok(None);
        };
        if db.fail_reads {
            exn::bail!(ErrorKind::Database);
        }
        Ok(db.record.clone().map(|data| DecodedBlob::new(data, Provenance::Database)))
    }

    fn write_database(&mut self, blob: &DecodedBlob) -> Result<()> {
        self.calls.database_writes += 1;
        let Some(db) = self.database.as_mut() else {
            exn::bail!(ErrorKind::Database);
        };
        if db.fail_writes {
            exn::bail!(ErrorKind::Database);
        }
        db.record = Some(blob.as_bytes().to_vec());
        Ok(())
    }
}
