//! Board driver for virtual switch platforms.
//!
//! There is no EEPROM chip on a virtual switch, so the "hardware" is an image
//! file (see [`image`]) provisioned next to the OS. Everything else behaves
//! like a physical board: readiness depends on the image being present,
//! reads are cached on disk, and the database tier is backed by the state
//! database when one is configured.

pub mod image;

use self::image::{FIELD_MAC, FIELD_PRODUCT, FIELD_SERIAL, IMAGE_ID, IMAGE_VERSION, VirtualImage};
use crate::error::Result;
use crate::registry::Entry;
use std::fs;
use std::path::PathBuf;
use syseeprom_config::BoardConfig;
use syseeprom_driver::error::{ErrorKind, Result as DriverResult};
use syseeprom_driver::{
    BoardDriver, ChecksumOutcome, DecodedBlob, DecodedFields, DeviceStatus, DriverHandle, EepromCache, EepromDatabase,
    Field, FileCache, MAX_RECORD_SIZE, Provenance,
};
use syseeprom_statedb::BlockingStateDb;

/// Key the EEPROM image is stored under in the state database.
pub const STATE_KEY: &str = "syseeprom";

/// Database tier backed by the state database.
struct StateTier(BlockingStateDb);

impl EepromDatabase for StateTier {
    fn read_database(&mut self) -> DriverResult<Option<DecodedBlob>> {
        let content = self.0.read(STATE_KEY).map_err(|e| e.raise(ErrorKind::Database))?;
        Ok(content.map(|data| DecodedBlob::new(data, Provenance::Database)))
    }

    fn write_database(&mut self, blob: &DecodedBlob) -> DriverResult<()> {
        self.0.write(STATE_KEY, blob.as_bytes()).map_err(|e| e.raise(ErrorKind::Database))
    }
}

pub struct VirtualBoard {
    eeprom: PathBuf,
    cache: FileCache,
    state: Option<StateTier>,
}

impl VirtualBoard {
    pub const ENTRY: Entry = Entry::new("virtual", &["x86_64-kvm_x86_64-*", "x86_64-virtual*"], Self::construct);

    pub fn new(config: &BoardConfig) -> Self {
        Self {
            eeprom: config.eeprom.clone(),
            cache: FileCache::new(),
            state: config.state_db.as_ref().map(|path| StateTier(BlockingStateDb::new(path))),
        }
    }

    fn construct(config: &BoardConfig) -> Result<DriverHandle> {
        Ok(Box::new(Self::new(config)))
    }

    fn image(blob: &DecodedBlob) -> Option<VirtualImage> {
        VirtualImage::parse(blob.as_bytes())
            .inspect_err(|err| tracing::debug!(error = %**err, "Unparseable virtual EEPROM image"))
            .ok()
    }

    fn extract(blob: &DecodedBlob, name: &str) -> Field {
        Self::image(blob).and_then(|image| image.field(name).map(str::to_string)).into()
    }
}

impl BoardDriver for VirtualBoard {
    fn name(&self) -> &str {
        "virtual"
    }

    fn status(&self) -> DeviceStatus {
        match fs::metadata(&self.eeprom) {
            Ok(meta) if meta.is_file() => DeviceStatus::Ready,
            Ok(_) => DeviceStatus::error(format!("{} is not an EEPROM image", self.eeprom.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                DeviceStatus::not_ready(format!("no EEPROM image at {}", self.eeprom.display()))
            },
            Err(err) => DeviceStatus::error(err.to_string()),
        }
    }

    fn read_eeprom(&mut self) -> DriverResult<Option<DecodedBlob>> {
        let data = match fs::read(&self.eeprom) {
            Ok(data) => data,
            // Gone between the readiness check and the read.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => exn::bail!(ErrorKind::io(err, &self.eeprom)),
        };
        if data.is_empty() {
            return Ok(None);
        }
        if data.len() > MAX_RECORD_SIZE {
            exn::bail!(ErrorKind::Malformed(format!("{} bytes is too large for an EEPROM image", data.len())));
        }
        tracing::debug!(path = %self.eeprom.display(), bytes = data.len(), "Read virtual EEPROM image");
        Ok(Some(DecodedBlob::new(data, Provenance::Live)))
    }

    fn decode(&self, blob: &DecodedBlob) -> DriverResult<DecodedFields> {
        let image = VirtualImage::parse(blob.as_bytes())?;
        let id = String::from_utf8_lossy(IMAGE_ID.strip_suffix(b"\0").unwrap_or(IMAGE_ID)).into_owned();
        let mut decoded = DecodedFields::new("Virtual EEPROM Header")
            .with_header("Id String", id)
            .with_header("Version", IMAGE_VERSION)
            .with_header("Total Length", image::payload_len(blob.as_bytes()).unwrap_or_default());
        for field in image.fields {
            decoded = decoded.with_field(field.name, field.value);
        }
        Ok(decoded)
    }

    fn is_checksum_valid(&self, blob: &DecodedBlob) -> ChecksumOutcome {
        image::checksum(blob.as_bytes())
    }

    fn is_well_formed(&self, blob: &DecodedBlob) -> bool {
        Self::image(blob).is_some()
    }

    fn serial_number(&self, blob: &DecodedBlob) -> Field {
        Self::extract(blob, FIELD_SERIAL)
    }

    fn model_string(&self, blob: &DecodedBlob) -> Field {
        Self::extract(blob, FIELD_PRODUCT)
    }

    fn mgmt_mac(&self, blob: &DecodedBlob) -> Field {
        Self::extract(blob, FIELD_MAC)
    }

    fn cache(&mut self) -> Option<&mut dyn EepromCache> {
        Some(&mut self.cache)
    }

    fn database(&mut self) -> Option<&mut dyn EepromDatabase> {
        self.state.as_mut().map(|tier| tier as &mut dyn EepromDatabase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config(dir: &Path, state_db: bool) -> BoardConfig {
        BoardConfig {
            driver: None,
            eeprom: dir.join("syseeprom.bin"),
            state_db: state_db.then(|| dir.join("state.db")),
        }
    }

    fn provision(config: &BoardConfig) -> Vec<u8> {
        let bytes = VirtualImage::default()
            .with_field(FIELD_PRODUCT, "SONiC-VS")
            .with_field(FIELD_SERIAL, "VS-0001")
            .with_field(FIELD_MAC, "52:54:00:12:34:56")
            .encode()
            .unwrap();
        fs::write(&config.eeprom, &bytes).unwrap();
        bytes
    }

    #[test]
    fn test_not_ready_without_image() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path(), false);
        let mut board = VirtualBoard::new(&config);
        let status = board.status();
        assert_eq!(status, DeviceStatus::not_ready(format!("no EEPROM image at {}", config.eeprom.display())));
        assert!(board.read_eeprom().unwrap().is_none());
    }

    #[test]
    fn test_directory_is_error_status() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = config(temp_dir.path(), false);
        config.eeprom = temp_dir.path().to_path_buf();
        assert!(matches!(VirtualBoard::new(&config).status(), DeviceStatus::Error(_)));
    }

    #[test]
    fn test_read_and_extract() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path(), false);
        let bytes = provision(&config);
        let mut board = VirtualBoard::new(&config);
        assert!(board.status().is_ready());
        let blob = board.read_eeprom().unwrap().unwrap();
        assert_eq!(blob.as_bytes(), bytes);
        assert_eq!(blob.provenance(), Provenance::Live);
        assert_eq!(board.serial_number(&blob), Field::Supported("VS-0001".to_string()));
        assert_eq!(board.model_string(&blob), Field::Supported("SONiC-VS".to_string()));
        assert_eq!(board.mgmt_mac(&blob), Field::Supported("52:54:00:12:34:56".to_string()));
        assert!(board.is_checksum_valid(&blob).valid);
    }

    #[test]
    fn test_missing_field_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path(), false);
        fs::write(&config.eeprom, VirtualImage::default().with_field(FIELD_SERIAL, "VS-0002").encode().unwrap())
            .unwrap();
        let mut board = VirtualBoard::new(&config);
        let blob = board.read_eeprom().unwrap().unwrap();
        assert_eq!(board.mgmt_mac(&blob), Field::Empty);
        let garbage = DecodedBlob::new(b"not an image".to_vec(), Provenance::Live);
        assert_eq!(board.serial_number(&garbage), Field::Empty);
    }

    #[test]
    fn test_decode() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path(), false);
        provision(&config);
        let mut board = VirtualBoard::new(&config);
        let blob = board.read_eeprom().unwrap().unwrap();
        let decoded = board.decode(&blob).unwrap();
        assert_eq!(decoded.title, "Virtual EEPROM Header");
        assert_eq!(decoded.header[0], ("Id String".to_string(), "VEEPROM".to_string()));
        assert_eq!(decoded.get(FIELD_SERIAL), Some("VS-0001"));
        assert_eq!(decoded.fields.len(), 3);
        let garbage = DecodedBlob::new(b"not an image".to_vec(), Provenance::Live);
        assert!(board.decode(&garbage).is_err());
    }

    #[test]
    fn test_well_formed_ignores_checksum() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path(), false);
        let mut bytes = provision(&config);
        let board = VirtualBoard::new(&config);
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(board.is_well_formed(&DecodedBlob::new(bytes.clone(), Provenance::Cache)));
        bytes.truncate(bytes.len() / 2);
        assert!(!board.is_well_formed(&DecodedBlob::new(bytes, Provenance::Cache)));
        assert!(!board.is_well_formed(&DecodedBlob::new(b"truncated garbage".to_vec(), Provenance::Cache)));
    }

    #[test]
    fn test_capabilities() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut without_db = VirtualBoard::new(&config(temp_dir.path(), false));
        assert!(without_db.cache().is_some());
        assert!(without_db.database().is_none());
        let mut with_db = VirtualBoard::new(&config(temp_dir.path(), true));
        assert!(with_db.database().is_some());
    }

    #[test]
    fn test_database_tier() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path(), true);
        provision(&config);
        let mut board = VirtualBoard::new(&config);
        let blob = board.read_eeprom().unwrap().unwrap();
        let db = board.database().unwrap();
        assert!(db.read_database().unwrap().is_none());
        db.write_database(&blob).unwrap();
        let stored = db.read_database().unwrap().unwrap();
        assert_eq!(stored.provenance(), Provenance::Database);
        assert!(stored.is_equivalent(&blob));
    }
}
