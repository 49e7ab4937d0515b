//! File-backed cache capability.
//!
//! Drivers that keep a copy of their last EEPROM read on disk can embed a
//! [`FileCache`] and hand it out from [`BoardDriver::cache()`](crate::BoardDriver::cache).

use crate::driver::EepromCache;
use crate::error::{ErrorKind, Result};
use crate::models::{DecodedBlob, Provenance};
use exn::OptionExt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Records larger than this are not EEPROM images, whatever they are.
pub const MAX_RECORD_SIZE: usize = 64 * 1024;

/// Single cache record stored as a plain file.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use syseeprom_driver::{DecodedBlob, EepromCache, FileCache, Provenance};
///
/// # fn example() -> syseeprom_driver::error::Result<()> {
/// let mut cache = FileCache::new();
/// cache.set_cache_identity(Path::new("/var/cache/sonic/decode-syseeprom/syseeprom_cache"))?;
/// cache.write_cache(&DecodedBlob::new(b"...".to_vec(), Provenance::Live))?;
/// assert!(cache.read_cache()?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct FileCache {
    path: Option<PathBuf>,
}
impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the bound record, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl EepromCache for FileCache {
    fn set_cache_identity(&mut self, path: &Path) -> Result<()> {
        if !path.is_absolute() || path.file_name().is_none() {
            exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
        }
        if let Some(parent) = path.parent()
            && parent.exists()
            && !parent.is_dir()
        {
            exn::bail!(ErrorKind::InvalidPath(parent.to_path_buf()));
        }
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn read_cache(&self) -> Result<Option<DecodedBlob>> {
        let Some(path) = self.path.as_deref() else {
            return Ok(None);
        };
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => exn::bail!(ErrorKind::io(err, path)),
        };
        if data.is_empty() || data.len() > MAX_RECORD_SIZE {
            tracing::debug!(path = %path.display(), bytes = data.len(), "Ignoring unusable cache record");
            return Ok(None);
        }
        Ok(Some(DecodedBlob::new(data, Provenance::Cache)))
    }

    fn write_cache(&mut self, blob: &DecodedBlob) -> Result<()> {
        let path = self.path.as_deref().ok_or_raise(|| ErrorKind::Unbound)?;
        let parent = path.parent().ok_or_raise(|| ErrorKind::InvalidPath(path.to_path_buf()))?;
        // Write next to the record and rename over it, so a reader never
        // sees half a record.
        let mut staged = NamedTempFile::new_in(parent).map_err(|e| ErrorKind::io(e, parent))?;
        staged.write_all(blob.as_bytes()).map_err(|e| ErrorKind::io(e, staged.path()))?;
        staged.persist(path).map_err(|e| ErrorKind::io(e.error, path))?;
        tracing::debug!(path = %path.display(), bytes = blob.len(), "Cache record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(data: &[u8]) -> DecodedBlob {
        DecodedBlob::new(data.to_vec(), Provenance::Live)
    }

    #[test]
    fn test_identity_requires_absolute_path() {
        let mut cache = FileCache::new();
        assert!(cache.set_cache_identity(Path::new("relative/record")).is_err());
        assert!(cache.set_cache_identity(Path::new("/")).is_err());
        assert!(cache.path().is_none());
    }

    #[test]
    fn test_identity_rejects_file_as_parent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let not_a_dir = temp_dir.path().join("file");
        fs::write(&not_a_dir, b"data").unwrap();
        let mut cache = FileCache::new();
        let err = cache.set_cache_identity(&not_a_dir.join("record")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[test]
    fn test_unbound_cache_misses_and_refuses_writes() {
        let mut cache = FileCache::new();
        assert!(cache.read_cache().unwrap().is_none());
        let err = cache.write_cache(&blob(b"data")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unbound));
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new();
        cache.set_cache_identity(&temp_dir.path().join("syseeprom_cache")).unwrap();
        assert!(cache.read_cache().unwrap().is_none());
        cache.write_cache(&blob(b"eeprom image")).unwrap();
        let cached = cache.read_cache().unwrap().unwrap();
        assert_eq!(cached.as_bytes(), b"eeprom image");
        assert_eq!(cached.provenance(), Provenance::Cache);
    }

    #[test]
    fn test_write_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new();
        cache.set_cache_identity(&temp_dir.path().join("syseeprom_cache")).unwrap();
        cache.write_cache(&blob(b"first")).unwrap();
        cache.write_cache(&blob(b"second")).unwrap();
        assert_eq!(cache.read_cache().unwrap().unwrap().as_bytes(), b"second");
        // Only the record itself is left behind, no staging files.
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_later_instance_sees_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let record = temp_dir.path().join("syseeprom_cache");
        let mut first = FileCache::new();
        first.set_cache_identity(&record).unwrap();
        first.write_cache(&blob(b"persisted")).unwrap();
        let mut second = FileCache::new();
        second.set_cache_identity(&record).unwrap();
        assert_eq!(second.read_cache().unwrap().unwrap().as_bytes(), b"persisted");
    }

    #[test]
    fn test_unusable_records_are_misses() {
        let temp_dir = tempfile::tempdir().unwrap();
        let record = temp_dir.path().join("syseeprom_cache");
        let mut cache = FileCache::new();
        cache.set_cache_identity(&record).unwrap();
        fs::write(&record, b"").unwrap();
        assert!(cache.read_cache().unwrap().is_none());
        fs::write(&record, vec![0u8; MAX_RECORD_SIZE + 1]).unwrap();
        assert!(cache.read_cache().unwrap().is_none());
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new();
        cache.set_cache_identity(&temp_dir.path().join("missing/syseeprom_cache")).unwrap();
        let err = cache.write_cache(&blob(b"data")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }
}
