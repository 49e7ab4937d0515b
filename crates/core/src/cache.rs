//! Read-through cache over the driver's caching capability.
//!
//! The store owns the cache *location*; the driver owns the record format.
//! Every failure here except [`clear`](CacheStore::clear) is meant to be
//! discarded by the caller: a broken cache degrades to a cache miss.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use syseeprom_config::CacheConfig;
use syseeprom_driver::{BoardDriver, DecodedBlob};

pub struct CacheStore {
    config: CacheConfig,
    bound: bool,
}

impl CacheStore {
    pub fn new(config: CacheConfig) -> Self {
        Self { config, bound: false }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Path of the record the driver is bound to.
    pub fn record(&self) -> PathBuf {
        self.config.record()
    }

    /// Whether the last [`configure`](Self::configure) bound a record.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Create the cache root if it doesn't exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(self.root()).or_raise(|| ErrorKind::CacheRoot(self.root().to_path_buf()))
    }

    /// Point the driver's cache at the configured record.
    ///
    /// Returns `false` if the driver has no caching capability; reads and
    /// writes are then no-ops.
    pub fn configure(&mut self, driver: &mut dyn BoardDriver) -> Result<bool> {
        self.bound = false;
        let Some(cache) = driver.cache() else {
            tracing::debug!(driver = driver.name(), "Driver does not support caching");
            return Ok(false);
        };
        let record = self.config.record();
        cache.set_cache_identity(&record).map_err(|e| e.raise(ErrorKind::Cache))?;
        tracing::debug!(record = %record.display(), "Bound cache record");
        self.bound = true;
        Ok(true)
    }

    /// Delete every entry under the cache root, returning how many were
    /// removed. A missing root is already clear.
    pub fn clear(&self) -> Result<usize> {
        let root = self.root();
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err).or_raise(|| ErrorKind::CacheClear(root.to_path_buf())),
        };
        let mut removed = 0;
        for entry in entries {
            let entry = entry.or_raise(|| ErrorKind::CacheClear(root.to_path_buf()))?;
            let path = entry.path();
            let is_dir = entry.file_type().or_raise(|| ErrorKind::CacheClear(path.clone()))?.is_dir();
            let outcome = match is_dir {
                true => fs::remove_dir_all(&path),
                false => fs::remove_file(&path),
            };
            match outcome {
                Ok(()) => removed += 1,
                // Raced with another remover.
                Err(err) if err.kind() == IoErrorKind::NotFound => {},
                Err(err) => return Err(err).or_raise(|| ErrorKind::CacheClear(path)),
            }
        }
        tracing::debug!(root = %root.display(), removed, "Cleared cache root");
        Ok(removed)
    }

    /// Read the bound record. Unbound, unsupported or a record the driver
    /// can't decode is a miss.
    pub fn read(&self, driver: &mut dyn BoardDriver) -> Result<Option<DecodedBlob>> {
        if !self.bound {
            return Ok(None);
        }
        let Some(cache) = driver.cache() else {
            return Ok(None);
        };
        let Some(blob) = cache.read_cache().map_err(|e| e.raise(ErrorKind::Cache))? else {
            return Ok(None);
        };
        if !driver.is_well_formed(&blob) {
            tracing::debug!(record = %self.record().display(), bytes = blob.len(), "Ignoring malformed cache record");
            return Ok(None);
        }
        Ok(Some(blob))
    }

    /// Persist `blob` for later invocations.
    pub fn write(&self, driver: &mut dyn BoardDriver, blob: &DecodedBlob) -> Result<()> {
        if !self.bound {
            return Ok(());
        }
        let Some(cache) = driver.cache() else {
            return Ok(());
        };
        cache.write_cache(blob).map_err(|e| e.raise(ErrorKind::Cache))
    }
}
