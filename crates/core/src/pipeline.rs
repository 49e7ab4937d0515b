//! Tiered EEPROM acquisition.
//!
//! Tiers are tried in a fixed order and the first one to produce data wins:
//!
//! 1. the database tier, when the request prefers it and the driver has one,
//! 2. the cache record, once the device has been found ready,
//! 3. a live hardware read, which then refreshes the cache.
//!
//! Database and cache are accelerators. Their failures are logged at `debug`
//! and discarded; only a not-ready device, a failed live read, or failing to
//! clear the cache for `--init` change the outcome.

use crate::cache::CacheStore;
use crate::console::Console;
use crate::error::{ErrorKind, Result};
use crate::gate::ReadinessGate;
use crate::request::Request;
use syseeprom_driver::error::ErrorKind as DriverErrorKind;
use syseeprom_driver::{BoardDriver, DecodedBlob};
use tracing::instrument;

pub struct AcquisitionPipeline<'d> {
    driver: &'d mut dyn BoardDriver,
    cache: CacheStore,
}

impl<'d> AcquisitionPipeline<'d> {
    pub fn new(driver: &'d mut dyn BoardDriver, cache: CacheStore) -> Self {
        Self { driver, cache }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Obtain one blob, or `None` if no tier had data for us.
    ///
    /// A not-ready device is reported on the console's diagnostic stream and
    /// yields `None`.
    #[instrument(skip_all, fields(driver = self.driver.name(), mode = ?request.mode))]
    pub fn acquire(&mut self, request: &Request, console: &mut Console<'_>) -> Result<Option<DecodedBlob>> {
        if request.prefers_database()
            && let Some(blob) = self.read_database()
        {
            tracing::debug!(bytes = blob.len(), "Using database record");
            return Ok(Some(blob));
        }

        if !ReadinessGate::admit(&*self.driver, console)? {
            return Ok(None);
        }

        // Without a root the bind below fails and we run uncached.
        if let Err(err) = self.cache.ensure_root() {
            tracing::debug!(error = ?err, "Failed to create cache root");
        }
        if request.is_initialize() {
            let removed = self.cache.clear()?;
            tracing::info!(root = %self.cache.root().display(), removed, "Cleared cache for initialization");
        }

        let cached = match self.cache.configure(&mut *self.driver) {
            Ok(bound) => bound,
            Err(err) => {
                tracing::debug!(error = ?err, "Failed to bind cache record; continuing uncached");
                false
            },
        };
        if cached && !request.is_initialize() {
            match self.cache.read(&mut *self.driver) {
                Ok(Some(blob)) => {
                    tracing::debug!(bytes = blob.len(), "Cache hit");
                    return Ok(Some(blob));
                },
                Ok(None) => tracing::debug!("Cache miss"),
                Err(err) => tracing::debug!(error = ?err, "Failed to read cache record; treating as a miss"),
            }
        }

        let Some(blob) = self.read_live()? else {
            tracing::info!("Hardware returned no EEPROM data");
            return Ok(None);
        };

        if cached && let Err(err) = self.cache.write(&mut *self.driver, &blob) {
            tracing::debug!(error = ?err, "Failed to write cache record");
        }
        Ok(Some(blob))
    }

    /// Database lookup. Every failure, "unsupported" included, falls through
    /// to the next tier.
    fn read_database(&mut self) -> Option<DecodedBlob> {
        let Some(database) = self.driver.database() else {
            tracing::debug!("Driver has no database tier");
            return None;
        };
        match database.read_database() {
            Ok(Some(blob)) => Some(blob),
            Ok(None) => {
                tracing::debug!("No database record");
                None
            },
            Err(err) => {
                tracing::debug!(error = ?err, "Database read failed; falling through");
                None
            },
        }
    }

    fn read_live(&mut self) -> Result<Option<DecodedBlob>> {
        self.driver.read_eeprom().map_err(|e| {
            let kind = match &*e {
                DriverErrorKind::Interrupted => ErrorKind::Interrupted,
                _ => ErrorKind::LiveRead,
            };
            e.raise(kind)
        })
    }
}
