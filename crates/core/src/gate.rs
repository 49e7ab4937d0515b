//! Readiness gate in front of live hardware reads.

use crate::console::Console;
use crate::error::Result;
use syseeprom_driver::{BoardDriver, DeviceStatus};

pub struct ReadinessGate;

impl ReadinessGate {
    /// Query the driver for a fresh status.
    pub fn status(driver: &dyn BoardDriver) -> DeviceStatus {
        driver.status()
    }

    /// Diagnostic shown when the device refuses access.
    pub fn diagnostic(status: &DeviceStatus) -> String {
        format!("Device is not ready: {status}")
    }

    /// Returns `true` if a live read may proceed. Otherwise the status is
    /// reported on the diagnostic stream and the caller ends with no data.
    pub fn admit(driver: &dyn BoardDriver, console: &mut Console<'_>) -> Result<bool> {
        let status = Self::status(driver);
        if status.is_ready() {
            return Ok(true);
        }
        tracing::debug!(driver = driver.name(), %status, "Device not ready; skipping live read");
        console.report(Self::diagnostic(&status))?;
        Ok(false)
    }
}
