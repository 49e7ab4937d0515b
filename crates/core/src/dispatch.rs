//! Output projections over an acquired blob.

use crate::checksum::ChecksumValidator;
use crate::console::Console;
use crate::error::{ErrorKind, Result};
use crate::request::{QueryMode, Request};
use derive_more::Display;
use syseeprom_driver::{BoardDriver, DecodedBlob, Field, FieldKind, Provenance};
use tracing::instrument;

/// Printed in place of a field the EEPROM doesn't carry.
pub const UNDEFINED: &str = "Undefined.";
pub const DATABASE_WRITE_FAILED: &str = "Failed to update system EEPROM database";

/// Process exit status of one invocation.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ExitStatus {
    /// Success, or no data available.
    #[display("success")]
    Success,
    /// Setup error, interrupted or failed read.
    #[display("failure")]
    Failure,
    /// The database write during initialization failed.
    #[display("database write failure")]
    DatabaseWrite,
}
impl ExitStatus {
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::DatabaseWrite => 2,
        }
    }
}
impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}

pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Render `blob` the way `request` asks for. No blob, no output.
    #[instrument(skip_all, fields(mode = ?request.mode))]
    pub fn dispatch(
        driver: &mut dyn BoardDriver,
        request: &Request,
        blob: Option<&DecodedBlob>,
        console: &mut Console<'_>,
    ) -> Result<ExitStatus> {
        let Some(blob) = blob else {
            tracing::debug!("No EEPROM data; nothing to print");
            return Ok(ExitStatus::Success);
        };
        match request.mode {
            QueryMode::Initialize => Self::initialize(driver, blob, console),
            QueryMode::PrintSerial => Self::print_field(&*driver, blob, FieldKind::SerialNumber, console),
            QueryMode::PrintModel => Self::print_field(&*driver, blob, FieldKind::ModelString, console),
            QueryMode::PrintMac => Self::print_field(&*driver, blob, FieldKind::MgmtMac, console),
            QueryMode::ReadDatabase | QueryMode::DecodeAndPrint => Self::print_decoded(&*driver, blob, console),
        }
    }

    /// Write the freshly read blob through to the database tier.
    fn initialize(driver: &mut dyn BoardDriver, blob: &DecodedBlob, console: &mut Console<'_>) -> Result<ExitStatus> {
        let name = driver.name().to_string();
        let Some(database) = driver.database() else {
            tracing::info!(driver = %name, "Driver has no database tier; nothing to initialize");
            return Ok(ExitStatus::Success);
        };
        match database.write_database(blob) {
            Ok(()) => {
                tracing::info!(driver = %name, bytes = blob.len(), "Initialized system EEPROM database");
                Ok(ExitStatus::Success)
            },
            Err(err) => {
                tracing::debug!(error = ?err, "Database write failed");
                console.report(DATABASE_WRITE_FAILED)?;
                Ok(ExitStatus::DatabaseWrite)
            },
        }
    }

    fn print_field(
        driver: &dyn BoardDriver,
        blob: &DecodedBlob,
        kind: FieldKind,
        console: &mut Console<'_>,
    ) -> Result<ExitStatus> {
        match driver.field(blob, kind) {
            Field::Supported(value) => console.line(value)?,
            Field::Empty => console.line(UNDEFINED)?,
            Field::NotSupported => console.report(format!("{kind} is not supported by this board"))?,
        }
        Ok(ExitStatus::Success)
    }

    /// Full decode. Blobs that came from the database are printed without a
    /// checksum annotation.
    fn print_decoded(driver: &dyn BoardDriver, blob: &DecodedBlob, console: &mut Console<'_>) -> Result<ExitStatus> {
        let decoded = driver.decode(blob).map_err(|e| e.raise(ErrorKind::Decode))?;
        console.block(&decoded)?;
        if blob.provenance() != Provenance::Database {
            let outcome = ChecksumValidator::validate(driver, blob);
            console.line(ChecksumValidator::annotation(&outcome))?;
        }
        Ok(ExitStatus::Success)
    }
}
