//! Command-line interface.

use clap::error::ErrorKind as ClapErrorKind;
use clap::{ArgGroup, Parser};
use syseeprom_core::{ExitStatus, QueryMode, Request};

/// Print the system EEPROM: serial number, model, management MAC or the
/// full decoded contents.
#[derive(Debug, Parser)]
#[command(name = "decode-syseeprom", version, about)]
#[command(group(ArgGroup::new("mode").args(["serial", "product", "mac", "init"]).multiple(false)))]
pub struct Cli {
    /// Read from the EEPROM database first, falling back to the hardware
    #[arg(short = 'd', long = "db")]
    pub db: bool,
    /// Print the serial number
    #[arg(short, long)]
    pub serial: bool,
    /// Print the model (product name)
    #[arg(short, long)]
    pub product: bool,
    /// Print the management MAC address
    #[arg(short, long)]
    pub mac: bool,
    /// Clear the cache, re-read the EEPROM and store it in the database
    #[arg(long)]
    pub init: bool,
}

impl Cli {
    pub fn mode(&self) -> QueryMode {
        match self {
            Self { init: true, .. } => QueryMode::Initialize,
            Self { serial: true, .. } => QueryMode::PrintSerial,
            Self { product: true, .. } => QueryMode::PrintModel,
            Self { mac: true, .. } => QueryMode::PrintMac,
            Self { db: true, .. } => QueryMode::ReadDatabase,
            _ => QueryMode::DecodeAndPrint,
        }
    }

    pub fn request(&self) -> Request {
        Request::new(self.mode(), self.db)
    }
}

/// Help and version requests succeed; any usage error is a setup failure.
pub fn parse_failure_status(err: &clap::Error) -> ExitStatus {
    match err.kind() {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => ExitStatus::Success,
        _ => ExitStatus::Failure,
    }
}
