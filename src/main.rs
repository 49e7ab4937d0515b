mod cli;
mod error;
mod logging;
mod privilege;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use std::io;
use std::process::ExitCode;
use syseeprom_boards::Registry;
use syseeprom_config::Config;
use syseeprom_core::{Console, ExitStatus};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Nowhere left to report a failed write of the usage message.
            let _ = err.print();
            return cli::parse_failure_status(&err).into();
        },
    };
    logging::init();

    match run(&cli) {
        Ok(status) => status.into(),
        Err(err) => {
            tracing::debug!(error = ?err, retryable = err.is_retryable(), "Aborting");
            eprintln!("{}", *err);
            ExitStatus::Failure.into()
        },
    }
}

fn run(cli: &Cli) -> Result<ExitStatus> {
    let config = Config::load().map_err(|e| {
        let message = (*e).to_string();
        e.raise(ErrorKind::Config(message))
    })?;
    if config.require_root {
        privilege::require_root()?;
    }

    let platform = syseeprom_boards::identify(&config.platform).map_err(|e| {
        let message = (*e).to_string();
        e.raise(ErrorKind::Setup(message))
    })?;
    let mut driver = Registry::builtin().resolve(&platform, &config.board).map_err(|e| {
        let message = (*e).to_string();
        e.raise(ErrorKind::Setup(message))
    })?;

    let request = cli.request();
    tracing::debug!(%platform, driver = driver.name(), mode = ?request.mode, "Starting");
    let (mut out, mut err) = (io::stdout().lock(), io::stderr().lock());
    let mut console = Console::new(&mut out, &mut err);
    syseeprom_core::run(driver.as_mut(), config.cache, request, &mut console).map_err(|e| {
        let message = (*e).to_string();
        e.raise(ErrorKind::Run(message))
    })
}
