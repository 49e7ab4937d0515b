//! Output and diagnostic streams.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fmt::Display;
use std::io::Write;

/// The two streams an invocation writes to: requested data goes to `out`,
/// everything else (diagnostics, informational notes) goes to `err`.
pub struct Console<'a> {
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
}
impl<'a> Console<'a> {
    pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Self { out, err }
    }

    /// Print one line of output.
    pub fn line(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.out, "{text}").or_raise(|| ErrorKind::Output)
    }

    /// Print pre-formatted output that carries its own line endings.
    pub fn block(&mut self, text: impl Display) -> Result<()> {
        write!(self.out, "{text}").or_raise(|| ErrorKind::Output)
    }

    /// Print one line to the diagnostic stream.
    pub fn report(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.err, "{text}").or_raise(|| ErrorKind::Output)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().or_raise(|| ErrorKind::Output)?;
        self.err.flush().or_raise(|| ErrorKind::Output)
    }
}
