//! What a single invocation asks for.

use syseeprom_driver::FieldKind;

/// Output projection. Exactly one is active per invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryMode {
    /// Full decode of the database record (`-d` on its own).
    ReadDatabase,
    PrintSerial,
    PrintModel,
    PrintMac,
    /// Clear the cache, re-read the hardware and write through to the
    /// database tier.
    Initialize,
    #[default]
    DecodeAndPrint,
}
impl QueryMode {
    /// The identity field this mode prints, if it prints one.
    pub fn field(self) -> Option<FieldKind> {
        match self {
            Self::PrintSerial => Some(FieldKind::SerialNumber),
            Self::PrintModel => Some(FieldKind::ModelString),
            Self::PrintMac => Some(FieldKind::MgmtMac),
            Self::ReadDatabase | Self::Initialize | Self::DecodeAndPrint => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Request {
    pub mode: QueryMode,
    /// Try the database tier before anything else.
    pub database_first: bool,
}
impl Request {
    pub fn new(mode: QueryMode, database_first: bool) -> Self {
        Self { mode, database_first: database_first || mode == QueryMode::ReadDatabase }
    }

    /// Whether the database tier is tried first. Never for
    /// [`Initialize`](QueryMode::Initialize), which must clear the cache
    /// before anything else.
    pub fn prefers_database(&self) -> bool {
        self.database_first && !self.is_initialize()
    }

    pub fn is_initialize(&self) -> bool {
        self.mode == QueryMode::Initialize
    }
}
