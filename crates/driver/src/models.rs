//! Driver models.
//!
//! These types flow between a board driver and the acquisition pipeline. None
//! of them know which hardware produced them.

use derive_more::Display;
use std::fmt;
use std::sync::Arc;

/// Which tier a [`DecodedBlob`] was obtained from.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Provenance {
    #[display("database")]
    Database,
    #[display("cache")]
    Cache,
    #[display("live read")]
    Live,
}

/// EEPROM contents obtained from any tier.
///
/// Immutable once produced: the bytes are shared, never mutated, and the
/// provenance is fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedBlob {
    bytes: Arc<[u8]>,
    provenance: Provenance,
}
impl DecodedBlob {
    pub fn new(bytes: impl Into<Vec<u8>>, provenance: Provenance) -> Self {
        Self { bytes: Arc::from(bytes.into()), provenance }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Same contents, regardless of which tier each blob came from.
    pub fn is_equivalent(&self, other: &DecodedBlob) -> bool {
        self.bytes == other.bytes
    }
}
impl AsRef<[u8]> for DecodedBlob {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Operational state reported by a board driver.
///
/// Produced fresh for every acquisition attempt and never persisted.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum DeviceStatus {
    #[display("ok")]
    Ready,
    #[display("{_0}")]
    NotReady(String),
    #[display("error: {_0}")]
    Error(String),
}
impl DeviceStatus {
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self::NotReady(reason.into())
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Result of checking a blob's integrity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecksumOutcome {
    pub valid: bool,
    /// Checksum the driver computed from the contents, when the blob was
    /// well-formed enough to compute one.
    pub expected: Option<String>,
}
impl ChecksumOutcome {
    pub fn valid(expected: impl Into<String>) -> Self {
        Self { valid: true, expected: Some(expected.into()) }
    }

    pub fn mismatch(expected: impl Into<String>) -> Self {
        Self { valid: false, expected: Some(expected.into()) }
    }

    /// Blob too damaged to even locate its checksum.
    pub fn malformed() -> Self {
        Self { valid: false, expected: None }
    }
}

/// Outcome of a field extractor.
///
/// Drivers that cannot provide a field at all say so with
/// [`NotSupported`](Self::NotSupported); drivers that could, but whose EEPROM
/// simply doesn't carry it, return [`Empty`](Self::Empty).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field<T = String> {
    Supported(T),
    NotSupported,
    Empty,
}
impl<T> Field<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Self::Supported(value) => Field::Supported(f(value)),
            Self::NotSupported => Field::NotSupported,
            Self::Empty => Field::Empty,
        }
    }
}
impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Supported(value),
            None => Self::Empty,
        }
    }
}

/// The identity fields that can be requested on their own.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum FieldKind {
    #[display("Serial number")]
    SerialNumber,
    #[display("Model")]
    ModelString,
    #[display("Management MAC address")]
    MgmtMac,
}

/// One decoded EEPROM entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedField {
    pub name: String,
    pub value: String,
}
impl DecodedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Structured output of a full decode, ready to be printed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedFields {
    /// Heading printed above the header lines (e.g. `"TlvInfo Header"`).
    pub title: String,
    pub header: Vec<(String, String)>,
    pub fields: Vec<DecodedField>,
}
impl DecodedFields {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    pub fn with_header(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.header.push((label.into(), value.to_string()));
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(DecodedField::new(name, value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.value.as_str())
    }
}
impl fmt::Display for DecodedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.title.is_empty() {
            writeln!(f, "{}:", self.title)?;
        }
        for (label, value) in &self.header {
            writeln!(f, "   {:<14}{}", format!("{label}:"), value)?;
        }
        writeln!(f, "{:<20} Value", "Field Name")?;
        writeln!(f, "{:-<20} {:-<5}", "", "")?;
        for field in &self.fields {
            writeln!(f, "{:<20} {}", field.name, field.value)?;
        }
        Ok(())
    }
}
