//! Emulated EEPROM image format.
//!
//! ```text
//! +----------------+---------+-------------+---------------+----------+
//! | id "VEEPROM\0" | version | payload len | JSON payload  | CRC-32   |
//! | 8 bytes        | u8      | u16 BE      | `len` bytes   | u32 BE   |
//! +----------------+---------+-------------+---------------+----------+
//! ```
//!
//! The CRC covers every byte before it. The layout mirrors an ONIE TlvInfo
//! header closely enough that tooling expecting "id, version, length, data,
//! CRC" works on it, with readable JSON in place of TLV records.

use serde::{Deserialize, Serialize};
use syseeprom_driver::ChecksumOutcome;
use syseeprom_driver::error::{ErrorKind, Result};

pub const IMAGE_ID: &[u8; 8] = b"VEEPROM\0";
pub const IMAGE_VERSION: u8 = 1;
const HEADER_LEN: usize = IMAGE_ID.len() + 1 + 2;
const CRC_LEN: usize = 4;

pub const FIELD_SERIAL: &str = "Serial Number";
pub const FIELD_PRODUCT: &str = "Product Name";
pub const FIELD_MAC: &str = "Base MAC Address";

/// An image split into its parts. Only the framing is checked; the CRC and
/// payload are left for the caller to judge.
struct Frame<'a> {
    version: u8,
    payload: &'a [u8],
    covered: &'a [u8],
    stored_crc: u32,
}
impl<'a> Frame<'a> {
    fn split(bytes: &'a [u8]) -> Option<Self> {
        let header = bytes.get(..HEADER_LEN)?;
        if &header[..IMAGE_ID.len()] != IMAGE_ID {
            return None;
        }
        let version = header[IMAGE_ID.len()];
        let payload_len = u16::from_be_bytes([header[IMAGE_ID.len() + 1], header[IMAGE_ID.len() + 2]]) as usize;
        if bytes.len() != HEADER_LEN + payload_len + CRC_LEN {
            return None;
        }
        let (covered, crc) = bytes.split_at(HEADER_LEN + payload_len);
        Some(Self {
            version,
            payload: &covered[HEADER_LEN..],
            covered,
            stored_crc: u32::from_be_bytes(crc.try_into().ok()?),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageField {
    pub name: String,
    pub value: String,
}

/// Contents of an emulated EEPROM.
///
/// # Examples
///
/// ```
/// use syseeprom_boards::VirtualImage;
///
/// let bytes = VirtualImage::default()
///     .with_field("Serial Number", "VS-0001")
///     .encode()
///     .unwrap();
/// let image = VirtualImage::parse(&bytes).unwrap();
/// assert_eq!(image.field("Serial Number"), Some("VS-0001"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualImage {
    pub fields: Vec<ImageField>,
}
impl VirtualImage {
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(ImageField { name: name.into(), value: value.into() });
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.value.as_str())
    }

    /// Serialize into a framed image with a valid CRC.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = serde_json::to_vec(self).map_err(|e| ErrorKind::Malformed(e.to_string()))?;
        let payload_len = u16::try_from(payload.len())
            .map_err(|_| ErrorKind::Malformed(format!("payload of {} bytes does not fit", payload.len())))?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len() + CRC_LEN);
        bytes.extend_from_slice(IMAGE_ID);
        bytes.push(IMAGE_VERSION);
        bytes.extend_from_slice(&payload_len.to_be_bytes());
        bytes.extend_from_slice(&payload);
        let crc = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&crc.to_be_bytes());
        Ok(bytes)
    }

    /// Parse a framed image. The CRC is *not* enforced here; see
    /// [`checksum()`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let frame = Frame::split(bytes).ok_or_else(|| ErrorKind::Malformed("bad image framing".to_string()))?;
        if frame.version != IMAGE_VERSION {
            exn::bail!(ErrorKind::Malformed(format!("unsupported image version {}", frame.version)));
        }
        Ok(serde_json::from_slice(frame.payload).map_err(|e| ErrorKind::Malformed(e.to_string()))?)
    }
}

/// Total length of the payload as recorded in the header, if the framing is intact.
pub fn payload_len(bytes: &[u8]) -> Option<usize> {
    Frame::split(bytes).map(|frame| frame.payload.len())
}

/// Verify the CRC of a framed image.
pub fn checksum(bytes: &[u8]) -> ChecksumOutcome {
    match Frame::split(bytes) {
        None => ChecksumOutcome::malformed(),
        Some(frame) => {
            let computed = crc32fast::hash(frame.covered);
            let expected = format!("0x{computed:08X}");
            match computed == frame.stored_crc {
                true => ChecksumOutcome::valid(expected),
                false => ChecksumOutcome::mismatch(expected),
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        VirtualImage::default()
            .with_field(FIELD_PRODUCT, "SONiC-VS")
            .with_field(FIELD_SERIAL, "VS-0001")
            .with_field(FIELD_MAC, "52:54:00:12:34:56")
            .encode()
            .unwrap()
    }

    #[test]
    fn test_encoded_layout() {
        let bytes = sample();
        assert_eq!(&bytes[..8], IMAGE_ID);
        assert_eq!(bytes[8], IMAGE_VERSION);
        let len = u16::from_be_bytes([bytes[9], bytes[10]]) as usize;
        assert_eq!(bytes.len(), HEADER_LEN + len + CRC_LEN);
        assert_eq!(payload_len(&bytes), Some(len));
    }

    #[test]
    fn test_parse_keeps_field_order() {
        let image = VirtualImage::parse(&sample()).unwrap();
        let names: Vec<_> = image.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, [FIELD_PRODUCT, FIELD_SERIAL, FIELD_MAC]);
        assert_eq!(image.field(FIELD_MAC), Some("52:54:00:12:34:56"));
        assert_eq!(image.field("Vendor Name"), None);
    }

    #[test]
    fn test_valid_checksum() {
        let outcome = checksum(&sample());
        assert!(outcome.valid);
        assert!(outcome.expected.unwrap().starts_with("0x"));
    }

    #[test]
    fn test_every_single_bit_flip_is_detected() {
        let bytes = sample();
        for byte in 0..bytes.len() {
            for bit in 0..8 {
                let mut corrupted = bytes.clone();
                corrupted[byte] ^= 1 << bit;
                assert!(!checksum(&corrupted).valid, "flip of bit {bit} in byte {byte} went unnoticed");
            }
        }
    }

    #[test]
    fn test_malformed_input_is_invalid_not_fatal() {
        for bytes in [&b""[..], &b"VEEPROM"[..], &b"TlvInfo\0\x01\x00\x00"[..], &sample()[..20]] {
            let outcome = checksum(bytes);
            assert!(!outcome.valid);
            assert!(outcome.expected.is_none());
            assert!(VirtualImage::parse(bytes).is_err());
        }
    }

    #[test]
    fn test_parse_ignores_crc() {
        let mut bytes = sample();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(!checksum(&bytes).valid);
        assert_eq!(VirtualImage::parse(&bytes).unwrap().field(FIELD_SERIAL), Some("VS-0001"));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut bytes = sample();
        bytes[8] = 2;
        let err = VirtualImage::parse(&bytes).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Malformed(_)));
    }
}
