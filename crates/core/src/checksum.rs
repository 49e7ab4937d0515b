//! Checksum classification of acquired blobs.

use syseeprom_driver::{BoardDriver, ChecksumOutcome, DecodedBlob};

pub const CHECKSUM_VALID: &str = "(checksum valid)";
pub const CHECKSUM_INVALID: &str = "(*** checksum invalid)";

/// Classifies a blob's integrity. Never fails and never blocks output: a
/// mismatch only changes the annotation printed after it.
pub struct ChecksumValidator;

impl ChecksumValidator {
    pub fn validate(driver: &dyn BoardDriver, blob: &DecodedBlob) -> ChecksumOutcome {
        if blob.is_empty() {
            return ChecksumOutcome::malformed();
        }
        let outcome = driver.is_checksum_valid(blob);
        if !outcome.valid {
            tracing::debug!(
                driver = driver.name(),
                provenance = %blob.provenance(),
                expected = outcome.expected.as_deref(),
                "EEPROM checksum mismatch"
            );
        }
        outcome
    }

    pub fn annotation(outcome: &ChecksumOutcome) -> &'static str {
        match outcome.valid {
            true => CHECKSUM_VALID,
            false => CHECKSUM_INVALID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use syseeprom_boards::VirtualImage;
    use syseeprom_boards::image::FIELD_SERIAL;
    use syseeprom_config::BoardConfig;
    use syseeprom_driver::{MockDriver, Provenance};

    #[rstest]
    #[case(true, CHECKSUM_VALID)]
    #[case(false, CHECKSUM_INVALID)]
    fn test_annotation(#[case] valid: bool, #[case] expected: &str) {
        let driver = MockDriver::ready(b"data").with_checksum(valid);
        let blob = DecodedBlob::new(b"data".to_vec(), Provenance::Live);
        let outcome = ChecksumValidator::validate(&driver, &blob);
        assert_eq!(outcome.valid, valid);
        assert_eq!(ChecksumValidator::annotation(&outcome), expected);
    }

    #[test]
    fn test_empty_blob_is_invalid() {
        let driver = MockDriver::ready(b"data");
        let blob = DecodedBlob::new(Vec::new(), Provenance::Live);
        assert_eq!(ChecksumValidator::validate(&driver, &blob), ChecksumOutcome::malformed());
    }

    #[test]
    fn test_any_single_bit_flip_is_invalid() {
        let board = syseeprom_boards::VirtualBoard::new(&BoardConfig::default());
        let bytes = VirtualImage::default().with_field(FIELD_SERIAL, "VS-0001").encode().unwrap();
        let blob = DecodedBlob::new(bytes.clone(), Provenance::Live);
        assert!(ChecksumValidator::validate(&board, &blob).valid);
        for bit in 0..bytes.len() * 8 {
            let mut corrupted = bytes.clone();
            corrupted[bit / 8] ^= 1 << (bit % 8);
            let blob = DecodedBlob::new(corrupted, Provenance::Live);
            assert!(!ChecksumValidator::validate(&board, &blob).valid, "bit {bit} flip went undetected");
        }
    }

    #[test]
    fn test_validation_leaves_blob_untouched() {
        let driver = MockDriver::ready(b"data").with_checksum(false);
        let blob = DecodedBlob::new(b"data".to_vec(), Provenance::Cache);
        let before = blob.clone();
        ChecksumValidator::validate(&driver, &blob);
        assert_eq!(blob, before);
    }
}
