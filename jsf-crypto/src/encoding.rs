//! Unpadded base64url, as used for signature values and JWK members.

use base64::{
    alphabet,
    engine::{general_purpose::GeneralPurpose, DecodePaddingMode, GeneralPurposeConfig},
    DecodeError, Engine,
};

/// base64url without padding on output; trailing `=` is tolerated on input.
pub const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as unpadded base64url.
#[must_use]
pub fn encode<T: AsRef<[u8]>>(bytes: T) -> String {
    BASE64URL.encode(bytes)
}

/// Decode base64url text.
///
/// # Errors
///
/// Returns a [`DecodeError`] if `text` contains characters outside the
/// base64url alphabet, or if its length is impossible.
pub fn decode<T: AsRef<[u8]>>(text: T) -> Result<Vec<u8>, DecodeError> {
    BASE64URL.decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn encodes_without_padding() {
        assert_eq!(encode([0xfb, 0xff]), "-_8");
    }

    #[test]
    fn accepts_padded_input() -> TestResult {
        assert_eq!(decode("-_8=")?, vec![0xfb, 0xff]);
        assert_eq!(decode("-_8")?, vec![0xfb, 0xff]);
        Ok(())
    }

    #[test]
    fn rejects_standard_alphabet() {
        assert!(decode("+/8").is_err());
    }
}
