//! Canonical JSON (RFC 8785, JCS).
//!
//! Signing input is always the canonical form: members sorted by UTF-16
//! code units, ECMAScript number formatting, no insignificant whitespace.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Canonicalize any serializable value.
///
/// # Errors
///
/// Fails if `value` cannot be represented as JSON (for example a non-finite float).
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_jcs::to_vec(value)
}

/// SHA-256 of the canonical form.
///
/// Two values have the same digest exactly when they are the same JSON,
/// regardless of member order or number spelling.
///
/// # Errors
///
/// As [`canonicalize`].
pub fn digest<T: Serialize + ?Sized>(value: &T) -> Result<[u8; 32], serde_json::Error> {
    Ok(Sha256::digest(canonicalize(value)?).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use testresult::TestResult;

    #[test]
    fn sorts_members_and_strips_whitespace() -> TestResult {
        let value = json!({ "b": [1, 2], "a": { "d": true, "c": null } });
        assert_eq!(
            String::from_utf8(canonicalize(&value)?)?,
            r#"{"a":{"c":null,"d":true},"b":[1,2]}"#
        );
        Ok(())
    }

    #[test]
    fn numbers_use_shortest_form() -> TestResult {
        let value = json!({ "n": 1.0, "m": 1e21, "k": 2_200_063 });
        assert_eq!(
            String::from_utf8(canonicalize(&value)?)?,
            r#"{"k":2200063,"m":1e+21,"n":1}"#
        );
        Ok(())
    }

    #[test]
    fn digest_ignores_member_order() -> TestResult {
        let a: serde_json::Value = serde_json::from_str(r#"{"x":1,"y":"z"}"#)?;
        let b: serde_json::Value = serde_json::from_str(r#"{ "y" : "z", "x" : 1 }"#)?;
        assert_eq!(digest(&a)?, digest(&b)?);
        assert_ne!(digest(&a)?, digest(&json!({"x": 2, "y": "z"}))?);
        Ok(())
    }
}
