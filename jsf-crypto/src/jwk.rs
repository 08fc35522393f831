//! JSON Web Keys.
//!
//! [`Jwk`] is the representation keys travel in: JSF headers embed the
//! signer's public key as a JWK under `publicKey`, and callers hand keys to
//! the engine in the same shape.

use crate::{
    algorithm::Algorithm,
    curve::Curve,
    encoding,
    error::KeyError,
    key::{SigningKey, VerifyingKey},
};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A JSON Web Key (RFC 7517).
///
/// Binary members hold their base64url text unchanged; members this type
/// does not name are kept in [`other`](Jwk::other).
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type: `oct`, `RSA`, `EC` or `OKP`.
    pub kty: String,

    /// Curve name for `EC` and `OKP` keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,

    /// X coordinate (`EC`) or public key (`OKP`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// Y coordinate (`EC`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,

    /// Private scalar or exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    /// RSA modulus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA public exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    /// RSA first prime factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,

    /// RSA second prime factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// RSA first factor CRT exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,

    /// RSA second factor CRT exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,

    /// RSA first CRT coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,

    /// Symmetric key value (`oct`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,

    /// Key identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Intended algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Intended use (`sig` or `enc`).
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    /// Any other members.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Jwk {
    /// Build a key from a symmetric secret.
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        Jwk {
            kty: "oct".to_string(),
            k: Some(encoding::encode(secret)),
            ..Jwk::default()
        }
    }

    /// Generate a fresh private key suitable for `algorithm`.
    ///
    /// # Errors
    ///
    /// See [`SigningKey::generate`].
    pub fn generate(algorithm: Algorithm) -> Result<Self, KeyError> {
        SigningKey::generate(algorithm).map(|key| Jwk::from(&key))
    }

    /// Whether the key carries private (or secret) material.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.d.is_some() || self.k.is_some()
    }

    /// Parse the key for signing.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyError`] if the key is incomplete, malformed, or public only.
    pub fn signing_key(&self) -> Result<SigningKey, KeyError> {
        SigningKey::try_from(self)
    }

    /// Parse the key for verification.
    ///
    /// Private keys are accepted; their public part is used.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyError`] if the key is incomplete or malformed.
    pub fn verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        VerifyingKey::try_from(self)
    }

    /// The public half of this key, holding only `kty`, `crv`, `x`, `y`, `n` and `e`.
    ///
    /// Symmetric keys have no public half and yield `None`.
    #[must_use]
    pub fn to_public(&self) -> Option<Jwk> {
        if self.kty == "oct" {
            return None;
        }

        Some(Jwk {
            kty: self.kty.clone(),
            crv: self.crv.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
            n: self.n.clone(),
            e: self.e.clone(),
            ..Jwk::default()
        })
    }

    /// The declared curve.
    ///
    /// # Errors
    ///
    /// Fails if `crv` is absent or names an unsupported curve.
    pub fn curve(&self) -> Result<Curve, KeyError> {
        self.crv
            .as_deref()
            .ok_or(KeyError::MissingParameter("crv"))?
            .parse()
    }

    pub(crate) fn member(
        &self,
        name: &'static str,
        value: Option<&String>,
    ) -> Result<Vec<u8>, KeyError> {
        let text = value.ok_or(KeyError::MissingParameter(name))?;
        encoding::decode(text).map_err(|source| KeyError::InvalidEncoding {
            member: name,
            source,
        })
    }
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("crv", &self.crv)
            .field("kid", &self.kid)
            .field("private", &self.is_private())
            .finish_non_exhaustive()
    }
}

impl From<&VerifyingKey> for Jwk {
    fn from(key: &VerifyingKey) -> Self {
        match key {
            VerifyingKey::Hmac(secret) => Jwk::from_secret(secret.as_bytes()),
            VerifyingKey::Rsa(key) => Jwk {
                kty: "RSA".to_string(),
                n: Some(encoding::encode(key.n().to_bytes_be())),
                e: Some(encoding::encode(key.e().to_bytes_be())),
                ..Jwk::default()
            },
            VerifyingKey::P256(key) => ec(Curve::P256, key.to_encoded_point(false).as_bytes()),
            VerifyingKey::P384(key) => ec(Curve::P384, key.to_encoded_point(false).as_bytes()),
            VerifyingKey::P521(key) => ec(Curve::P521, key.to_encoded_point(false).as_bytes()),
            #[cfg(feature = "es256k")]
            VerifyingKey::K256(key) => {
                ec(Curve::Secp256k1, key.to_encoded_point(false).as_bytes())
            }
            VerifyingKey::Ed25519(key) => Jwk {
                kty: "OKP".to_string(),
                crv: Some(Curve::Ed25519.as_str().to_string()),
                x: Some(encoding::encode(key.as_bytes())),
                ..Jwk::default()
            },
        }
    }
}

impl From<&SigningKey> for Jwk {
    fn from(key: &SigningKey) -> Self {
        let mut jwk = Jwk::from(&key.verifying_key());
        match key {
            SigningKey::Hmac(_) => {}
            SigningKey::Rsa(key) => {
                jwk.d = Some(encoding::encode(key.d().to_bytes_be()));
                if let [p, q] = key.primes() {
                    jwk.p = Some(encoding::encode(p.to_bytes_be()));
                    jwk.q = Some(encoding::encode(q.to_bytes_be()));
                }
            }
            SigningKey::P256(key) => jwk.d = Some(encoding::encode(key.to_bytes())),
            SigningKey::P384(key) => jwk.d = Some(encoding::encode(key.to_bytes())),
            SigningKey::P521(key) => jwk.d = Some(encoding::encode(key.to_bytes())),
            #[cfg(feature = "es256k")]
            SigningKey::K256(key) => jwk.d = Some(encoding::encode(key.to_bytes())),
            SigningKey::Ed25519(key) => jwk.d = Some(encoding::encode(key.to_bytes())),
        }
        jwk
    }
}

/// `EC` JWK from an uncompressed SEC1 point.
fn ec(curve: Curve, sec1: &[u8]) -> Jwk {
    let coordinates = sec1.get(1..).unwrap_or_default();
    let (x, y) = coordinates.split_at(coordinates.len() / 2);
    Jwk {
        kty: "EC".to_string(),
        crv: Some(curve.as_str().to_string()),
        x: Some(encoding::encode(x)),
        y: Some(encoding::encode(y)),
        ..Jwk::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    // JSF 0.81 sample key
    const P256_PRIVATE: &str = r#"{
        "kty": "EC",
        "crv": "P-256",
        "x": "censDzcMEkgiePz6DXB7cDuwFemshAFR90UNVQFCg8Q",
        "y": "xq8rze6ewG0-eVcSF72J77gKiD0IHnzpwHaU7t6nVeY",
        "d": "nEsftLbi5u9pI8B0-drEjIuJzQgZie3yeqUR3BwWDl4"
    }"#;

    #[test]
    fn parses_and_re_emits_ec_keys() -> TestResult {
        let jwk: Jwk = serde_json::from_str(P256_PRIVATE)?;
        let key = jwk.signing_key()?;
        assert_eq!(Jwk::from(&key), jwk);
        Ok(())
    }

    #[test]
    fn public_half_strips_private_members() -> TestResult {
        let jwk: Jwk = serde_json::from_str(P256_PRIVATE)?;
        let public = jwk.to_public().ok_or("EC key has a public half")?;

        assert!(public.d.is_none());
        assert!(!public.is_private());
        assert_eq!(
            serde_json::to_value(&public)?,
            serde_json::json!({
                "kty": "EC",
                "crv": "P-256",
                "x": "censDzcMEkgiePz6DXB7cDuwFemshAFR90UNVQFCg8Q",
                "y": "xq8rze6ewG0-eVcSF72J77gKiD0IHnzpwHaU7t6nVeY"
            })
        );
        assert_eq!(Jwk::from(&public.verifying_key()?), public);
        Ok(())
    }

    #[test]
    fn symmetric_keys_have_no_public_half() {
        assert_eq!(Jwk::from_secret(b"secret").to_public(), None);
    }

    #[test]
    fn unknown_members_survive_round_trip() -> TestResult {
        let jwk: Jwk = serde_json::from_str(r#"{"kty":"oct","k":"AQID","x5t":"abc"}"#)?;
        assert_eq!(jwk.other.get("x5t"), Some(&Value::from("abc")));
        assert_eq!(
            serde_json::to_value(&jwk)?,
            serde_json::json!({"kty":"oct","k":"AQID","x5t":"abc"})
        );
        Ok(())
    }

    #[test]
    fn debug_redacts_material() -> TestResult {
        let jwk: Jwk = serde_json::from_str(P256_PRIVATE)?;
        let debug = format!("{jwk:?}");
        assert!(!debug.contains("nEsftLbi"));
        assert!(debug.contains("private: true"));
        Ok(())
    }

    #[test]
    fn bad_base64_names_the_member() {
        let jwk = Jwk {
            kty: "oct".into(),
            k: Some("not base64!".into()),
            ..Jwk::default()
        };
        assert!(matches!(
            jwk.signing_key(),
            Err(KeyError::InvalidEncoding { member: "k", .. })
        ));
    }
}
