//! Key material, one variant per backend.
//!
//! [`SigningKey`] and [`VerifyingKey`] abstract over the RustCrypto key types.
//! They are usually obtained from a [`Jwk`], but every backend key converts
//! into them directly with [`From`].

use crate::{
    algorithm::{Algorithm, Family},
    curve::Curve,
    error::KeyError,
    jwk::Jwk,
};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use std::fmt;

// ============================================================================
// Shared secrets
// ============================================================================

/// An HMAC shared secret.
#[derive(Clone, PartialEq, Eq)]
pub struct HmacKey(Vec<u8>);

impl HmacKey {
    /// Wrap raw secret bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        HmacKey(bytes)
    }

    /// The raw secret.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for HmacKey {
    fn from(bytes: &[u8]) -> Self {
        HmacKey(bytes.to_vec())
    }
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HmacKey({} bytes)", self.0.len())
    }
}

// ============================================================================
// Signing keys
// ============================================================================

/// A key able to produce signatures (or MAC tags).
#[derive(Clone)]
pub enum SigningKey {
    /// HMAC secret for `HS*`.
    Hmac(HmacKey),

    /// RSA private key for `RS*` and `PS*`.
    Rsa(Box<RsaPrivateKey>),

    /// P-256 key for `ES256`.
    P256(p256::ecdsa::SigningKey),

    /// P-384 key for `ES384`.
    P384(p384::ecdsa::SigningKey),

    /// P-521 key for `ES512`.
    P521(p521::ecdsa::SigningKey),

    /// secp256k1 key for `ES256K`.
    #[cfg(feature = "es256k")]
    K256(k256::ecdsa::SigningKey),

    /// Ed25519 key.
    Ed25519(ed25519_dalek::SigningKey),
}

impl SigningKey {
    /// Generate a fresh key suitable for `algorithm`.
    ///
    /// RSA keys are 2048 bits; HMAC secrets are as long as the digest.
    ///
    /// # Errors
    ///
    /// Fails only if RSA key generation fails.
    pub fn generate(algorithm: Algorithm) -> Result<Self, KeyError> {
        use rand::RngCore;
        let mut rng = rand::thread_rng();

        Ok(match algorithm {
            Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => {
                let mut secret = vec![0u8; algorithm.hash().output_len()];
                rng.fill_bytes(&mut secret);
                SigningKey::Hmac(HmacKey(secret))
            }
            Algorithm::Rs256
            | Algorithm::Rs384
            | Algorithm::Rs512
            | Algorithm::Ps256
            | Algorithm::Ps384
            | Algorithm::Ps512 => SigningKey::Rsa(Box::new(RsaPrivateKey::new(&mut rng, 2048)?)),
            Algorithm::Es256 => SigningKey::P256(p256::ecdsa::SigningKey::random(&mut rng)),
            Algorithm::Es384 => SigningKey::P384(p384::ecdsa::SigningKey::random(&mut rng)),
            Algorithm::Es512 => SigningKey::P521(p521::ecdsa::SigningKey::random(&mut rng)),
            #[cfg(feature = "es256k")]
            Algorithm::Es256k => SigningKey::K256(k256::ecdsa::SigningKey::random(&mut rng)),
            Algorithm::Ed25519 => {
                SigningKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut rng))
            }
        })
    }

    /// The matching verifying key.
    ///
    /// For HMAC this is the same secret.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        match self {
            SigningKey::Hmac(secret) => VerifyingKey::Hmac(secret.clone()),
            SigningKey::Rsa(key) => VerifyingKey::Rsa(key.to_public_key()),
            SigningKey::P256(key) => VerifyingKey::P256(p256::ecdsa::VerifyingKey::from(key)),
            SigningKey::P384(key) => VerifyingKey::P384(p384::ecdsa::VerifyingKey::from(key)),
            SigningKey::P521(key) => VerifyingKey::P521(p521::ecdsa::VerifyingKey::from(key)),
            #[cfg(feature = "es256k")]
            SigningKey::K256(key) => VerifyingKey::K256(k256::ecdsa::VerifyingKey::from(key)),
            SigningKey::Ed25519(key) => VerifyingKey::Ed25519(key.verifying_key()),
        }
    }

    /// Short description used in error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            SigningKey::Hmac(_) => "oct",
            SigningKey::Rsa(_) => "RSA",
            SigningKey::P256(_) => "EC P-256",
            SigningKey::P384(_) => "EC P-384",
            SigningKey::P521(_) => "EC P-521",
            #[cfg(feature = "es256k")]
            SigningKey::K256(_) => "EC secp256k1",
            SigningKey::Ed25519(_) => "OKP Ed25519",
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey({})", self.describe())
    }
}

impl From<RsaPrivateKey> for SigningKey {
    fn from(key: RsaPrivateKey) -> Self {
        SigningKey::Rsa(Box::new(key))
    }
}

impl From<p256::ecdsa::SigningKey> for SigningKey {
    fn from(key: p256::ecdsa::SigningKey) -> Self {
        SigningKey::P256(key)
    }
}

impl From<p384::ecdsa::SigningKey> for SigningKey {
    fn from(key: p384::ecdsa::SigningKey) -> Self {
        SigningKey::P384(key)
    }
}

impl From<p521::ecdsa::SigningKey> for SigningKey {
    fn from(key: p521::ecdsa::SigningKey) -> Self {
        SigningKey::P521(key)
    }
}

#[cfg(feature = "es256k")]
impl From<k256::ecdsa::SigningKey> for SigningKey {
    fn from(key: k256::ecdsa::SigningKey) -> Self {
        SigningKey::K256(key)
    }
}

impl From<ed25519_dalek::SigningKey> for SigningKey {
    fn from(key: ed25519_dalek::SigningKey) -> Self {
        SigningKey::Ed25519(key)
    }
}

impl From<HmacKey> for SigningKey {
    fn from(key: HmacKey) -> Self {
        SigningKey::Hmac(key)
    }
}

impl TryFrom<&Jwk> for SigningKey {
    type Error = KeyError;

    fn try_from(jwk: &Jwk) -> Result<Self, Self::Error> {
        match jwk.kty.as_str() {
            "oct" => Ok(SigningKey::Hmac(HmacKey(jwk.member("k", jwk.k.as_ref())?))),
            "RSA" => {
                let d = jwk.member("d", jwk.d.as_ref()).map_err(private_part)?;
                let key = RsaPrivateKey::from_components(
                    rsa_uint(jwk, "n", jwk.n.as_ref())?,
                    rsa_uint(jwk, "e", jwk.e.as_ref())?,
                    BigUint::from_bytes_be(&d),
                    vec![
                        rsa_uint(jwk, "p", jwk.p.as_ref())?,
                        rsa_uint(jwk, "q", jwk.q.as_ref())?,
                    ],
                )?;
                Ok(SigningKey::Rsa(Box::new(key)))
            }
            "EC" => {
                let d = jwk.member("d", jwk.d.as_ref()).map_err(private_part)?;
                let key = match jwk.curve()? {
                    Curve::P256 => p256::ecdsa::SigningKey::from_slice(&d).map(SigningKey::P256),
                    Curve::P384 => p384::ecdsa::SigningKey::from_slice(&d).map(SigningKey::P384),
                    Curve::P521 => p521::ecdsa::SigningKey::from_slice(&d).map(SigningKey::P521),
                    #[cfg(feature = "es256k")]
                    Curve::Secp256k1 => {
                        k256::ecdsa::SigningKey::from_slice(&d).map(SigningKey::K256)
                    }
                    Curve::Ed25519 => return Err(KeyError::UnsupportedCurve("Ed25519".into())),
                };
                key.map_err(KeyError::InvalidKey)
            }
            "OKP" => {
                if jwk.curve()? != Curve::Ed25519 {
                    return Err(KeyError::UnsupportedCurve(jwk.crv.clone().unwrap_or_default()));
                }
                let d = jwk.member("d", jwk.d.as_ref()).map_err(private_part)?;
                let seed = <[u8; 32]>::try_from(d.as_slice())
                    .map_err(|_| KeyError::InvalidKey(signature::Error::new()))?;
                Ok(SigningKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(&seed)))
            }
            other => Err(KeyError::UnsupportedKeyType(other.to_string())),
        }
    }
}

// ============================================================================
// Verifying keys
// ============================================================================

/// A key able to check signatures (or MAC tags).
#[derive(Clone)]
pub enum VerifyingKey {
    /// HMAC secret for `HS*`.
    Hmac(HmacKey),

    /// RSA public key for `RS*` and `PS*`.
    Rsa(RsaPublicKey),

    /// P-256 key for `ES256`.
    P256(p256::ecdsa::VerifyingKey),

    /// P-384 key for `ES384`.
    P384(p384::ecdsa::VerifyingKey),

    /// P-521 key for `ES512`.
    P521(p521::ecdsa::VerifyingKey),

    /// secp256k1 key for `ES256K`.
    #[cfg(feature = "es256k")]
    K256(k256::ecdsa::VerifyingKey),

    /// Ed25519 key.
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl VerifyingKey {
    /// Short description used in error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            VerifyingKey::Hmac(_) => "oct",
            VerifyingKey::Rsa(_) => "RSA",
            VerifyingKey::P256(_) => "EC P-256",
            VerifyingKey::P384(_) => "EC P-384",
            VerifyingKey::P521(_) => "EC P-521",
            #[cfg(feature = "es256k")]
            VerifyingKey::K256(_) => "EC secp256k1",
            VerifyingKey::Ed25519(_) => "OKP Ed25519",
        }
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyingKey({})", self.describe())
    }
}

impl From<RsaPublicKey> for VerifyingKey {
    fn from(key: RsaPublicKey) -> Self {
        VerifyingKey::Rsa(key)
    }
}

impl From<p256::ecdsa::VerifyingKey> for VerifyingKey {
    fn from(key: p256::ecdsa::VerifyingKey) -> Self {
        VerifyingKey::P256(key)
    }
}

impl From<p384::ecdsa::VerifyingKey> for VerifyingKey {
    fn from(key: p384::ecdsa::VerifyingKey) -> Self {
        VerifyingKey::P384(key)
    }
}

impl From<p521::ecdsa::VerifyingKey> for VerifyingKey {
    fn from(key: p521::ecdsa::VerifyingKey) -> Self {
        VerifyingKey::P521(key)
    }
}

#[cfg(feature = "es256k")]
impl From<k256::ecdsa::VerifyingKey> for VerifyingKey {
    fn from(key: k256::ecdsa::VerifyingKey) -> Self {
        VerifyingKey::K256(key)
    }
}

impl From<ed25519_dalek::VerifyingKey> for VerifyingKey {
    fn from(key: ed25519_dalek::VerifyingKey) -> Self {
        VerifyingKey::Ed25519(key)
    }
}

impl TryFrom<&Jwk> for VerifyingKey {
    type Error = KeyError;

    fn try_from(jwk: &Jwk) -> Result<Self, Self::Error> {
        match jwk.kty.as_str() {
            "oct" => Ok(VerifyingKey::Hmac(HmacKey(jwk.member("k", jwk.k.as_ref())?))),
            "RSA" => Ok(VerifyingKey::Rsa(RsaPublicKey::new(
                rsa_uint(jwk, "n", jwk.n.as_ref())?,
                rsa_uint(jwk, "e", jwk.e.as_ref())?,
            )?)),
            "EC" => {
                let curve = jwk.curve()?;
                let point = sec1_point(jwk, curve)?;
                let key = match curve {
                    Curve::P256 => {
                        p256::ecdsa::VerifyingKey::from_sec1_bytes(&point).map(VerifyingKey::P256)
                    }
                    Curve::P384 => {
                        p384::ecdsa::VerifyingKey::from_sec1_bytes(&point).map(VerifyingKey::P384)
                    }
                    Curve::P521 => {
                        p521::ecdsa::VerifyingKey::from_sec1_bytes(&point).map(VerifyingKey::P521)
                    }
                    #[cfg(feature = "es256k")]
                    Curve::Secp256k1 => {
                        k256::ecdsa::VerifyingKey::from_sec1_bytes(&point).map(VerifyingKey::K256)
                    }
                    Curve::Ed25519 => return Err(KeyError::UnsupportedCurve("Ed25519".into())),
                };
                key.map_err(KeyError::InvalidKey)
            }
            "OKP" => {
                if jwk.curve()? != Curve::Ed25519 {
                    return Err(KeyError::UnsupportedCurve(jwk.crv.clone().unwrap_or_default()));
                }
                let x = jwk.member("x", jwk.x.as_ref())?;
                let bytes = <[u8; 32]>::try_from(x.as_slice())
                    .map_err(|_| KeyError::InvalidKey(signature::Error::new()))?;
                ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                    .map(VerifyingKey::Ed25519)
                    .map_err(KeyError::InvalidKey)
            }
            other => Err(KeyError::UnsupportedKeyType(other.to_string())),
        }
    }
}

/// Whether a key of `kty` can serve `algorithm` at all.
pub(crate) fn kty_matches(kty: &str, algorithm: Algorithm) -> bool {
    matches!(
        (algorithm.family(), kty),
        (Family::Hmac, "oct")
            | (Family::RsaPkcs1 | Family::RsaPss, "RSA")
            | (Family::EcDsa, "EC")
            | (Family::EdDsa, "OKP")
    )
}

fn private_part(err: KeyError) -> KeyError {
    match err {
        KeyError::MissingParameter(_) => KeyError::MissingPrivateKey,
        other => other,
    }
}

fn rsa_uint(jwk: &Jwk, name: &'static str, value: Option<&String>) -> Result<BigUint, KeyError> {
    jwk.member(name, value)
        .map(|bytes| BigUint::from_bytes_be(&bytes))
}

/// Uncompressed SEC1 encoding `0x04 || x || y`, left-padding short coordinates.
fn sec1_point(jwk: &Jwk, curve: Curve) -> Result<Vec<u8>, KeyError> {
    let len = curve.field_len();
    let mut point = Vec::with_capacity(1 + 2 * len);
    point.push(0x04);
    for (name, value) in [("x", jwk.x.as_ref()), ("y", jwk.y.as_ref())] {
        let coordinate = jwk.member(name, value)?;
        if coordinate.len() > len {
            return Err(KeyError::InvalidKey(signature::Error::new()));
        }
        point.resize(point.len() + len - coordinate.len(), 0);
        point.extend_from_slice(&coordinate);
    }
    Ok(point)
}
