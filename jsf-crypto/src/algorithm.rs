//! Signature algorithm identifiers.
//!
//! This module provides [`Algorithm`], an enum over every signature algorithm
//! the engine can dispatch to, named the way JSF headers name them
//! (the JWA identifiers, plus `Ed25519` for `EdDSA` over Curve25519).

pub mod allowed;

use crate::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Unified signature algorithm identifier.
///
/// The `es256k` variant is only available when the matching feature flag is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Algorithm {
    /// HMAC with SHA-256
    #[serde(rename = "HS256")]
    Hs256,

    /// HMAC with SHA-384
    #[serde(rename = "HS384")]
    Hs384,

    /// HMAC with SHA-512
    #[serde(rename = "HS512")]
    Hs512,

    /// RSASSA-PKCS1-v1_5 with SHA-256
    #[serde(rename = "RS256")]
    Rs256,

    /// RSASSA-PKCS1-v1_5 with SHA-384
    #[serde(rename = "RS384")]
    Rs384,

    /// RSASSA-PKCS1-v1_5 with SHA-512
    #[serde(rename = "RS512")]
    Rs512,

    /// RSASSA-PSS with SHA-256 and MGF1
    #[serde(rename = "PS256")]
    Ps256,

    /// RSASSA-PSS with SHA-384 and MGF1
    #[serde(rename = "PS384")]
    Ps384,

    /// RSASSA-PSS with SHA-512 and MGF1
    #[serde(rename = "PS512")]
    Ps512,

    /// ES256 (P-256 curve with SHA-256)
    #[serde(rename = "ES256")]
    Es256,

    /// ES384 (P-384 curve with SHA-384)
    #[serde(rename = "ES384")]
    Es384,

    /// ES512 (P-521 curve with SHA-512)
    #[serde(rename = "ES512")]
    Es512,

    /// ES256K (secp256k1 curve with SHA-256)
    #[cfg(feature = "es256k")]
    #[serde(rename = "ES256K")]
    Es256k,

    /// Ed25519 (`EdDSA` over edwards25519)
    #[serde(rename = "Ed25519", alias = "EdDSA")]
    Ed25519,
}

/// The broad family an [`Algorithm`] belongs to.
///
/// The family decides which kind of key an algorithm accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Shared-secret MAC (`oct` keys).
    Hmac,

    /// RSASSA-PKCS1-v1_5 (`RSA` keys).
    RsaPkcs1,

    /// RSASSA-PSS (`RSA` keys).
    RsaPss,

    /// ECDSA (`EC` keys).
    EcDsa,

    /// `EdDSA` (`OKP` keys).
    EdDsa,
}

impl Algorithm {
    /// Every algorithm compiled into this build, in a stable order.
    pub const ALL: &'static [Algorithm] = &[
        Algorithm::Hs256,
        Algorithm::Hs384,
        Algorithm::Hs512,
        Algorithm::Rs256,
        Algorithm::Rs384,
        Algorithm::Rs512,
        Algorithm::Ps256,
        Algorithm::Ps384,
        Algorithm::Ps512,
        Algorithm::Es256,
        Algorithm::Es384,
        Algorithm::Es512,
        #[cfg(feature = "es256k")]
        Algorithm::Es256k,
        Algorithm::Ed25519,
    ];

    /// The name used in the `algorithm` header field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Hs256 => "HS256",
            Algorithm::Hs384 => "HS384",
            Algorithm::Hs512 => "HS512",
            Algorithm::Rs256 => "RS256",
            Algorithm::Rs384 => "RS384",
            Algorithm::Rs512 => "RS512",
            Algorithm::Ps256 => "PS256",
            Algorithm::Ps384 => "PS384",
            Algorithm::Ps512 => "PS512",
            Algorithm::Es256 => "ES256",
            Algorithm::Es384 => "ES384",
            Algorithm::Es512 => "ES512",
            #[cfg(feature = "es256k")]
            Algorithm::Es256k => "ES256K",
            Algorithm::Ed25519 => "Ed25519",
        }
    }

    /// The algorithm family, which determines the accepted key type.
    #[must_use]
    pub const fn family(&self) -> Family {
        match self {
            Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => Family::Hmac,
            Algorithm::Rs256 | Algorithm::Rs384 | Algorithm::Rs512 => Family::RsaPkcs1,
            Algorithm::Ps256 | Algorithm::Ps384 | Algorithm::Ps512 => Family::RsaPss,
            Algorithm::Es256 | Algorithm::Es384 | Algorithm::Es512 => Family::EcDsa,
            #[cfg(feature = "es256k")]
            Algorithm::Es256k => Family::EcDsa,
            Algorithm::Ed25519 => Family::EdDsa,
        }
    }

    /// The message digest used by the algorithm.
    ///
    /// `Ed25519` hashes internally with SHA-512.
    #[must_use]
    pub const fn hash(&self) -> HashAlgorithm {
        match self {
            Algorithm::Hs256 | Algorithm::Rs256 | Algorithm::Ps256 | Algorithm::Es256 => {
                HashAlgorithm::Sha2_256
            }
            #[cfg(feature = "es256k")]
            Algorithm::Es256k => HashAlgorithm::Sha2_256,
            Algorithm::Hs384 | Algorithm::Rs384 | Algorithm::Ps384 | Algorithm::Es384 => {
                HashAlgorithm::Sha2_384
            }
            Algorithm::Hs512
            | Algorithm::Rs512
            | Algorithm::Ps512
            | Algorithm::Es512
            | Algorithm::Ed25519 => HashAlgorithm::Sha2_512,
        }
    }

    /// Whether the algorithm uses a shared secret rather than a key pair.
    #[must_use]
    pub const fn is_symmetric(&self) -> bool {
        matches!(self.family(), Family::Hmac)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An algorithm name that this build does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported algorithm \"{0}\"")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HS256" => Ok(Algorithm::Hs256),
            "HS384" => Ok(Algorithm::Hs384),
            "HS512" => Ok(Algorithm::Hs512),
            "RS256" => Ok(Algorithm::Rs256),
            "RS384" => Ok(Algorithm::Rs384),
            "RS512" => Ok(Algorithm::Rs512),
            "PS256" => Ok(Algorithm::Ps256),
            "PS384" => Ok(Algorithm::Ps384),
            "PS512" => Ok(Algorithm::Ps512),
            "ES256" => Ok(Algorithm::Es256),
            "ES384" => Ok(Algorithm::Es384),
            "ES512" => Ok(Algorithm::Es512),
            #[cfg(feature = "es256k")]
            "ES256K" => Ok(Algorithm::Es256k),
            "Ed25519" | "EdDSA" => Ok(Algorithm::Ed25519),
            other => Err(UnknownAlgorithm(other.to_string())),
        }
    }
}
