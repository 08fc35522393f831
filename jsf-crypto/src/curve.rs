//! Elliptic curves, named the way JWK `crv` members name them.

use crate::error::KeyError;
use std::{fmt, str::FromStr};

/// Curves a JWK may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Curve {
    /// NIST P-256 (`secp256r1`)
    P256,

    /// NIST P-384 (`secp384r1`)
    P384,

    /// NIST P-521 (`secp521r1`)
    P521,

    /// `secp256k1`
    #[cfg(feature = "es256k")]
    Secp256k1,

    /// The twisted Edwards 25519 curve
    Ed25519,
}

impl Curve {
    /// The JWK `crv` name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
            #[cfg(feature = "es256k")]
            Curve::Secp256k1 => "secp256k1",
            Curve::Ed25519 => "Ed25519",
        }
    }

    /// Length in bytes of one field element (a coordinate or the private scalar).
    #[must_use]
    pub const fn field_len(&self) -> usize {
        match self {
            Curve::P256 | Curve::Ed25519 => 32,
            #[cfg(feature = "es256k")]
            Curve::Secp256k1 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Curve {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P-256" => Ok(Curve::P256),
            "P-384" => Ok(Curve::P384),
            "P-521" => Ok(Curve::P521),
            #[cfg(feature = "es256k")]
            "secp256k1" => Ok(Curve::Secp256k1),
            "Ed25519" => Ok(Curve::Ed25519),
            other => Err(KeyError::UnsupportedCurve(other.to_string())),
        }
    }
}
