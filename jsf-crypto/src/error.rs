//! Error types for key handling, signing, and verification.

use crate::algorithm::{Algorithm, UnknownAlgorithm};
use thiserror::Error;

/// Errors raised while turning a JWK into usable key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The `kty` member names a key type this crate does not handle.
    #[error("unsupported key type \"{0}\"")]
    UnsupportedKeyType(String),

    /// The `crv` member names a curve this crate does not handle.
    #[error("unsupported curve \"{0}\"")]
    UnsupportedCurve(String),

    /// A member required for this key type is absent.
    #[error("missing JWK member \"{0}\"")]
    MissingParameter(&'static str),

    /// A member is not valid base64url.
    #[error("JWK member \"{member}\" is not base64url: {source}")]
    InvalidEncoding {
        /// The offending member.
        member: &'static str,

        /// Decoder error.
        #[source]
        source: base64::DecodeError,
    },

    /// The decoded material does not form a valid key.
    #[error("invalid key material: {0}")]
    InvalidKey(signature::Error),

    /// RSA key assembly failed.
    #[error(transparent)]
    Rsa(#[from] rsa::Error),

    /// A signing operation was given a key without its private part.
    #[error("key has no private part")]
    MissingPrivateKey,

    /// The key cannot be used with the requested algorithm.
    #[error("{key_type} key cannot be used with {algorithm}")]
    IncompatibleKey {
        /// Requested algorithm.
        algorithm: Algorithm,

        /// Description of the supplied key.
        key_type: String,
    },
}

/// Errors raised by the [`CryptoEngine`](crate::engine::CryptoEngine).
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The algorithm is supported but outside the configured allow-list.
    #[error("algorithm {0} is not allowed")]
    AlgorithmNotAllowed(Algorithm),

    /// The algorithm name is not known at all.
    #[error(transparent)]
    UnknownAlgorithm(#[from] UnknownAlgorithm),

    /// The key could not be used.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The underlying signer failed.
    #[error("signing error: {0}")]
    Signing(signature::Error),

    /// The signature bytes do not have the shape the algorithm expects.
    #[error("malformed {algorithm} signature: {reason}")]
    MalformedSignature {
        /// Algorithm the signature was checked under.
        algorithm: Algorithm,

        /// What was wrong with it.
        reason: String,
    },

    /// The signature is well formed but does not match.
    #[error("signature does not match")]
    SignatureMismatch,
}
