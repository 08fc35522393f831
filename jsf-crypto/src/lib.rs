//! Algorithm-keyed signing and verification for cleartext JSON signatures.
//!
//! This crate is the cryptographic layer underneath [`jsf`]: it knows how to
//! sign and verify byte buffers under the JWA algorithm names that JSF
//! headers use, how to read and write keys as JWKs, and how to encode
//! signature values as unpadded base64url. It knows nothing about JSON
//! documents or envelopes.
//!
//! [`jsf`]: https://docs.rs/jsf
//!
//! # Example
//!
//! ```rust
//! use jsf_crypto::{Algorithm, AllowedAlgorithms, CryptoEngine, Jwk, encoding};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Only admit the two algorithms this deployment uses
//! let engine = CryptoEngine::new(AllowedAlgorithms::from_names(["ES256", "Ed25519"])?);
//!
//! let key = Jwk::generate(Algorithm::Ed25519)?;
//! let public = key.to_public().ok_or("asymmetric keys have a public half")?;
//!
//! let sig = engine.sign(Algorithm::Ed25519, &key, b"{\"msg\":\"hi\"}")?;
//! let value = encoding::encode(&sig);
//!
//! engine.verify(Algorithm::Ed25519, &public, b"{\"msg\":\"hi\"}", &encoding::decode(value)?)?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod algorithm;
pub mod curve;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod hash;
pub mod jwk;
pub mod key;
mod signer;
mod verify;

pub use algorithm::{allowed::AllowedAlgorithms, Algorithm, Family, UnknownAlgorithm};
pub use engine::CryptoEngine;
pub use error::{CryptoError, KeyError};
pub use jwk::Jwk;
pub use key::{HmacKey, SigningKey, VerifyingKey};
