//! Cleartext JSON signatures.
//!
//! An implementation of the [JSON Signature Format] (JSF 0.81): signatures
//! live inside the JSON object they sign, under an application-chosen
//! property, and are computed over the canonical (RFC 8785) form of that
//! object. Three topologies are supported:
//!
//! - a *single* signature, whose header is stored directly under the property;
//! - independent *multi* signatures under `signers`, valid if any verifies;
//! - a *chain* of signatures under `chain`, where each link also signs every
//!   link before it, valid only if all verify.
//!
//! [JSON Signature Format]: https://cyberphone.github.io/doc/security/jsf.html
//!
//! # Example
//!
//! ```rust
//! use jsf::{Header, Jsf};
//! use jsf_crypto::{Algorithm, Jwk};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = Jwk::generate(Algorithm::Es256)?;
//!
//! let mut jsf = Jsf::from_value(json!({ "msg": "hi" }))?;
//! let header = Header::new()
//!     .with_algorithm(Algorithm::Es256)
//!     .with_public_key(&key);
//! jsf.add_single_signature("signature", &key, None, Some(&header))?;
//!
//! // Verify with the embedded public key
//! let verification = jsf.verify("signature", None, None)?;
//! assert_eq!(jsf.payload(&verification)?["msg"], json!("hi"));
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod canonical;
pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod header;
pub mod registry;
pub mod scope;
pub mod verifier;

mod writer;

pub use config::JsfConfig;
pub use engine::Jsf;
pub use envelope::Topology;
pub use error::{
    AlgorithmMismatch, ErrorKind, ExtensionPolicyViolation, JsfError, MalformedEnvelope,
    OperationMisuse, VerificationFailure,
};
pub use header::Header;
pub use registry::HeaderRegistry;
pub use verifier::{AttemptError, Diagnostic, Verification};
