//! Error types for writing and verifying cleartext signatures.

use crate::{envelope::Topology, verifier::Diagnostic};
use jsf_crypto::{Algorithm, CryptoError, UnknownAlgorithm};
use thiserror::Error;

/// Top-level error for every [`Jsf`](crate::Jsf) operation.
#[derive(Debug, Error)]
pub enum JsfError {
    /// The document or signature property has the wrong shape.
    #[error(transparent)]
    Malformed(#[from] MalformedEnvelope),

    /// A declared header extension is not admitted by the registry.
    #[error(transparent)]
    Extension(#[from] ExtensionPolicyViolation),

    /// The requested algorithm disagrees with the header.
    #[error(transparent)]
    AlgorithmMismatch(#[from] AlgorithmMismatch),

    /// No signature satisfied the topology's pass rule.
    #[error(transparent)]
    Verification(#[from] VerificationFailure),

    /// The engine was used out of order.
    #[error(transparent)]
    Misuse(#[from] OperationMisuse),

    /// Signing failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Coarse classification of a [`JsfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`MalformedEnvelope`].
    MalformedEnvelope,

    /// See [`ExtensionPolicyViolation`].
    ExtensionPolicyViolation,

    /// See [`AlgorithmMismatch`].
    AlgorithmMismatch,

    /// See [`VerificationFailure`].
    SignatureVerificationFailure,

    /// See [`OperationMisuse`].
    OperationMisuse,

    /// See [`CryptoError`].
    Crypto,
}

impl JsfError {
    /// The error's classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            JsfError::Malformed(_) => ErrorKind::MalformedEnvelope,
            JsfError::Extension(_) => ErrorKind::ExtensionPolicyViolation,
            JsfError::AlgorithmMismatch(_) => ErrorKind::AlgorithmMismatch,
            JsfError::Verification(_) => ErrorKind::SignatureVerificationFailure,
            JsfError::Misuse(_) => ErrorKind::OperationMisuse,
            JsfError::Crypto(_) => ErrorKind::Crypto,
        }
    }
}

/// Structural problems with the payload or its signature property.
#[derive(Debug, Error)]
pub enum MalformedEnvelope {
    /// No payload has been set.
    #[error("missing payload")]
    MissingPayload,

    /// The payload has no value under the signature property.
    #[error("no signatures available under \"{0}\"")]
    MissingProperty(String),

    /// A value that must be a JSON object is something else.
    #[error("\"{0}\" is not a JSON object")]
    NotAnObject(String),

    /// A value that must be an array is something else.
    #[error("\"{0}\" is not an array")]
    NotAnArray(&'static str),

    /// A value that must be an array of strings is something else.
    #[error("\"{0}\" is not an array of strings")]
    NotAStringList(&'static str),

    /// The property carries both `signers` and `chain`.
    #[error("\"{0}\" has both \"signers\" and \"chain\"")]
    AmbiguousTopology(String),

    /// A `signers` or `chain` entry declares `excludes`, which only a
    /// single signature header may carry.
    #[error("\"excludes\" is not supported in a {0} signature entry")]
    EntryExcludes(Topology),

    /// Neither the caller nor the header names an algorithm.
    #[error("no \"algorithm\" in headers")]
    MissingAlgorithm,

    /// The header names an algorithm this build does not support.
    #[error(transparent)]
    UnknownAlgorithm(#[from] UnknownAlgorithm),

    /// JSON could not be parsed, converted, or canonicalized.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A declared extension the registry does not admit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionPolicyViolation {
    /// The registry does not know the extension.
    #[error("Unknown extension: \"{0}\"")]
    Unknown(String),

    /// The registry knows the extension but has it disabled.
    #[error("Unsupported extension: \"{0}\"")]
    Unsupported(String),
}

/// The caller's algorithm conflicts with the one in the header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("\"algorithm\" mismatch, requested \"{requested}\", found \"{found}\"")]
pub struct AlgorithmMismatch {
    /// Algorithm passed by the caller.
    pub requested: Algorithm,

    /// Algorithm name found in the header.
    pub found: String,
}

/// Operations attempted in the wrong state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OperationMisuse {
    /// There is no payload to read.
    #[error("Payload not available")]
    PayloadNotAvailable,

    /// The payload differs from the one that was verified.
    #[error("Payload not verified")]
    PayloadNotVerified,
}

/// Verification failed; carries one diagnostic per failed attempt.
#[derive(Debug, Error)]
#[error("{topology} verification failed for all signatures: {}", render(.diagnostics))]
pub struct VerificationFailure {
    /// Topology of the signature property.
    pub topology: Topology,

    /// Failed attempts in evaluation order. Empty for an empty chain.
    pub diagnostics: Vec<Diagnostic>,
}

fn render(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "[no signatures]".to_string();
    }
    let parts: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}
