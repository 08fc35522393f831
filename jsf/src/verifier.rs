//! Envelope verifier.
//!
//! Verification replays the signing-input construction for each candidate
//! signature and then applies the topology's pass rule to the collected
//! results: one attempt for a single signature, any-of for `signers`,
//! all-of (and non-empty) for `chain`.

use crate::{
    canonical,
    engine::Jsf,
    envelope::{string_list, Envelope, Topology},
    error::{AlgorithmMismatch, JsfError, MalformedEnvelope, VerificationFailure},
    header::{ALGORITHM, EXCLUDES, EXTENSIONS, PUBLIC_KEY, VALUE},
    scope::{self, Scope},
};
use jsf_crypto::{encoding, Algorithm, CryptoError, Jwk, UnknownAlgorithm};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Why one signature failed to verify.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The entry is not a JSON object.
    #[error("signature entry is not an object")]
    NotAnObject,

    /// Neither the caller nor the entry names an algorithm.
    #[error("no \"algorithm\" in headers")]
    MissingAlgorithm,

    /// The entry's `algorithm` is not a string.
    #[error("\"algorithm\" is not a string")]
    InvalidAlgorithm,

    /// The entry names an algorithm this build does not support.
    #[error(transparent)]
    UnknownAlgorithm(#[from] UnknownAlgorithm),

    /// The caller's algorithm disagrees with the entry.
    #[error(transparent)]
    AlgorithmMismatch(#[from] AlgorithmMismatch),

    /// The entry has no `value`.
    #[error("no \"value\" in signature")]
    MissingValue,

    /// `value` is not a base64url string.
    #[error("\"value\" is not base64url")]
    InvalidValue,

    /// No key was supplied and the entry has no `publicKey`.
    #[error("no verification key")]
    MissingKey,

    /// `publicKey` is not a JWK.
    #[error("\"publicKey\" is not a JWK: {0}")]
    InvalidPublicKey(serde_json::Error),

    /// The signing input could not be built.
    #[error("canonicalization failed: {0}")]
    Canonicalization(serde_json::Error),

    /// The key was unusable or the signature did not match.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// One failed attempt.
#[derive(Debug)]
pub struct Diagnostic {
    /// Topology of the property being verified.
    pub topology: Topology,

    /// Position of the entry in `signers` or `chain`; `0` for a single signature.
    pub index: usize,

    /// What went wrong.
    pub error: AttemptError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed: [{} #{}: {}]", self.topology, self.index, self.error)
    }
}

/// A successful verification.
///
/// Proof that the payload, as it was when verified, carries valid
/// signatures under [`prop`](Verification::prop). Pass it to
/// [`Jsf::payload`] to read the document.
///
/// The proof is bound to the canonical digest of the whole document, so it
/// unlocks any [`Jsf`] holding the same JSON, and none once a member changes.
#[derive(Debug)]
pub struct Verification {
    prop: String,
    topology: Topology,
    verified: Vec<usize>,
    diagnostics: Vec<Diagnostic>,
    pub(crate) digest: [u8; 32],
}

impl Verification {
    /// The signature property that was verified.
    #[must_use]
    pub fn prop(&self) -> &str {
        &self.prop
    }

    /// Topology of the verified property.
    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Indices of the entries that verified.
    #[must_use]
    pub fn verified(&self) -> &[usize] {
        &self.verified
    }

    /// Entries that failed even though the whole passed; only possible for `signers`.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl Jsf {
    /// Verify the signatures stored under `prop`.
    ///
    /// `key` overrides any `publicKey` embedded in the headers; without it
    /// each header's own `publicKey` is used. `algorithm`, if given, must
    /// agree with every header that names one.
    ///
    /// # Errors
    ///
    /// Structural problems ([`MalformedEnvelope`]) and rejected extensions
    /// fail immediately. Otherwise, if the topology's pass rule is not met,
    /// returns [`JsfError::Verification`] with one diagnostic per failed
    /// attempt.
    #[tracing::instrument(skip_all, fields(prop = %prop, topology = tracing::field::Empty))]
    pub fn verify(
        &self,
        prop: &str,
        key: Option<&Jwk>,
        algorithm: Option<Algorithm>,
    ) -> Result<Verification, JsfError> {
        let payload = self.require_payload()?;
        let container = payload
            .get(prop)
            .ok_or_else(|| MalformedEnvelope::MissingProperty(prop.to_string()))?
            .as_object()
            .ok_or_else(|| MalformedEnvelope::NotAnObject(prop.to_string()))?;

        self.registry
            .check_extensions(&string_list(container, EXTENSIONS)?)?;
        let excludes = string_list(container, EXCLUDES)?;

        let envelope = Envelope::parse(prop, container)?;
        let topology = envelope.topology();
        tracing::Span::current().record("topology", topology.as_str());

        let attempt = Attempt {
            jsf: self,
            payload,
            prop,
            key,
            algorithm,
            excludes: &excludes,
        };
        let results: Vec<Result<(), AttemptError>> = match envelope {
            Envelope::Single(header) => vec![attempt.check(header, Scope::Single { header })],
            Envelope::Multi { container, signers } => signers
                .iter()
                .map(|signer| attempt.run(signer, |signer| Scope::Multi { container, signer }))
                .collect(),
            Envelope::Chain { container, chain } => chain
                .iter()
                .enumerate()
                .map(|(i, link)| {
                    attempt.run(link, |link| Scope::Chain {
                        container,
                        prior: &chain[..i],
                        link,
                    })
                })
                .collect(),
        };

        let mut verified = Vec::new();
        let mut diagnostics = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(()) => verified.push(index),
                Err(error) => {
                    tracing::debug!(index, %error, "signature did not verify");
                    diagnostics.push(Diagnostic {
                        topology,
                        index,
                        error,
                    });
                }
            }
        }

        let valid = match topology {
            Topology::Single | Topology::Multi => !verified.is_empty(),
            Topology::Chain => diagnostics.is_empty() && !verified.is_empty(),
        };
        if !valid {
            tracing::warn!(failed = diagnostics.len(), "verification failed");
            return Err(VerificationFailure {
                topology,
                diagnostics,
            }
            .into());
        }

        tracing::debug!(verified = verified.len(), "verification succeeded");
        Ok(Verification {
            prop: prop.to_string(),
            topology,
            verified,
            diagnostics,
            digest: canonical::digest(payload).map_err(MalformedEnvelope::from)?,
        })
    }
}

/// Inputs shared by every attempt in one `verify` call.
struct Attempt<'a> {
    jsf: &'a Jsf,
    payload: &'a Map<String, Value>,
    prop: &'a str,
    key: Option<&'a Jwk>,
    algorithm: Option<Algorithm>,
    excludes: &'a [String],
}

impl Attempt<'_> {
    fn run<'e>(
        &self,
        entry: &'e Value,
        scope: impl FnOnce(&'e Map<String, Value>) -> Scope<'e>,
    ) -> Result<(), AttemptError> {
        let entry = entry.as_object().ok_or(AttemptError::NotAnObject)?;
        self.check(entry, scope(entry))
    }

    fn check(&self, entry: &Map<String, Value>, scope: Scope<'_>) -> Result<(), AttemptError> {
        let algorithm = resolve_algorithm(self.algorithm, entry)?;

        let signature = match entry.get(VALUE) {
            None => return Err(AttemptError::MissingValue),
            Some(Value::String(text)) => {
                encoding::decode(text).map_err(|_| AttemptError::InvalidValue)?
            }
            Some(_) => return Err(AttemptError::InvalidValue),
        };

        let embedded;
        let key = match self.key {
            Some(key) => key,
            None => {
                let public_key = entry.get(PUBLIC_KEY).ok_or(AttemptError::MissingKey)?;
                embedded = serde_json::from_value::<Jwk>(public_key.clone())
                    .map_err(AttemptError::InvalidPublicKey)?;
                &embedded
            }
        };

        let input = scope::signing_input(self.payload, self.prop, &scope, self.excludes)
            .map_err(AttemptError::Canonicalization)?;
        self.jsf.crypto.verify(algorithm, key, &input, &signature)?;
        Ok(())
    }
}

fn resolve_algorithm(
    requested: Option<Algorithm>,
    entry: &Map<String, Value>,
) -> Result<Algorithm, AttemptError> {
    let found = match entry.get(ALGORITHM) {
        None => None,
        Some(Value::String(name)) => Some(name.as_str()),
        Some(_) => return Err(AttemptError::InvalidAlgorithm),
    };

    match (requested, found) {
        (None, None) => Err(AttemptError::MissingAlgorithm),
        (None, Some(name)) => Ok(name.parse()?),
        (Some(requested), None) => Ok(requested),
        (Some(requested), Some(name)) => match name.parse::<Algorithm>() {
            Ok(found) if found == requested => Ok(requested),
            _ => Err(AlgorithmMismatch {
                requested,
                found: name.to_string(),
            }
            .into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{ErrorKind, ExtensionPolicyViolation, OperationMisuse},
        header::Header,
        registry::HeaderRegistry,
    };
    use assert_matches::assert_matches;
    use serde_json::json;
    use testresult::TestResult;

    fn secret(tag: u8) -> Jwk {
        Jwk::from_secret(&[tag; 32])
    }

    fn signed_once() -> Result<Jsf, JsfError> {
        let mut jsf = Jsf::from_value(json!({"msg": "hi"}))?;
        let header = Header::new().with_algorithm(Algorithm::Hs256);
        jsf.add_single_signature("sig", &secret(1), None, Some(&header))?;
        Ok(jsf)
    }

    #[test_log::test]
    fn single_round_trip() -> TestResult {
        let jsf = signed_once()?;
        let verification = jsf.verify("sig", Some(&secret(1)), None)?;
        assert_eq!(verification.prop(), "sig");
        assert_eq!(verification.topology(), Topology::Single);
        assert_eq!(verification.verified(), &[0]);
        assert_eq!(jsf.payload(&verification)?["msg"], json!("hi"));
        Ok(())
    }

    #[test_log::test]
    fn wrong_key_yields_one_diagnostic() -> TestResult {
        let jsf = signed_once()?;
        let Err(JsfError::Verification(failure)) = jsf.verify("sig", Some(&secret(2)), None)
        else {
            return Err("expected verification failure".into());
        };
        assert_eq!(failure.topology, Topology::Single);
        assert_eq!(failure.diagnostics.len(), 1);
        assert_matches!(
            failure.diagnostics[0].error,
            AttemptError::Crypto(CryptoError::SignatureMismatch)
        );
        Ok(())
    }

    #[test_log::test]
    fn missing_property_is_fatal() -> TestResult {
        let jsf = signed_once()?;
        assert_matches!(
            jsf.verify("other", None, None),
            Err(JsfError::Malformed(MalformedEnvelope::MissingProperty(prop))) if prop == "other"
        );
        Ok(())
    }

    #[test_log::test]
    fn no_key_anywhere() -> TestResult {
        let jsf = signed_once()?;
        let Err(JsfError::Verification(failure)) = jsf.verify("sig", None, None) else {
            return Err("expected verification failure".into());
        };
        assert_matches!(failure.diagnostics[0].error, AttemptError::MissingKey);
        Ok(())
    }

    #[test_log::test]
    fn explicit_algorithm_must_match_header() -> TestResult {
        let jsf = signed_once()?;
        let Err(JsfError::Verification(failure)) =
            jsf.verify("sig", Some(&secret(1)), Some(Algorithm::Hs512))
        else {
            return Err("expected verification failure".into());
        };
        assert_eq!(
            failure.diagnostics[0].error.to_string(),
            r#""algorithm" mismatch, requested "HS512", found "HS256""#
        );
        Ok(())
    }

    #[test_log::test]
    fn header_without_algorithm_needs_explicit_one() -> TestResult {
        let mut jsf = Jsf::from_value(json!({"msg": "hi"}))?;
        jsf.add_single_signature("sig", &secret(1), Some(Algorithm::Hs384), None)?;

        assert!(jsf.verify("sig", Some(&secret(1)), None).is_err());
        jsf.verify("sig", Some(&secret(1)), Some(Algorithm::Hs384))?;
        Ok(())
    }

    #[test_log::test]
    fn extensions_are_checked_before_crypto() -> TestResult {
        let mut jsf = Jsf::from_value(json!({"msg": "hi"}))?
            .with_registry(HeaderRegistry::new().enable("otherExt"));
        let header = Header::new()
            .with_algorithm(Algorithm::Hs256)
            .with_extension("otherExt", "x");
        jsf.add_single_signature("sig", &secret(1), None, Some(&header))?;
        jsf.verify("sig", Some(&secret(1)), None)?;

        // Same document, registry without the extension; the wrong key is never tried
        let strict = jsf.clone().with_registry(HeaderRegistry::new().disable("otherExt"));
        let err = strict.verify("sig", Some(&secret(9)), None).err().ok_or("must fail")?;
        assert_eq!(err.kind(), ErrorKind::ExtensionPolicyViolation);
        assert_matches!(
            err,
            JsfError::Extension(ExtensionPolicyViolation::Unsupported(name)) if name == "otherExt"
        );
        Ok(())
    }

    #[test_log::test]
    fn payload_read_requires_matching_verification() -> TestResult {
        let mut jsf = signed_once()?;
        let verification = jsf.verify("sig", Some(&secret(1)), None)?;

        jsf.set_payload(Map::new());
        assert_eq!(
            jsf.payload(&verification),
            Err(OperationMisuse::PayloadNotVerified)
        );
        assert_eq!(
            Jsf::default().payload(&verification),
            Err(OperationMisuse::PayloadNotAvailable)
        );
        Ok(())
    }

    #[test_log::test]
    fn verification_is_repeatable() -> TestResult {
        let jsf = signed_once()?;
        assert!(jsf.verify("sig", Some(&secret(2)), None).is_err());
        // A failed call leaves nothing behind for the next one
        let verification = jsf.verify("sig", Some(&secret(1)), None)?;
        assert!(verification.diagnostics().is_empty());
        Ok(())
    }

    #[test_log::test]
    fn resolve_algorithm_cases() -> TestResult {
        let header = |value: Value| match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        assert_eq!(
            resolve_algorithm(None, &header(json!({"algorithm": "EdDSA"})))?,
            Algorithm::Ed25519
        );
        assert_eq!(
            resolve_algorithm(Some(Algorithm::Ed25519), &header(json!({"algorithm": "EdDSA"})))?,
            Algorithm::Ed25519
        );
        assert_matches!(
            resolve_algorithm(None, &header(json!({"algorithm": "XS1"}))),
            Err(AttemptError::UnknownAlgorithm(_))
        );
        assert_matches!(
            resolve_algorithm(None, &header(json!({"algorithm": 256}))),
            Err(AttemptError::InvalidAlgorithm)
        );
        assert_matches!(
            resolve_algorithm(None, &header(json!({}))),
            Err(AttemptError::MissingAlgorithm)
        );
        Ok(())
    }
}
