//! Envelope writer: adds signatures to the payload in place.
//!
//! Every operation computes the signature before touching the payload, so
//! a failed call leaves the document exactly as it was.

use crate::{
    engine::Jsf,
    envelope::{string_list, Topology},
    error::{AlgorithmMismatch, JsfError, MalformedEnvelope},
    header::{Header, CHAIN, EXCLUDES, EXTENSIONS, SIGNERS, VALUE},
    registry::HeaderRegistry,
    scope::{self, Scope},
};
use jsf_crypto::{encoding, Algorithm, CryptoEngine, Jwk};
use serde_json::{Map, Value};

impl Jsf {
    /// Sign the payload once, replacing whatever is stored under `prop`.
    ///
    /// The algorithm comes from `algorithm` or from the header; if both are
    /// given they must agree. Payload members named in the header's
    /// `excludes` are left out of the signature.
    ///
    /// # Errors
    ///
    /// Fails without modifying the payload if there is no payload, the
    /// algorithm cannot be resolved, a declared extension is not admitted,
    /// or signing fails.
    #[tracing::instrument(skip_all, fields(prop = %prop, topology = "single"))]
    pub fn add_single_signature(
        &mut self,
        prop: &str,
        key: &Jwk,
        algorithm: Option<Algorithm>,
        header: Option<&Header>,
    ) -> Result<(), JsfError> {
        let Jsf {
            payload,
            crypto,
            registry,
        } = self;
        let payload = payload.as_mut().ok_or(MalformedEnvelope::MissingPayload)?;
        let (mut fields, algorithm) = prepare(registry, Topology::Single, algorithm, header)?;
        let excludes = string_list(&fields, EXCLUDES)?;

        let value = sign(
            crypto,
            payload,
            prop,
            &Scope::Single { header: &fields },
            &excludes,
            algorithm,
            key,
        )?;
        fields.insert(VALUE.to_string(), value);
        payload.insert(prop.to_string(), Value::Object(fields));
        Ok(())
    }

    /// Add an independent signature to the `signers` list under `prop`.
    ///
    /// Anything else stored under `prop` (a single signature, a chain, or
    /// container fields) is discarded. The new signature covers the payload
    /// and its own header only, never its siblings.
    ///
    /// # Errors
    ///
    /// As [`add_single_signature`](Self::add_single_signature), and also if
    /// an existing `signers` is not an array or the header
    /// has `excludes`.
    #[tracing::instrument(skip_all, fields(prop = %prop, topology = "multi"))]
    pub fn add_signature(
        &mut self,
        prop: &str,
        key: &Jwk,
        algorithm: Option<Algorithm>,
        header: Option<&Header>,
    ) -> Result<(), JsfError> {
        let Jsf {
            payload,
            crypto,
            registry,
        } = self;
        let payload = payload.as_mut().ok_or(MalformedEnvelope::MissingPayload)?;
        let mut signers = retained(payload.get(prop), SIGNERS)?;
        let (mut fields, algorithm) = prepare(registry, Topology::Multi, algorithm, header)?;

        let container = Map::new();
        let value = sign(
            crypto,
            payload,
            prop,
            &Scope::Multi {
                container: &container,
                signer: &fields,
            },
            &[],
            algorithm,
            key,
        )?;
        fields.insert(VALUE.to_string(), value);
        signers.push(Value::Object(fields));
        payload.insert(prop.to_string(), wrap(SIGNERS, signers));
        Ok(())
    }

    /// Append a link to the `chain` under `prop`.
    ///
    /// Anything else stored under `prop` is discarded. The new link signs
    /// the payload together with every earlier link, `value` included.
    ///
    /// # Errors
    ///
    /// As [`add_single_signature`](Self::add_single_signature), and also if
    /// an existing `chain` is not an array or the header
    /// has `excludes`.
    #[tracing::instrument(skip_all, fields(prop = %prop, topology = "chain"))]
    pub fn add_chain_signature(
        &mut self,
        prop: &str,
        key: &Jwk,
        algorithm: Option<Algorithm>,
        header: Option<&Header>,
    ) -> Result<(), JsfError> {
        let Jsf {
            payload,
            crypto,
            registry,
        } = self;
        let payload = payload.as_mut().ok_or(MalformedEnvelope::MissingPayload)?;
        let mut chain = retained(payload.get(prop), CHAIN)?;
        let (mut fields, algorithm) = prepare(registry, Topology::Chain, algorithm, header)?;

        let container = Map::new();
        let value = sign(
            crypto,
            payload,
            prop,
            &Scope::Chain {
                container: &container,
                prior: &chain,
                link: &fields,
            },
            &[],
            algorithm,
            key,
        )?;
        fields.insert(VALUE.to_string(), value);
        chain.push(Value::Object(fields));
        payload.insert(prop.to_string(), wrap(CHAIN, chain));
        Ok(())
    }
}

/// Turn the caller's header into the JSON that gets signed, and settle the algorithm.
///
/// Only a single signature may carry `excludes`: for `signers` and `chain`
/// the verifier reads exclusions from the container, never from an entry.
fn prepare(
    registry: &HeaderRegistry,
    topology: Topology,
    requested: Option<Algorithm>,
    header: Option<&Header>,
) -> Result<(Map<String, Value>, Algorithm), JsfError> {
    let mut fields = match header {
        None => Map::new(),
        Some(header) => match serde_json::to_value(header).map_err(MalformedEnvelope::from)? {
            Value::Object(fields) => fields,
            _ => return Err(MalformedEnvelope::NotAnObject("header".to_string()).into()),
        },
    };
    fields.remove(VALUE);
    if topology != Topology::Single && fields.contains_key(EXCLUDES) {
        return Err(MalformedEnvelope::EntryExcludes(topology).into());
    }

    registry.check_extensions(&string_list(&fields, EXTENSIONS)?)?;

    let algorithm = match (requested, header.and_then(|header| header.algorithm)) {
        (Some(requested), Some(found)) if requested != found => {
            return Err(AlgorithmMismatch {
                requested,
                found: found.to_string(),
            }
            .into())
        }
        (Some(algorithm), _) | (None, Some(algorithm)) => algorithm,
        (None, None) => return Err(MalformedEnvelope::MissingAlgorithm.into()),
    };
    Ok((fields, algorithm))
}

fn sign(
    crypto: &CryptoEngine,
    payload: &Map<String, Value>,
    prop: &str,
    scope: &Scope<'_>,
    excludes: &[String],
    algorithm: Algorithm,
    key: &Jwk,
) -> Result<Value, JsfError> {
    let input =
        scope::signing_input(payload, prop, scope, excludes).map_err(MalformedEnvelope::from)?;
    let signature = crypto.sign(algorithm, key, &input)?;
    tracing::debug!(%algorithm, input_len = input.len(), "signature computed");
    Ok(Value::String(encoding::encode(signature)))
}

/// The existing `signers` or `chain` entries under the property, if any.
fn retained(existing: Option<&Value>, field: &'static str) -> Result<Vec<Value>, MalformedEnvelope> {
    match existing.and_then(Value::as_object).and_then(|container| container.get(field)) {
        None => Ok(Vec::new()),
        Some(Value::Array(entries)) => Ok(entries.clone()),
        Some(_) => Err(MalformedEnvelope::NotAnArray(field)),
    }
}

fn wrap(field: &str, entries: Vec<Value>) -> Value {
    let mut container = Map::new();
    container.insert(field.to_string(), Value::Array(entries));
    Value::Object(container)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::error::{ErrorKind, ExtensionPolicyViolation};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use testresult::TestResult;

    fn secret() -> Jwk {
        Jwk::from_secret(b"a shared secret of sufficient length")
    }

    fn doc() -> Result<Jsf, MalformedEnvelope> {
        Jsf::from_value(json!({"msg": "hi", "n": 1}))
    }

    #[test_log::test]
    fn single_signature_overwrites_property() -> TestResult {
        let mut jsf = doc()?;
        jsf.add_single_signature("sig", &secret(), Some(Algorithm::Hs256), None)?;
        jsf.add_single_signature("sig", &secret(), Some(Algorithm::Hs384), None)?;

        let payload = jsf.into_payload().ok_or("payload")?;
        let sig = payload.get("sig").and_then(Value::as_object).ok_or("sig")?;
        // The explicit algorithm is not written into the header
        assert_eq!(sig.keys().collect::<Vec<_>>(), vec!["value"]);
        Ok(())
    }

    #[test_log::test]
    fn header_algorithm_is_used_and_kept() -> TestResult {
        let mut jsf = doc()?;
        let header = Header::new().with_algorithm(Algorithm::Hs512).with_key_id("k1");
        jsf.add_single_signature("sig", &secret(), None, Some(&header))?;

        let payload = jsf.into_payload().ok_or("payload")?;
        assert_eq!(payload["sig"]["algorithm"], json!("HS512"));
        assert_eq!(payload["sig"]["keyId"], json!("k1"));
        Ok(())
    }

    #[test_log::test]
    fn add_signature_replaces_other_topologies() -> TestResult {
        let mut jsf = doc()?;
        jsf.add_chain_signature("sig", &secret(), Some(Algorithm::Hs256), None)?;
        jsf.add_signature("sig", &secret(), Some(Algorithm::Hs256), None)?;
        jsf.add_signature("sig", &secret(), Some(Algorithm::Hs384), None)?;

        let payload = jsf.into_payload().ok_or("payload")?;
        let sig = payload["sig"].as_object().ok_or("sig")?;
        assert_eq!(sig.keys().collect::<Vec<_>>(), vec!["signers"]);
        assert_eq!(sig["signers"].as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[test_log::test]
    fn chain_links_accumulate() -> TestResult {
        let mut jsf = doc()?;
        jsf.add_signature("sig", &secret(), Some(Algorithm::Hs256), None)?;
        for _ in 0..3 {
            jsf.add_chain_signature("sig", &secret(), Some(Algorithm::Hs256), None)?;
        }

        let payload = jsf.into_payload().ok_or("payload")?;
        assert_eq!(payload["sig"]["chain"].as_array().map(Vec::len), Some(3));
        assert_eq!(payload["sig"].get("signers"), None);
        Ok(())
    }

    #[test_log::test]
    fn missing_payload() {
        let err = Jsf::default()
            .add_signature("sig", &secret(), Some(Algorithm::Hs256), None)
            .err();
        assert_matches!(
            err,
            Some(JsfError::Malformed(MalformedEnvelope::MissingPayload))
        );
    }

    #[test_log::test]
    fn algorithm_must_resolve() -> TestResult {
        let mut jsf = doc()?;
        let err = jsf.add_single_signature("sig", &secret(), None, None).err();
        assert_matches!(
            err,
            Some(JsfError::Malformed(MalformedEnvelope::MissingAlgorithm))
        );

        let header = Header::new().with_algorithm(Algorithm::Hs256);
        let err = jsf
            .add_single_signature("sig", &secret(), Some(Algorithm::Hs384), Some(&header))
            .err()
            .ok_or("mismatch must fail")?;
        assert_eq!(err.kind(), ErrorKind::AlgorithmMismatch);
        Ok(())
    }

    #[test_log::test]
    fn rejected_extension_leaves_payload_untouched() -> TestResult {
        let mut jsf = doc()?;
        jsf.add_signature("sig", &secret(), Some(Algorithm::Hs256), None)?;
        let before = jsf.clone().into_payload();

        let header = Header::new().with_extension("otherExt", "x");
        let err = jsf.add_signature("sig", &secret(), Some(Algorithm::Hs256), Some(&header));
        assert_matches!(
            err,
            Err(JsfError::Extension(ExtensionPolicyViolation::Unknown(name))) if name == "otherExt"
        );
        assert_eq!(jsf.into_payload(), before);
        Ok(())
    }

    #[test_log::test]
    fn disallowed_algorithm_leaves_payload_untouched() -> TestResult {
        let mut jsf = doc()?.with_allowed_algorithms(jsf_crypto::AllowedAlgorithms::none());
        let err = jsf
            .add_single_signature("sig", &secret(), Some(Algorithm::Hs256), None)
            .err()
            .ok_or("signing must fail")?;
        assert_eq!(err.kind(), ErrorKind::Crypto);
        assert_eq!(
            jsf.into_payload().map(Value::Object),
            Some(json!({"msg": "hi", "n": 1}))
        );
        Ok(())
    }

    #[test_log::test]
    fn existing_signers_must_be_an_array() -> TestResult {
        let mut jsf = Jsf::from_value(json!({"sig": {"signers": "nope"}}))?;
        let err = jsf.add_signature("sig", &secret(), Some(Algorithm::Hs256), None);
        assert_matches!(
            err,
            Err(JsfError::Malformed(MalformedEnvelope::NotAnArray("signers")))
        );
        Ok(())
    }

    #[test_log::test]
    fn excludes_are_refused_in_signers_and_chain() -> TestResult {
        let header = Header::new()
            .with_algorithm(Algorithm::Hs256)
            .with_excludes(["n"]);
        let mut jsf = doc()?;
        let before = jsf.clone().into_payload();

        let err = jsf.add_signature("sig", &secret(), None, Some(&header));
        assert_matches!(
            err,
            Err(JsfError::Malformed(MalformedEnvelope::EntryExcludes(Topology::Multi)))
        );
        let err = jsf.add_chain_signature("sig", &secret(), None, Some(&header));
        assert_matches!(
            err,
            Err(JsfError::Malformed(MalformedEnvelope::EntryExcludes(Topology::Chain)))
        );
        assert_eq!(jsf.clone().into_payload(), before);

        // A single signature honours its own excludes
        jsf.add_single_signature("sig", &secret(), None, Some(&header))?;
        let mut payload = jsf.into_payload().ok_or("payload")?;
        payload.insert("n".to_string(), json!(2));
        Jsf::new(payload).verify("sig", Some(&secret()), None)?;
        Ok(())
    }
}
