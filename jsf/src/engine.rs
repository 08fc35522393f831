//! The JSF engine: a payload plus the policy it is signed and verified under.

use crate::{
    canonical,
    config::JsfConfig,
    error::{JsfError, MalformedEnvelope, OperationMisuse},
    registry::HeaderRegistry,
    verifier::Verification,
};
use jsf_crypto::{AllowedAlgorithms, CryptoEngine, UnknownAlgorithm};
use serde_json::{Map, Value};

/// A JSON document together with its signing policy.
///
/// Writer methods add signatures to the document in place; [`verify`] checks
/// them and hands back a [`Verification`], which is what unlocks
/// [`payload`]. The caller owns the document and takes it back with
/// [`into_payload`].
///
/// [`verify`]: Jsf::verify
/// [`payload`]: Jsf::payload
/// [`into_payload`]: Jsf::into_payload
#[derive(Debug, Clone, Default)]
pub struct Jsf {
    pub(crate) payload: Option<Map<String, Value>>,
    pub(crate) crypto: CryptoEngine,
    pub(crate) registry: HeaderRegistry,
}

impl Jsf {
    /// An engine over `payload` with the default policy: every supported
    /// algorithm and no extensions.
    #[must_use]
    pub fn new(payload: Map<String, Value>) -> Self {
        Jsf {
            payload: Some(payload),
            ..Jsf::default()
        }
    }

    /// An engine over a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedEnvelope::NotAnObject`] for any other JSON value.
    pub fn from_value(payload: Value) -> Result<Self, MalformedEnvelope> {
        match payload {
            Value::Object(map) => Ok(Jsf::new(map)),
            _ => Err(MalformedEnvelope::NotAnObject("payload".to_string())),
        }
    }

    /// An engine over JSON text.
    ///
    /// # Errors
    ///
    /// Fails if `json` does not parse or is not an object.
    pub fn from_json(json: &str) -> Result<Self, MalformedEnvelope> {
        Jsf::from_value(serde_json::from_str(json)?)
    }

    /// Apply a configuration file's allow-list and registry.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownAlgorithm`] if the configuration names one.
    pub fn with_config(self, config: &JsfConfig) -> Result<Self, UnknownAlgorithm> {
        Ok(self
            .with_allowed_algorithms(config.allowed_algorithms()?)
            .with_registry(config.registry()))
    }

    /// Restrict the algorithms used to sign and verify.
    #[must_use]
    pub fn with_allowed_algorithms(mut self, allowed: AllowedAlgorithms) -> Self {
        self.crypto = CryptoEngine::new(allowed);
        self
    }

    /// Replace the extension registry.
    #[must_use]
    pub fn with_registry(mut self, registry: HeaderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the payload.
    pub fn set_payload(&mut self, payload: Map<String, Value>) {
        self.payload = Some(payload);
    }

    /// The admitted algorithms.
    #[must_use]
    pub fn allowed_algorithms(&self) -> &AllowedAlgorithms {
        self.crypto.allowed()
    }

    /// The extension registry.
    #[must_use]
    pub fn registry(&self) -> &HeaderRegistry {
        &self.registry
    }

    /// Read the payload that `verification` vouches for.
    ///
    /// # Errors
    ///
    /// Returns [`OperationMisuse::PayloadNotAvailable`] if there is no
    /// payload, and [`OperationMisuse::PayloadNotVerified`] if the payload
    /// is not the one `verification` was issued for (for instance because
    /// it changed since).
    pub fn payload(&self, verification: &Verification) -> Result<&Map<String, Value>, OperationMisuse> {
        let payload = self
            .payload
            .as_ref()
            .ok_or(OperationMisuse::PayloadNotAvailable)?;
        match canonical::digest(payload) {
            Ok(digest) if digest == verification.digest => Ok(payload),
            _ => Err(OperationMisuse::PayloadNotVerified),
        }
    }

    /// Give the document back to its owner, verified or not.
    #[must_use]
    pub fn into_payload(self) -> Option<Map<String, Value>> {
        self.payload
    }

    pub(crate) fn require_payload(&self) -> Result<&Map<String, Value>, JsfError> {
        Ok(self
            .payload
            .as_ref()
            .ok_or(MalformedEnvelope::MissingPayload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsf_crypto::Algorithm;
    use serde_json::json;
    use testresult::TestResult;

    #[test]
    fn from_value_requires_an_object() {
        assert!(matches!(
            Jsf::from_value(json!([1, 2])),
            Err(MalformedEnvelope::NotAnObject(_))
        ));
    }

    #[test]
    fn config_is_applied() -> TestResult {
        let config: JsfConfig = serde_json::from_value(json!({
            "allowedAlgorithms": ["HS256"],
            "extensions": {"otherExt": true}
        }))?;
        let jsf = Jsf::from_json(r#"{"a":1}"#)?.with_config(&config)?;

        assert!(jsf.allowed_algorithms().contains(Algorithm::Hs256));
        assert!(!jsf.allowed_algorithms().contains(Algorithm::Es256));
        assert_eq!(jsf.registry().get("otherExt"), Some(true));
        Ok(())
    }

    #[test]
    fn into_payload_returns_the_document() -> TestResult {
        let jsf = Jsf::from_json(r#"{"a":1}"#)?;
        assert_eq!(jsf.into_payload().map(Value::Object), Some(json!({"a": 1})));
        assert_eq!(Jsf::default().into_payload(), None);
        Ok(())
    }

    #[cfg(feature = "es256k")]
    #[test]
    fn es256k_follows_the_feature_flag() -> TestResult {
        assert_eq!("ES256K".parse::<Algorithm>()?, Algorithm::Es256k);
        Ok(())
    }

    #[cfg(not(feature = "es256k"))]
    #[test]
    fn es256k_follows_the_feature_flag() {
        assert!("ES256K".parse::<Algorithm>().is_err());
    }
}
