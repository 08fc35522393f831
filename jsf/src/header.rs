//! Signature headers.
//!
//! A header is the JSON object holding one signature: its algorithm, key
//! hints, policy fields, any extension fields, and finally the `value`.

use jsf_crypto::{Algorithm, Jwk};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `algorithm` member.
pub const ALGORITHM: &str = "algorithm";
/// `publicKey` member.
pub const PUBLIC_KEY: &str = "publicKey";
/// `keyId` member.
pub const KEY_ID: &str = "keyId";
/// `certificatePath` member.
pub const CERTIFICATE_PATH: &str = "certificatePath";
/// `extensions` member.
pub const EXTENSIONS: &str = "extensions";
/// `excludes` member.
pub const EXCLUDES: &str = "excludes";
/// `value` member, the base64url signature.
pub const VALUE: &str = "value";
/// `signers` member of a multi-signature container.
pub const SIGNERS: &str = "signers";
/// `chain` member of a signature-chain container.
pub const CHAIN: &str = "chain";

/// Typed header handed to the envelope writer.
///
/// The writer signs exactly what this serializes to, with `value` added
/// afterwards.
///
/// ```rust
/// use jsf::Header;
/// use jsf_crypto::Algorithm;
/// use serde_json::json;
///
/// let header = Header::new()
///     .with_algorithm(Algorithm::Es256)
///     .with_key_id("example.com:p256")
///     .with_extension("otherExt", "Cool Stuff");
///
/// assert_eq!(
///     serde_json::to_value(&header).unwrap(),
///     json!({
///         "algorithm": "ES256",
///         "keyId": "example.com:p256",
///         "extensions": ["otherExt"],
///         "otherExt": "Cool Stuff"
///     })
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Signature algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,

    /// The signer's public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Jwk>,

    /// Application-defined key identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// Base64-encoded DER certificates, signer first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_path: Option<Vec<String>>,

    /// Names of the extension members this header declares.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,

    /// Top-level payload members left out of the signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excludes: Option<Vec<String>>,

    /// Extension members and anything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Header {
    /// An empty header.
    #[must_use]
    pub fn new() -> Self {
        Header::default()
    }

    /// Set `algorithm`.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Set `publicKey`; private members are stripped.
    ///
    /// Symmetric keys have no public half and leave the header unchanged.
    #[must_use]
    pub fn with_public_key(mut self, key: &Jwk) -> Self {
        if let Some(public) = key.to_public() {
            self.public_key = Some(public);
        }
        self
    }

    /// Set `keyId`.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Set `certificatePath`.
    #[must_use]
    pub fn with_certificate_path<I, S>(mut self, certificates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.certificate_path = Some(certificates.into_iter().map(Into::into).collect());
        self
    }

    /// Declare an extension and set its member.
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let declared = self.extensions.get_or_insert_with(Vec::new);
        if !declared.contains(&name) {
            declared.push(name.clone());
        }
        self.extra.insert(name, value.into());
        self
    }

    /// Exclude top-level payload members from the signature.
    #[must_use]
    pub fn with_excludes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes
            .get_or_insert_with(Vec::new)
            .extend(names.into_iter().map(Into::into));
        self
    }
}
