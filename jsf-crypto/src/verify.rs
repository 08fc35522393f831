//! Signature verification.

use crate::{
    algorithm::{Algorithm, Family},
    error::CryptoError,
    hash::HashAlgorithm,
    key::{HmacKey, VerifyingKey},
    signer::{incompatible, keyed_mac},
};
use hmac::{digest::KeyInit, Hmac, Mac};
use rsa::{pkcs1v15, pss, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};
use signature::Verifier;

impl VerifyingKey {
    /// Check `signature` over `msg` under `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::SignatureMismatch`] if the signature does not
    /// match, [`CryptoError::MalformedSignature`] if its bytes cannot be a
    /// signature for the algorithm, or a key error if the key cannot serve it.
    #[tracing::instrument(skip_all, fields(%algorithm))]
    pub fn verify(
        &self,
        algorithm: Algorithm,
        msg: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        match (algorithm.family(), self) {
            (Family::Hmac, VerifyingKey::Hmac(secret)) => {
                verify_mac(algorithm.hash(), secret, msg, signature)
            }
            (Family::RsaPkcs1, VerifyingKey::Rsa(key)) => {
                verify_pkcs1v15(algorithm, key, msg, signature)
            }
            (Family::RsaPss, VerifyingKey::Rsa(key)) => verify_pss(algorithm, key, msg, signature),
            (Family::EcDsa, key) => verify_ecdsa(algorithm, key, msg, signature),
            (Family::EdDsa, VerifyingKey::Ed25519(key)) => {
                let sig = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|_| malformed(algorithm, signature.len()))?;
                key.verify(msg, &sig)
                    .map_err(|_| CryptoError::SignatureMismatch)
            }
            (_, key) => Err(incompatible(algorithm, key.describe())),
        }
    }
}

fn verify_ecdsa(
    algorithm: Algorithm,
    key: &VerifyingKey,
    msg: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let result = match (algorithm, key) {
        (Algorithm::Es256, VerifyingKey::P256(key)) => {
            let sig = p256::ecdsa::Signature::from_slice(signature)
                .map_err(|_| malformed(algorithm, signature.len()))?;
            key.verify(msg, &sig)
        }
        (Algorithm::Es384, VerifyingKey::P384(key)) => {
            let sig = p384::ecdsa::Signature::from_slice(signature)
                .map_err(|_| malformed(algorithm, signature.len()))?;
            key.verify(msg, &sig)
        }
        (Algorithm::Es512, VerifyingKey::P521(key)) => {
            let sig = p521::ecdsa::Signature::from_slice(signature)
                .map_err(|_| malformed(algorithm, signature.len()))?;
            key.verify(msg, &sig)
        }
        #[cfg(feature = "es256k")]
        (Algorithm::Es256k, VerifyingKey::K256(key)) => {
            let sig = k256::ecdsa::Signature::from_slice(signature)
                .map_err(|_| malformed(algorithm, signature.len()))?;
            key.verify(msg, &sig)
        }
        (algorithm, key) => return Err(incompatible(algorithm, key.describe())),
    };
    result.map_err(|_| CryptoError::SignatureMismatch)
}

fn verify_pkcs1v15(
    algorithm: Algorithm,
    key: &RsaPublicKey,
    msg: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let sig = pkcs1v15::Signature::try_from(signature)
        .map_err(|_| malformed(algorithm, signature.len()))?;
    let key = key.clone();
    let result = match algorithm.hash() {
        HashAlgorithm::Sha2_256 => pkcs1v15::VerifyingKey::<Sha256>::new(key).verify(msg, &sig),
        HashAlgorithm::Sha2_384 => pkcs1v15::VerifyingKey::<Sha384>::new(key).verify(msg, &sig),
        HashAlgorithm::Sha2_512 => pkcs1v15::VerifyingKey::<Sha512>::new(key).verify(msg, &sig),
    };
    result.map_err(|_| CryptoError::SignatureMismatch)
}

fn verify_pss(
    algorithm: Algorithm,
    key: &RsaPublicKey,
    msg: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let sig =
        pss::Signature::try_from(signature).map_err(|_| malformed(algorithm, signature.len()))?;
    let key = key.clone();
    let result = match algorithm.hash() {
        HashAlgorithm::Sha2_256 => pss::VerifyingKey::<Sha256>::new(key).verify(msg, &sig),
        HashAlgorithm::Sha2_384 => pss::VerifyingKey::<Sha384>::new(key).verify(msg, &sig),
        HashAlgorithm::Sha2_512 => pss::VerifyingKey::<Sha512>::new(key).verify(msg, &sig),
    };
    result.map_err(|_| CryptoError::SignatureMismatch)
}

fn verify_mac(
    hash: HashAlgorithm,
    secret: &HmacKey,
    msg: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    fn check<M: Mac + KeyInit>(secret: &[u8], msg: &[u8], tag: &[u8]) -> Result<(), CryptoError> {
        keyed_mac::<M>(secret, msg)?
            .verify_slice(tag)
            .map_err(|_| CryptoError::SignatureMismatch)
    }

    match hash {
        HashAlgorithm::Sha2_256 => check::<Hmac<Sha256>>(secret.as_bytes(), msg, signature),
        HashAlgorithm::Sha2_384 => check::<Hmac<Sha384>>(secret.as_bytes(), msg, signature),
        HashAlgorithm::Sha2_512 => check::<Hmac<Sha512>>(secret.as_bytes(), msg, signature),
    }
}

fn malformed(algorithm: Algorithm, len: usize) -> CryptoError {
    CryptoError::MalformedSignature {
        algorithm,
        reason: format!("unexpected length {len}"),
    }
}
