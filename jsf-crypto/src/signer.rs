//! Signature production.

use crate::{
    algorithm::{Algorithm, Family},
    error::{CryptoError, KeyError},
    hash::HashAlgorithm,
    key::{HmacKey, SigningKey},
};
use hmac::{digest::KeyInit, Hmac, Mac};
use rsa::{pkcs1v15, pss, RsaPrivateKey};
use sha2::{Sha256, Sha384, Sha512};
use signature::{RandomizedSigner, SignatureEncoding, Signer};

impl SigningKey {
    /// Sign `msg` under `algorithm`, returning the raw signature bytes.
    ///
    /// ECDSA signatures are the fixed-width `r || s` concatenation.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::IncompatibleKey`] if the key cannot serve the
    /// algorithm, or [`CryptoError::Signing`] if the backend fails.
    #[tracing::instrument(skip_all, fields(%algorithm))]
    pub fn try_sign(&self, algorithm: Algorithm, msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match (algorithm.family(), self) {
            (Family::Hmac, SigningKey::Hmac(secret)) => mac(algorithm.hash(), secret, msg),
            (Family::RsaPkcs1, SigningKey::Rsa(key)) => sign_pkcs1v15(algorithm.hash(), key, msg),
            (Family::RsaPss, SigningKey::Rsa(key)) => sign_pss(algorithm.hash(), key, msg),
            (Family::EcDsa, key) => sign_ecdsa(algorithm, key, msg),
            (Family::EdDsa, SigningKey::Ed25519(key)) => {
                Signer::<ed25519_dalek::Signature>::try_sign(key, msg)
                    .map(|sig| sig.to_bytes().to_vec())
                    .map_err(CryptoError::Signing)
            }
            (_, key) => Err(incompatible(algorithm, key.describe())),
        }
    }
}

fn sign_ecdsa(algorithm: Algorithm, key: &SigningKey, msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let sig = match (algorithm, key) {
        (Algorithm::Es256, SigningKey::P256(key)) => {
            Signer::<p256::ecdsa::Signature>::try_sign(key, msg).map(|sig| sig.to_bytes().to_vec())
        }
        (Algorithm::Es384, SigningKey::P384(key)) => {
            Signer::<p384::ecdsa::Signature>::try_sign(key, msg).map(|sig| sig.to_bytes().to_vec())
        }
        (Algorithm::Es512, SigningKey::P521(key)) => {
            Signer::<p521::ecdsa::Signature>::try_sign(key, msg).map(|sig| sig.to_bytes().to_vec())
        }
        #[cfg(feature = "es256k")]
        (Algorithm::Es256k, SigningKey::K256(key)) => {
            Signer::<k256::ecdsa::Signature>::try_sign(key, msg).map(|sig| sig.to_bytes().to_vec())
        }
        (algorithm, key) => return Err(incompatible(algorithm, key.describe())),
    };
    sig.map_err(CryptoError::Signing)
}

fn sign_pkcs1v15(
    hash: HashAlgorithm,
    key: &RsaPrivateKey,
    msg: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let key = key.clone();
    let sig = match hash {
        HashAlgorithm::Sha2_256 => pkcs1v15::SigningKey::<Sha256>::new(key).try_sign(msg),
        HashAlgorithm::Sha2_384 => pkcs1v15::SigningKey::<Sha384>::new(key).try_sign(msg),
        HashAlgorithm::Sha2_512 => pkcs1v15::SigningKey::<Sha512>::new(key).try_sign(msg),
    };
    sig.map(|sig| sig.to_vec()).map_err(CryptoError::Signing)
}

fn sign_pss(hash: HashAlgorithm, key: &RsaPrivateKey, msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let key = key.clone();
    let mut rng = rand::thread_rng();
    let sig = match hash {
        HashAlgorithm::Sha2_256 => {
            pss::BlindedSigningKey::<Sha256>::new(key).try_sign_with_rng(&mut rng, msg)
        }
        HashAlgorithm::Sha2_384 => {
            pss::BlindedSigningKey::<Sha384>::new(key).try_sign_with_rng(&mut rng, msg)
        }
        HashAlgorithm::Sha2_512 => {
            pss::BlindedSigningKey::<Sha512>::new(key).try_sign_with_rng(&mut rng, msg)
        }
    };
    sig.map(|sig| sig.to_vec()).map_err(CryptoError::Signing)
}

fn mac(hash: HashAlgorithm, secret: &HmacKey, msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
    fn tag<M: Mac + KeyInit>(secret: &[u8], msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(keyed_mac::<M>(secret, msg)?.finalize().into_bytes().to_vec())
    }

    match hash {
        HashAlgorithm::Sha2_256 => tag::<Hmac<Sha256>>(secret.as_bytes(), msg),
        HashAlgorithm::Sha2_384 => tag::<Hmac<Sha384>>(secret.as_bytes(), msg),
        HashAlgorithm::Sha2_512 => tag::<Hmac<Sha512>>(secret.as_bytes(), msg),
    }
}

/// A MAC keyed with `secret` that has absorbed `msg`.
pub(crate) fn keyed_mac<M: Mac + KeyInit>(secret: &[u8], msg: &[u8]) -> Result<M, KeyError> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|_| KeyError::InvalidKey(signature::Error::new()))?;
    mac.update(msg);
    Ok(mac)
}

pub(crate) fn incompatible(algorithm: Algorithm, key_type: &str) -> CryptoError {
    CryptoError::Key(KeyError::IncompatibleKey {
        algorithm,
        key_type: key_type.to_string(),
    })
}
