//! Algorithm-keyed signing and verification over byte buffers.

use crate::{
    algorithm::{allowed::AllowedAlgorithms, Algorithm},
    error::{CryptoError, KeyError},
    jwk::Jwk,
    key::kty_matches,
};

/// Signs and verifies byte buffers, admitting only allow-listed algorithms.
///
/// Keys are given as [`Jwk`]s and parsed per call.
///
/// ```rust
/// use jsf_crypto::{Algorithm, CryptoEngine, Jwk};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = CryptoEngine::default();
/// let key = Jwk::generate(Algorithm::Es256)?;
///
/// let sig = engine.sign(Algorithm::Es256, &key, b"hello")?;
/// engine.verify(Algorithm::Es256, &key, b"hello", &sig)?;
/// assert!(engine.verify(Algorithm::Es256, &key, b"goodbye", &sig).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CryptoEngine {
    allowed: AllowedAlgorithms,
}

impl CryptoEngine {
    /// An engine restricted to `allowed`.
    #[must_use]
    pub fn new(allowed: AllowedAlgorithms) -> Self {
        CryptoEngine { allowed }
    }

    /// The algorithms this engine admits.
    #[must_use]
    pub fn allowed(&self) -> &AllowedAlgorithms {
        &self.allowed
    }

    /// Sign `msg` with `key` under `algorithm`.
    ///
    /// # Errors
    ///
    /// Fails with [`CryptoError::AlgorithmNotAllowed`] outside the allow-list,
    /// with a [`KeyError`] if the key is unusable for the algorithm, or with
    /// [`CryptoError::Signing`] if the backend fails.
    pub fn sign(&self, algorithm: Algorithm, key: &Jwk, msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.admit(algorithm, key)?;
        key.signing_key()?.try_sign(algorithm, msg)
    }

    /// Verify `signature` over `msg` with `key` under `algorithm`.
    ///
    /// Private keys may be passed; only their public part is used.
    ///
    /// # Errors
    ///
    /// Fails with [`CryptoError::SignatureMismatch`] if the signature does not
    /// match, and otherwise as [`sign`](Self::sign) does.
    pub fn verify(
        &self,
        algorithm: Algorithm,
        key: &Jwk,
        msg: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        self.admit(algorithm, key)?;
        key.verifying_key()?.verify(algorithm, msg, signature)
    }

    fn admit(&self, algorithm: Algorithm, key: &Jwk) -> Result<(), CryptoError> {
        if !self.allowed.contains(algorithm) {
            tracing::debug!(%algorithm, "algorithm rejected by allow-list");
            return Err(CryptoError::AlgorithmNotAllowed(algorithm));
        }
        if !kty_matches(&key.kty, algorithm) {
            return Err(KeyError::IncompatibleKey {
                algorithm,
                key_type: key.kty.clone(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    const R2048_PRIVATE: &str = include_str!("../testdata/r2048.json");

    #[test]
    fn rsa_pkcs1_and_pss_with_one_key() -> TestResult {
        let key: Jwk = serde_json::from_str(R2048_PRIVATE)?;
        let public = key.to_public().ok_or("RSA key has a public half")?;
        let engine = CryptoEngine::default();

        for alg in [Algorithm::Rs256, Algorithm::Rs512, Algorithm::Ps256, Algorithm::Ps384] {
            let sig = engine.sign(alg, &key, b"cleartext")?;
            assert_eq!(sig.len(), 256);
            engine.verify(alg, &public, b"cleartext", &sig)?;
            assert!(matches!(
                engine.verify(alg, &public, b"Cleartext", &sig),
                Err(CryptoError::SignatureMismatch)
            ));
        }
        Ok(())
    }

    #[test]
    fn pkcs1_signature_does_not_verify_as_pss() -> TestResult {
        let key: Jwk = serde_json::from_str(R2048_PRIVATE)?;
        let engine = CryptoEngine::default();
        let sig = engine.sign(Algorithm::Rs256, &key, b"cleartext")?;
        assert!(engine.verify(Algorithm::Ps256, &key, b"cleartext", &sig).is_err());
        Ok(())
    }

    #[test]
    fn allow_list_is_enforced_both_ways() -> TestResult {
        let key = Jwk::from_secret(&[1; 32]);
        let open = CryptoEngine::default();
        let sig = open.sign(Algorithm::Hs256, &key, b"data")?;

        let closed = CryptoEngine::new(AllowedAlgorithms::default().without(Algorithm::Hs256));
        assert!(matches!(
            closed.sign(Algorithm::Hs256, &key, b"data"),
            Err(CryptoError::AlgorithmNotAllowed(Algorithm::Hs256))
        ));
        assert!(matches!(
            closed.verify(Algorithm::Hs256, &key, b"data", &sig),
            Err(CryptoError::AlgorithmNotAllowed(Algorithm::Hs256))
        ));
        Ok(())
    }

    #[test]
    fn key_type_must_match_algorithm() {
        let key = Jwk::from_secret(&[1; 32]);
        assert!(matches!(
            CryptoEngine::default().sign(Algorithm::Es256, &key, b"data"),
            Err(CryptoError::Key(KeyError::IncompatibleKey { key_type, .. })) if key_type == "oct"
        ));
    }
}
