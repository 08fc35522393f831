//! Algorithm allow-lists.

use super::{Algorithm, UnknownAlgorithm};
use std::collections::BTreeSet;

/// The set of algorithms an engine accepts for both signing and verifying.
///
/// The default admits every algorithm compiled into this build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedAlgorithms(BTreeSet<Algorithm>);

impl AllowedAlgorithms {
    /// An allow-list that admits nothing.
    #[must_use]
    pub fn none() -> Self {
        AllowedAlgorithms(BTreeSet::new())
    }

    /// Parse an allow-list from header names such as `"ES256"`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownAlgorithm`] for the first name this build does not support.
    pub fn from_names<I, S>(names: I) -> Result<Self, UnknownAlgorithm>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<BTreeSet<_>, _>>()
            .map(AllowedAlgorithms)
    }

    /// Add an algorithm.
    #[must_use]
    pub fn with(mut self, algorithm: Algorithm) -> Self {
        self.0.insert(algorithm);
        self
    }

    /// Remove an algorithm.
    #[must_use]
    pub fn without(mut self, algorithm: Algorithm) -> Self {
        self.0.remove(&algorithm);
        self
    }

    /// Whether `algorithm` is admitted.
    #[must_use]
    pub fn contains(&self, algorithm: Algorithm) -> bool {
        self.0.contains(&algorithm)
    }

    /// Iterate over the admitted algorithms in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = Algorithm> + '_ {
        self.0.iter().copied()
    }
}

impl Default for AllowedAlgorithms {
    fn default() -> Self {
        Algorithm::ALL.iter().copied().collect()
    }
}

impl FromIterator<Algorithm> for AllowedAlgorithms {
    fn from_iter<T: IntoIterator<Item = Algorithm>>(iter: T) -> Self {
        AllowedAlgorithms(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn default_admits_everything() {
        let allowed = AllowedAlgorithms::default();
        assert!(Algorithm::ALL.iter().all(|alg| allowed.contains(*alg)));
    }

    #[test]
    fn from_names_parses_header_names() -> TestResult {
        let allowed = AllowedAlgorithms::from_names(["ES256", "EdDSA"])?;
        assert!(allowed.contains(Algorithm::Es256));
        assert!(allowed.contains(Algorithm::Ed25519));
        assert!(!allowed.contains(Algorithm::Hs256));
        Ok(())
    }

    #[test]
    fn from_names_rejects_unknown() {
        let err = AllowedAlgorithms::from_names(["ES256", "none"]);
        assert_eq!(err, Err(UnknownAlgorithm("none".to_string())));
    }

    #[test]
    fn with_and_without() {
        let allowed = AllowedAlgorithms::none()
            .with(Algorithm::Rs256)
            .with(Algorithm::Ps256)
            .without(Algorithm::Rs256);
        assert_eq!(allowed.iter().collect::<Vec<_>>(), vec![Algorithm::Ps256]);
    }
}
