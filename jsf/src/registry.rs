//! Header extension registry and policy check.

use crate::error::ExtensionPolicyViolation;
use std::collections::BTreeMap;

/// Known header extensions and whether each is enabled.
///
/// The default registry is empty, so any declared extension is rejected
/// until it is registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRegistry {
    entries: BTreeMap<String, bool>,
}

impl HeaderRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        HeaderRegistry::default()
    }

    /// Register `name` as a supported extension.
    #[must_use]
    pub fn enable(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), true);
        self
    }

    /// Register `name` as known but unsupported.
    #[must_use]
    pub fn disable(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), false);
        self
    }

    /// `Some(enabled)` if `name` is registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries.get(name).copied()
    }

    /// Check every declared extension name.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionPolicyViolation`] for the first name that is
    /// unknown or disabled.
    pub fn check_extensions<S: AsRef<str>>(
        &self,
        declared: &[S],
    ) -> Result<(), ExtensionPolicyViolation> {
        for name in declared {
            let name = name.as_ref();
            match self.get(name) {
                None => return Err(ExtensionPolicyViolation::Unknown(name.to_string())),
                Some(false) => return Err(ExtensionPolicyViolation::Unsupported(name.to_string())),
                Some(true) => {}
            }
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for HeaderRegistry {
    fn from_iter<T: IntoIterator<Item = (S, bool)>>(iter: T) -> Self {
        HeaderRegistry {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
