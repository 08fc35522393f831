//! Runtime configuration.

use crate::registry::HeaderRegistry;
use jsf_crypto::{AllowedAlgorithms, UnknownAlgorithm};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Engine configuration, usually read from a JSON or TOML file.
///
/// ```rust
/// use jsf::JsfConfig;
///
/// let config: JsfConfig = serde_json::from_str(r#"{
///     "allowedAlgorithms": ["ES256", "RS256"],
///     "extensions": { "otherExt": true, "legacyExt": false }
/// }"#).unwrap();
///
/// assert!(config.allowed_algorithms().unwrap().contains(jsf_crypto::Algorithm::Rs256));
/// assert_eq!(config.registry().get("legacyExt"), Some(false));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsfConfig {
    /// Algorithm names to admit. Absent means every supported algorithm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_algorithms: Option<Vec<String>>,

    /// Registered header extensions and whether each is enabled.
    pub extensions: BTreeMap<String, bool>,
}

impl JsfConfig {
    /// The configured allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownAlgorithm`] if a configured name is not supported.
    pub fn allowed_algorithms(&self) -> Result<AllowedAlgorithms, UnknownAlgorithm> {
        match &self.allowed_algorithms {
            None => Ok(AllowedAlgorithms::default()),
            Some(names) => AllowedAlgorithms::from_names(names),
        }
    }

    /// The configured extension registry.
    #[must_use]
    pub fn registry(&self) -> HeaderRegistry {
        self.extensions
            .iter()
            .map(|(name, enabled)| (name.clone(), *enabled))
            .collect()
    }
}
