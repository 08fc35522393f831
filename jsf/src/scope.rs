//! Signing input construction.
//!
//! The bytes signed (or verified) for a signature are the canonical form of
//! a copy of the payload in which excluded members are removed and the
//! signature property is replaced by a per-topology scope value. `value`
//! never appears in its own scope.

use crate::{
    canonical,
    header::{CHAIN, EXCLUDES, SIGNERS, VALUE},
};
use serde_json::{Map, Value};

/// What stands in for the signature property while one signature is computed.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// The header itself, without `value` and `excludes`.
    Single {
        /// The single signature's header.
        header: &'a Map<String, Value>,
    },

    /// The container, without `excludes`, whose `signers` holds only this signer.
    ///
    /// Sibling signers are never covered.
    Multi {
        /// The `signers` container.
        container: &'a Map<String, Value>,
        /// The signer whose scope this is.
        signer: &'a Map<String, Value>,
    },

    /// The container, without `excludes`, whose `chain` holds every earlier
    /// link verbatim followed by this one.
    Chain {
        /// The `chain` container.
        container: &'a Map<String, Value>,
        /// Links before this one, including their `value`.
        prior: &'a [Value],
        /// The link whose scope this is.
        link: &'a Map<String, Value>,
    },
}

impl Scope<'_> {
    /// The JSON value substituted for the signature property.
    #[must_use]
    pub fn value(&self) -> Value {
        match self {
            Scope::Single { header } => {
                let mut header = without(header, VALUE);
                header.remove(EXCLUDES);
                Value::Object(header)
            }
            Scope::Multi { container, signer } => {
                let mut container = without(container, EXCLUDES);
                container.insert(
                    SIGNERS.to_string(),
                    Value::Array(vec![Value::Object(without(signer, VALUE))]),
                );
                Value::Object(container)
            }
            Scope::Chain {
                container,
                prior,
                link,
            } => {
                let mut container = without(container, EXCLUDES);
                let mut chain = prior.to_vec();
                chain.push(Value::Object(without(link, VALUE)));
                container.insert(CHAIN.to_string(), Value::Array(chain));
                Value::Object(container)
            }
        }
    }
}

/// Build the canonical bytes for one signature.
///
/// Payload members named in `excludes` are removed first; members that are
/// not present are ignored.
///
/// # Errors
///
/// Fails only if the payload cannot be canonicalized.
pub fn signing_input(
    payload: &Map<String, Value>,
    prop: &str,
    scope: &Scope<'_>,
    excludes: &[String],
) -> Result<Vec<u8>, serde_json::Error> {
    let mut copy = payload.clone();
    for name in excludes {
        copy.remove(name);
    }
    copy.insert(prop.to_string(), scope.value());
    canonical::canonicalize(&copy)
}

fn without(object: &Map<String, Value>, field: &str) -> Map<String, Value> {
    let mut copy = object.clone();
    copy.remove(field);
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use testresult::TestResult;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn text(bytes: Vec<u8>) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(bytes)
    }

    #[test]
    fn single_scope_drops_value_and_excludes() -> TestResult {
        let payload = object(json!({"b": 1, "a": 2, "skip": 3}));
        let header = object(json!({
            "algorithm": "HS256",
            "excludes": ["skip"],
            "value": "abc"
        }));
        let bytes = signing_input(
            &payload,
            "sig",
            &Scope::Single { header: &header },
            &["skip".to_string()],
        )?;
        assert_eq!(text(bytes)?, r#"{"a":2,"b":1,"sig":{"algorithm":"HS256"}}"#);
        Ok(())
    }

    #[test]
    fn multi_scope_covers_only_its_signer() -> TestResult {
        let payload = object(json!({"m": "hi"}));
        let container = object(json!({
            "signers": [{"algorithm": "ES256", "value": "one"}, {"algorithm": "RS256", "value": "two"}]
        }));
        let signer = object(json!({"algorithm": "RS256", "value": "two"}));
        let bytes = signing_input(
            &payload,
            "sig",
            &Scope::Multi {
                container: &container,
                signer: &signer,
            },
            &[],
        )?;
        assert_eq!(
            text(bytes)?,
            r#"{"m":"hi","sig":{"signers":[{"algorithm":"RS256"}]}}"#
        );
        Ok(())
    }

    #[test]
    fn chain_scope_keeps_prior_links_verbatim() -> TestResult {
        let payload = object(json!({"m": "hi"}));
        let container = object(json!({"chain": [], "excludes": ["m"]}));
        let prior = [json!({"algorithm": "ES256", "value": "first"})];
        let link = object(json!({"algorithm": "RS256", "value": "second"}));
        let bytes = signing_input(
            &payload,
            "sig",
            &Scope::Chain {
                container: &container,
                prior: &prior,
                link: &link,
            },
            &["m".to_string()],
        )?;
        assert_eq!(
            text(bytes)?,
            r#"{"sig":{"chain":[{"algorithm":"ES256","value":"first"},{"algorithm":"RS256"}]}}"#
        );
        Ok(())
    }

    #[test]
    fn container_fields_stay_in_scope() {
        let container = object(json!({"extensions": ["otherExt"], "signers": []}));
        let signer = object(json!({"algorithm": "ES256"}));
        let value = Scope::Multi {
            container: &container,
            signer: &signer,
        }
        .value();
        assert_eq!(
            value,
            json!({"extensions": ["otherExt"], "signers": [{"algorithm": "ES256"}]})
        );
    }

    #[test]
    fn excluding_a_missing_member_is_harmless() -> TestResult {
        let payload = object(json!({"a": 1}));
        let header = object(json!({}));
        let bytes = signing_input(
            &payload,
            "sig",
            &Scope::Single { header: &header },
            &["nope".to_string()],
        )?;
        assert_eq!(text(bytes)?, r#"{"a":1,"sig":{}}"#);
        Ok(())
    }
}
