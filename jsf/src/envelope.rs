//! Signature property shapes.
//!
//! The value under the signature property is one of three shapes: a bare
//! header (single), a container with `signers` (independent multi
//! signatures), or a container with `chain` (each link witnesses the ones
//! before it).

use crate::{
    error::MalformedEnvelope,
    header::{CHAIN, SIGNERS},
};
use serde_json::{Map, Value};
use std::fmt;

/// The signature topology of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// One signature; the property is its header.
    Single,

    /// Independent signatures; valid if any verifies.
    Multi,

    /// Witnessing signatures; valid if all verify and there is at least one.
    Chain,
}

impl Topology {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Topology::Single => "single",
            Topology::Multi => "multi",
            Topology::Chain => "chain",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed signature property, borrowing from the payload.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Envelope<'a> {
    Single(&'a Map<String, Value>),
    Multi {
        container: &'a Map<String, Value>,
        signers: &'a [Value],
    },
    Chain {
        container: &'a Map<String, Value>,
        chain: &'a [Value],
    },
}

impl<'a> Envelope<'a> {
    pub(crate) fn parse(prop: &str, container: &'a Map<String, Value>) -> Result<Self, MalformedEnvelope> {
        match (container.get(SIGNERS), container.get(CHAIN)) {
            (None, None) => Ok(Envelope::Single(container)),
            (Some(signers), None) => Ok(Envelope::Multi {
                container,
                signers: array(signers, SIGNERS)?,
            }),
            (None, Some(chain)) => Ok(Envelope::Chain {
                container,
                chain: array(chain, CHAIN)?,
            }),
            (Some(_), Some(_)) => Err(MalformedEnvelope::AmbiguousTopology(prop.to_string())),
        }
    }

    pub(crate) fn topology(&self) -> Topology {
        match self {
            Envelope::Single(_) => Topology::Single,
            Envelope::Multi { .. } => Topology::Multi,
            Envelope::Chain { .. } => Topology::Chain,
        }
    }
}

fn array<'a>(value: &'a Value, field: &'static str) -> Result<&'a [Value], MalformedEnvelope> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or(MalformedEnvelope::NotAnArray(field))
}

/// Read an optional list of strings such as `extensions` or `excludes`.
pub(crate) fn string_list(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, MalformedEnvelope> {
    let Some(value) = object.get(field) else {
        return Ok(Vec::new());
    };
    value
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or(MalformedEnvelope::NotAStringList(field))
}
