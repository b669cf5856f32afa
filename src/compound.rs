//! Compound identifiers and lookup payloads
//!
//! Records are opaque to this crate: a canonical id plus whatever property
//! map the remote service returned.

use crate::error::{ChemError, ChemResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Canonical numeric compound id (PubChem CID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompoundId(pub u64);

impl fmt::Display for CompoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompoundId {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ChemError::InvalidIdentifier(s.to_string()));
        }
        trimmed
            .parse()
            .map(Self)
            .map_err(|_| ChemError::InvalidIdentifier(s.to_string()))
    }
}

/// A fetched compound record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundRecord {
    pub id: CompoundId,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl CompoundRecord {
    pub fn new(id: CompoundId) -> Self {
        Self {
            id,
            properties: Map::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// String property, if present and textual
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// What a batch item or CLI argument refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// Canonical id, used directly
    Id(CompoundId),
    /// Name that must be resolved to an id first
    Name(String),
}

impl Identifier {
    /// Classify raw input: all-digit strings are ids, anything else a name
    pub fn parse(raw: &str) -> ChemResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChemError::InvalidIdentifier(raw.to_string()));
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return trimmed.parse().map(Self::Id);
        }
        Ok(Self::Name(trimmed.to_string()))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "CID {}", id),
            Self::Name(name) => f.write_str(name),
        }
    }
}
