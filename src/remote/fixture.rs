//! Fixture-backed remote lookup
//!
//! Serves lookups from a JSON document instead of the network:
//!
//! ```json
//! {
//!   "names": { "aspirin": 2244 },
//!   "records": { "2244": { "MolecularFormula": "C9H8O4" } },
//!   "unavailable": ["flaky-compound"]
//! }
//! ```
//!
//! Names are matched case-insensitively. Identifiers listed under
//! `unavailable` fail with a transient error. Every call is counted.

use super::RemoteLookup;
use crate::compound::{CompoundId, CompoundRecord};
use crate::error::{ChemError, ChemResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    names: HashMap<String, CompoundId>,
    #[serde(default)]
    records: HashMap<String, Map<String, Value>>,
    #[serde(default)]
    unavailable: HashSet<String>,
}

/// Remote lookup answering from canned data
#[derive(Debug, Default)]
pub struct FixtureRemote {
    fixture: Fixture,
    name_calls: AtomicUsize,
    record_calls: AtomicUsize,
}

impl FixtureRemote {
    /// Create an empty fixture (every lookup is not found)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a fixture document
    pub fn from_json(content: &str) -> ChemResult<Self> {
        let mut fixture: Fixture = serde_json::from_str(content)?;
        fixture.names = fixture
            .names
            .into_iter()
            .map(|(name, id)| (fold(&name), id))
            .collect();
        fixture.unavailable = fixture.unavailable.into_iter().map(|s| fold(&s)).collect();
        Ok(Self {
            fixture,
            ..Self::default()
        })
    }

    /// Load a fixture document from disk
    pub async fn load(path: &Path) -> ChemResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ChemError::io(format!("reading fixture {}", path.display()), e))?;
        Self::from_json(&content)
    }

    /// Register a compound reachable by name and id
    pub fn with_compound(mut self, name: &str, id: u64, properties: Value) -> Self {
        self.fixture.names.insert(fold(name), CompoundId(id));
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.fixture.records.insert(id.to_string(), properties);
        self
    }

    /// Make lookups of `identifier` fail with a transient error
    pub fn with_unavailable(mut self, identifier: &str) -> Self {
        self.fixture.unavailable.insert(fold(identifier));
        self
    }

    /// Number of name resolution calls served
    pub fn name_calls(&self) -> usize {
        self.name_calls.load(Ordering::SeqCst)
    }

    /// Number of record fetches served
    pub fn record_calls(&self) -> usize {
        self.record_calls.load(Ordering::SeqCst)
    }

    /// All calls served
    pub fn total_calls(&self) -> usize {
        self.name_calls() + self.record_calls()
    }

    fn check_available(&self, identifier: &str) -> ChemResult<()> {
        if self.fixture.unavailable.contains(&fold(identifier)) {
            return Err(ChemError::remote(identifier, "service unavailable"));
        }
        Ok(())
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

#[async_trait]
impl RemoteLookup for FixtureRemote {
    async fn resolve_name(&self, name: &str) -> ChemResult<Option<CompoundId>> {
        self.name_calls.fetch_add(1, Ordering::SeqCst);
        trace!("Fixture resolve_name({})", name);
        self.check_available(name)?;
        Ok(self.fixture.names.get(&fold(name)).copied())
    }

    async fn fetch_record(&self, id: CompoundId) -> ChemResult<Option<CompoundRecord>> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        trace!("Fixture fetch_record({})", id);
        let key = id.to_string();
        self.check_available(&key)?;
        Ok(self.fixture.records.get(&key).map(|properties| CompoundRecord {
            id,
            properties: properties.clone(),
        }))
    }

    fn source_name(&self) -> &'static str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn parses_fixture_document() {
        let remote = FixtureRemote::from_json(
            r#"{
                "names": { "Aspirin": 2244 },
                "records": { "2244": { "MolecularFormula": "C9H8O4" } },
                "unavailable": ["Flaky"]
            }"#,
        )
        .unwrap();

        assert_eq!(remote.resolve_name("ASPIRIN").await.unwrap(), Some(CompoundId(2244)));
        let record = remote.fetch_record(CompoundId(2244)).await.unwrap().unwrap();
        assert_eq!(record.property_str("MolecularFormula"), Some("C9H8O4"));
        assert!(remote.resolve_name("flaky").await.is_err());
        assert_eq!(remote.name_calls(), 2);
        assert_eq!(remote.record_calls(), 1);
    }

    #[tokio::test]
    async fn unknown_identifiers_are_not_found() {
        let remote = FixtureRemote::new().with_compound("caffeine", 2519, json!({}));
        assert_eq!(remote.resolve_name("invalid-xyz").await.unwrap(), None);
        assert_eq!(remote.fetch_record(CompoundId(1)).await.unwrap(), None);
        assert_eq!(remote.total_calls(), 2);
    }
}
