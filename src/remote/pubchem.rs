//! PubChem PUG REST client
//!
//! Uses a blocking `ureq` agent on Tokio's blocking pool. HTTP 404 is the
//! service's way of saying "no such compound" and maps to `Ok(None)`; every
//! other failure is a transient [`ChemError::Remote`].

use super::RemoteLookup;
use crate::compound::{CompoundId, CompoundRecord};
use crate::config::schema::RemoteConfig;
use crate::error::{ChemError, ChemResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// Properties requested for every record
const PROPERTIES: &[&str] = &[
    "MolecularFormula",
    "MolecularWeight",
    "CanonicalSMILES",
    "IsomericSMILES",
    "InChI",
    "InChIKey",
    "IUPACName",
    "XLogP",
    "ExactMass",
    "TPSA",
    "Charge",
    "HBondDonorCount",
    "HBondAcceptorCount",
    "RotatableBondCount",
    "HeavyAtomCount",
];

/// Client for the PubChem compound endpoints
#[derive(Debug, Clone)]
pub struct PubChemClient {
    agent: ureq::Agent,
    base_url: String,
}

impl PubChemClient {
    /// Create a client for `base_url` (e.g. `https://pubchem.ncbi.nlm.nih.gov/rest/pug`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        let base_url: String = base_url.into();

        Self {
            agent: ureq::Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from the `[remote]` config section
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(config.base_url.clone(), config.timeout())
    }

    fn name_url(&self, name: &str) -> String {
        format!(
            "{}/compound/name/{}/cids/JSON",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    fn record_url(&self, id: CompoundId) -> String {
        format!(
            "{}/compound/cid/{}/property/{}/JSON",
            self.base_url,
            id,
            PROPERTIES.join(",")
        )
    }

    async fn get_json(&self, identifier: &str, url: String) -> ChemResult<Option<Value>> {
        let agent = self.agent.clone();
        let identifier = identifier.to_string();
        debug!("GET {}", url);

        tokio::task::spawn_blocking(move || fetch_json(&agent, &url, &identifier))
            .await
            .map_err(|e| ChemError::Internal(format!("lookup task failed: {}", e)))?
    }
}

fn fetch_json(agent: &ureq::Agent, url: &str, identifier: &str) -> ChemResult<Option<Value>> {
    match agent.get(url).call() {
        Ok(mut response) => {
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| ChemError::remote(identifier, e.to_string()))?;
            let json = serde_json::from_str(&body)
                .map_err(|e| ChemError::remote(identifier, format!("malformed response: {}", e)))?;
            Ok(Some(json))
        }
        Err(ureq::Error::StatusCode(404)) => Ok(None),
        Err(ureq::Error::StatusCode(code)) => Err(ChemError::remote(identifier, format!("HTTP {}", code))),
        Err(e) => Err(ChemError::remote(identifier, e.to_string())),
    }
}

/// Extract the first CID from an `IdentifierList` response.
///
/// PubChem reports "no match" as CID 0 for some name queries.
fn parse_cid_list(json: &Value) -> Option<CompoundId> {
    json.pointer("/IdentifierList/CID")?
        .as_array()?
        .iter()
        .filter_map(Value::as_u64)
        .find(|cid| *cid != 0)
        .map(CompoundId)
}

/// Extract the first entry of a `PropertyTable` response
fn parse_property_table(json: &Value, id: CompoundId) -> Option<CompoundRecord> {
    let first = json.pointer("/PropertyTable/Properties/0")?.as_object()?;
    let properties: Map<String, Value> = first
        .iter()
        .filter(|(key, _)| key.as_str() != "CID")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Some(CompoundRecord { id, properties })
}

#[async_trait]
impl RemoteLookup for PubChemClient {
    async fn resolve_name(&self, name: &str) -> ChemResult<Option<CompoundId>> {
        let json = self.get_json(name, self.name_url(name)).await?;
        Ok(json.as_ref().and_then(parse_cid_list))
    }

    async fn fetch_record(&self, id: CompoundId) -> ChemResult<Option<CompoundRecord>> {
        let json = self.get_json(&id.to_string(), self.record_url(id)).await?;
        Ok(json.as_ref().and_then(|j| parse_property_table(j, id)))
    }

    fn source_name(&self) -> &'static str {
        "PubChem"
    }
}
