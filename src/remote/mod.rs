//! Remote compound lookup abstraction
//!
//! The cache consumes a [`RemoteLookup`]; it never talks to the network
//! itself. Two adapters ship with the crate:
//! - [`PubChemClient`] for the PubChem PUG REST service
//! - [`FixtureRemote`] serving canned data from a JSON fixture

pub mod fixture;
pub mod pubchem;

pub use fixture::FixtureRemote;
pub use pubchem::PubChemClient;

use crate::compound::{CompoundId, CompoundRecord};
use crate::error::ChemResult;
use async_trait::async_trait;

/// Remote lookup capability
///
/// `Ok(None)` means the identifier does not exist upstream. `Err` means the
/// call itself failed and may succeed on retry.
#[async_trait]
pub trait RemoteLookup: Send + Sync {
    /// Resolve a compound name to its canonical id
    async fn resolve_name(&self, name: &str) -> ChemResult<Option<CompoundId>>;

    /// Fetch the full record for a canonical id
    async fn fetch_record(&self, id: CompoundId) -> ChemResult<Option<CompoundRecord>>;

    /// Human-readable source name for display
    fn source_name(&self) -> &'static str;
}
