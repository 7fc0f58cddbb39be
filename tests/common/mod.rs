#![allow(dead_code)]

use async_trait::async_trait;
use lei_enricher::app::ports::EntityLookupPort;
use lei_enricher::infra::registry_adapter::parse_lookup_response;
use lei_enricher::{EntityReference, LookupFailure};
use std::path::PathBuf;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

pub fn read_fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture(name)).expect("fixture should exist")
}

/// The NL entity from `gleif_sample.json`
pub fn sample_entity() -> EntityReference {
    parse_lookup_response(&read_fixture("gleif_sample.json"))
        .expect("sample should decode")
        .expect("sample should match")
}

/// Gives the same answer for every LEI
pub struct FixedLookup(pub Result<Option<EntityReference>, LookupFailure>);

impl FixedLookup {
    pub fn sample() -> Self {
        Self(Ok(Some(sample_entity())))
    }
}

#[async_trait]
impl EntityLookupPort for FixedLookup {
    async fn lookup(&self, _lei: &str) -> Result<Option<EntityReference>, LookupFailure> {
        self.0.clone()
    }
}
