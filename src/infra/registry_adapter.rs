use std::time::Instant;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::app::ports::EntityLookupPort;
use crate::config::RegistryConfig;
use crate::constants::LEI_FILTER_PARAM;
use crate::error::{EnricherError, Result};
use crate::infra::http_client::{build_client, classify_error};
use crate::observability::metrics;
use crate::types::{EntityReference, LookupFailure};

/// GLEIF `lei-records` endpoint behind [`EntityLookupPort`]
pub struct GleifRegistryAdapter {
    client: reqwest::Client,
    base_url: Url,
}

impl GleifRegistryAdapter {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            EnricherError::Config(format!("invalid registry url '{}': {}", config.base_url, e))
        })?;
        Ok(Self {
            client: build_client(config)?,
            base_url,
        })
    }

    pub fn lookup_url(&self, lei: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair(LEI_FILTER_PARAM, lei);
        url
    }

    async fn fetch(&self, lei: &str) -> std::result::Result<Vec<u8>, LookupFailure> {
        let url = self.lookup_url(lei);
        debug!(%url, "registry lookup");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| classify_error(&e))?;
        let bytes = response.bytes().await.map_err(|e| classify_error(&e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl EntityLookupPort for GleifRegistryAdapter {
    async fn lookup(&self, lei: &str) -> std::result::Result<Option<EntityReference>, LookupFailure> {
        let started = Instant::now();
        let result = self.fetch(lei).await.and_then(|bytes| {
            parse_lookup_response(&bytes).map_err(|e| {
                warn!(lei, error = %e, "registry response could not be decoded");
                LookupFailure::Decode
            })
        });
        metrics::registry::lookup_duration(started.elapsed().as_secs_f64());

        match &result {
            Ok(Some(_)) => metrics::registry::lookup_matched(),
            Ok(None) => metrics::registry::lookup_unmatched(),
            Err(failure) => {
                warn!(lei, failure = failure.category(), "registry lookup failed");
                metrics::registry::lookup_failed(failure.category());
            }
        }
        result
    }
}

#[derive(Debug, Deserialize)]
struct LeiRecordsResponse {
    #[serde(default)]
    data: Option<Vec<LeiRecord>>,
}

#[derive(Debug, Deserialize)]
struct LeiRecord {
    #[serde(default)]
    attributes: Option<LeiAttributes>,
}

#[derive(Debug, Deserialize)]
struct LeiAttributes {
    #[serde(default)]
    entity: Option<LeiEntity>,
    #[serde(default)]
    bic: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeiEntity {
    #[serde(default)]
    legal_name: Option<LegalName>,
    #[serde(default)]
    legal_address: Option<LegalAddress>,
}

#[derive(Debug, Deserialize)]
struct LegalName {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegalAddress {
    #[serde(default)]
    country: Option<String>,
}

/// Decode a `lei-records` body, keeping only the first record's attributes.
pub fn parse_lookup_response(bytes: &[u8]) -> serde_json::Result<Option<EntityReference>> {
    let response: LeiRecordsResponse = serde_json::from_slice(bytes)?;

    let attributes = response
        .data
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|record| record.attributes);

    Ok(attributes.map(|attributes| {
        let entity = attributes.entity;
        EntityReference {
            legal_name: entity
                .as_ref()
                .and_then(|e| e.legal_name.as_ref())
                .and_then(|n| n.name.clone()),
            bic: attributes.bic.unwrap_or_default(),
            legal_address_country: entity
                .as_ref()
                .and_then(|e| e.legal_address.as_ref())
                .and_then(|a| a.country.clone()),
        }
    }))
}
