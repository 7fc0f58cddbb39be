use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::app::ports::EntityLookupPort;
use crate::constants::{OK_MESSAGE, PARTIAL_FAILURE_PREFIX};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::enrich::{CostRuleEnricher, EnrichOutcome, Enricher};
use crate::pipeline::processing::parser::parse_records;
use crate::types::{EnrichResponse, EnrichmentError, Record};

/// Enriched records of one batch, in input order, with every recorded error
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub records: Vec<Record>,
    pub errors: Vec<EnrichmentError>,
}

impl BatchOutcome {
    /// `"OK"`, or a summary listing every error description
    pub fn message(&self) -> String {
        if self.errors.is_empty() {
            return OK_MESSAGE.to_string();
        }
        let descriptions: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        format!("{}: [{}]", PARTIAL_FAILURE_PREFIX, descriptions.join(", "))
    }

    pub fn into_response(self) -> EnrichResponse {
        EnrichResponse {
            message: self.message(),
            data: self.records,
        }
    }
}

/// Use case for enriching a CSV payload record by record
pub struct EnrichUseCase {
    lookup: Box<dyn EntityLookupPort>,
    enricher: Box<dyn Enricher + Send + Sync>,
}

impl EnrichUseCase {
    pub fn new(lookup: Box<dyn EntityLookupPort>, enricher: Box<dyn Enricher + Send + Sync>) -> Self {
        Self { lookup, enricher }
    }

    /// Create a use case with the country cost rules
    pub fn with_default_enricher(lookup: Box<dyn EntityLookupPort>) -> Self {
        Self::new(lookup, Box::new(CostRuleEnricher))
    }

    /// Look up and enrich a single record.
    ///
    /// A failed lookup still yields the record, with default enrichment and a
    /// `RegistryUnreachable` error.
    pub async fn enrich_one(&self, record: Record) -> EnrichOutcome {
        let lei = match record.lei.as_deref() {
            Some(lei) if !lei.trim().is_empty() => lei.to_string(),
            _ => {
                debug!("record has no lei, skipping lookup");
                return self.enricher.enrich(record, None);
            }
        };

        match self.lookup.lookup(&lei).await {
            Ok(reference) => self.enricher.enrich(record, reference.as_ref()),
            Err(failure) => {
                let mut outcome = self.enricher.enrich(record, None);
                outcome.error = Some(EnrichmentError::RegistryUnreachable { lei, failure });
                outcome
            }
        }
    }

    /// Parse `bytes` and enrich every record sequentially.
    ///
    /// Only undecodable input fails the batch; per-record problems are
    /// collected in the outcome.
    pub async fn run(&self, bytes: &[u8]) -> Result<BatchOutcome> {
        let batch_id = Uuid::new_v4();
        let span = info_span!("enrich_batch", %batch_id, bytes = bytes.len());

        async move {
            let mut outcome = BatchOutcome::default();

            for record in parse_records(bytes)? {
                // Unreachable today: input is UTF-8 checked up front and the
                // reader is flexible, so csv has no row error left to raise.
                let EnrichOutcome { record, error } = self.enrich_one(record?).await;
                metrics::enrich::record_enriched();

                if let Some(error) = error {
                    if matches!(error, EnrichmentError::NonComputableCost { .. }) {
                        metrics::enrich::cost_error();
                    }
                    warn!(error = %error, "record enriched with error");
                    outcome.errors.push(error);
                }
                outcome.records.push(record);
            }

            metrics::batch::batch_processed(outcome.records.len(), outcome.errors.len());
            info!(
                records = outcome.records.len(),
                errors = outcome.errors.len(),
                "batch enriched"
            );
            Ok(outcome)
        }
        .instrument(span)
        .await
    }
}
