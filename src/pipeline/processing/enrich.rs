use tracing::{debug, warn};

use crate::constants::{COUNTRY_GB, COUNTRY_NL};
use crate::types::{EnrichmentError, EntityReference, Record};

/// Result of enriching one record: the record itself plus at most one error.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichOutcome {
    pub record: Record,
    pub error: Option<EnrichmentError>,
}

/// The NL cost rule divides by the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroRate;

/// Trait for merging registry reference data into a transaction record
pub trait Enricher {
    /// Enrich `record` with `reference`; `None` means the registry had nothing to offer
    fn enrich(&self, record: Record, reference: Option<&EntityReference>) -> EnrichOutcome;
}

/// Enricher applying the per-country transaction cost rules
#[derive(Debug, Default, Clone, Copy)]
pub struct CostRuleEnricher;

impl Enricher for CostRuleEnricher {
    fn enrich(&self, record: Record, reference: Option<&EntityReference>) -> EnrichOutcome {
        enrich_record(record, reference)
    }
}

pub fn enrich_record(mut record: Record, reference: Option<&EntityReference>) -> EnrichOutcome {
    record.clear_enrichment();

    let Some(reference) = reference else {
        return EnrichOutcome { record, error: None };
    };

    record.legal_name = reference.legal_name.clone();
    record.bic = reference.bic.clone();

    let country = reference.legal_address_country.as_deref();
    let error = match transactions_cost(record.notional.as_deref(), record.rate.as_deref(), country) {
        Ok(cost) => {
            record.transactions_costs = cost.map(|value| value.to_string());
            None
        }
        Err(ZeroRate) => {
            let lei = record.lei.clone().unwrap_or_default();
            warn!(lei = %lei, "rate is zero, transactions cost left unset");
            Some(EnrichmentError::NonComputableCost { lei })
        }
    };

    EnrichOutcome { record, error }
}

/// Compute the transaction cost for a legal-address country.
///
/// Missing, empty or unparseable inputs and countries without a rule give
/// `Ok(None)`. Only a zero rate under the NL rule is an error.
pub fn transactions_cost(
    notional: Option<&str>,
    rate: Option<&str>,
    country: Option<&str>,
) -> Result<Option<f64>, ZeroRate> {
    let (Some(notional), Some(rate)) = (non_empty(notional), non_empty(rate)) else {
        return Ok(None);
    };

    let (notional, rate) = match (notional.parse::<f64>(), rate.parse::<f64>()) {
        (Ok(n), Ok(r)) => (n, r),
        _ => {
            warn!(notional, rate, "non-numeric notional or rate, transactions cost left unset");
            return Ok(None);
        }
    };

    match country {
        Some(COUNTRY_GB) => Ok(Some(notional * rate - notional)),
        Some(COUNTRY_NL) => {
            if rate == 0.0 {
                return Err(ZeroRate);
            }
            Ok(Some((notional * (1.0 / rate) - notional).abs()))
        }
        other => {
            debug!(country = ?other, "no cost rule for country");
            Ok(None)
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
