//! Metrics for the enrichment pipeline.
//!
//! Recording helpers are grouped by pipeline phase. They are no-ops until a
//! recorder is installed with [`init_metrics`].

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::fmt;
use tracing::{info, warn};

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Every metric name emitted by the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Parser metrics
    ParserRecordsParsed,

    // Registry metrics
    RegistryLookups,
    RegistryLookupFailures,
    RegistryLookupDuration,

    // Enrich metrics
    EnrichRecordsEnriched,
    EnrichCostErrors,

    // Batch metrics
    BatchesProcessed,
    BatchSize,
    BatchErrors,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ParserRecordsParsed => "lei_enricher_parser_records_parsed_total",

            MetricName::RegistryLookups => "lei_enricher_registry_lookups_total",
            MetricName::RegistryLookupFailures => "lei_enricher_registry_lookup_failures_total",
            MetricName::RegistryLookupDuration => "lei_enricher_registry_lookup_duration_seconds",

            MetricName::EnrichRecordsEnriched => "lei_enricher_records_enriched_total",
            MetricName::EnrichCostErrors => "lei_enricher_cost_errors_total",

            MetricName::BatchesProcessed => "lei_enricher_batches_processed_total",
            MetricName::BatchSize => "lei_enricher_batch_size",
            MetricName::BatchErrors => "lei_enricher_batch_errors",
        }
    }

    /// All metric names, for documentation and exporter setup
    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            ParserRecordsParsed,
            RegistryLookups,
            RegistryLookupFailures,
            RegistryLookupDuration,
            EnrichRecordsEnriched,
            EnrichCostErrors,
            BatchesProcessed,
            BatchSize,
            BatchErrors,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the Prometheus recorder once for the process.
///
/// Returns `None` when another recorder already owns the global slot.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match HANDLE.get_or_try_init(|| PrometheusBuilder::new().install_recorder()) {
        Ok(handle) => {
            info!("Prometheus recorder installed");
            Some(handle.clone())
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    }
}

/// Render the current metrics in Prometheus text format, if a recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

// ============================================================================
// Parser Metrics
// ============================================================================

pub mod parser {
    use super::MetricName;

    pub fn record_parsed() {
        ::metrics::counter!(MetricName::ParserRecordsParsed.as_str()).increment(1);
    }
}

// ============================================================================
// Registry Metrics
// ============================================================================

pub mod registry {
    use super::MetricName;

    pub fn lookup_matched() {
        ::metrics::counter!(MetricName::RegistryLookups.as_str(), "outcome" => "match").increment(1);
    }

    pub fn lookup_unmatched() {
        ::metrics::counter!(MetricName::RegistryLookups.as_str(), "outcome" => "no_match")
            .increment(1);
    }

    /// Record a failed lookup, labelled with its failure category
    pub fn lookup_failed(category: &'static str) {
        ::metrics::counter!(MetricName::RegistryLookups.as_str(), "outcome" => "failure")
            .increment(1);
        ::metrics::counter!(MetricName::RegistryLookupFailures.as_str(), "category" => category)
            .increment(1);
    }

    pub fn lookup_duration(secs: f64) {
        ::metrics::histogram!(MetricName::RegistryLookupDuration.as_str()).record(secs);
    }
}

// ============================================================================
// Enrich Metrics
// ============================================================================

pub mod enrich {
    use super::MetricName;

    pub fn record_enriched() {
        ::metrics::counter!(MetricName::EnrichRecordsEnriched.as_str()).increment(1);
    }

    pub fn cost_error() {
        ::metrics::counter!(MetricName::EnrichCostErrors.as_str()).increment(1);
    }
}

// ============================================================================
// Batch Metrics
// ============================================================================

pub mod batch {
    use super::MetricName;

    pub fn batch_processed(records: usize, errors: usize) {
        ::metrics::counter!(MetricName::BatchesProcessed.as_str()).increment(1);
        ::metrics::histogram!(MetricName::BatchSize.as_str()).record(records as f64);
        ::metrics::histogram!(MetricName::BatchErrors.as_str()).record(errors as f64);
    }
}
