use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

use crate::constants::{
    BIC_KEY, LEGAL_NAME_KEY, LEI_COLUMN, NOTIONAL_COLUMN, OVERFLOW_KEY, RATE_COLUMN,
    TRANSACTIONS_COSTS_KEY,
};

/// Where a header column's value lives in a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Lei,
    Notional,
    Rate,
    /// Index into `Record::passthrough`
    Passthrough(usize),
    // Header columns named like an enrichment key; enrichment overwrites them
    LegalName,
    Bic,
    TransactionsCosts,
}

/// One transaction row, as read from the input file and later enriched.
///
/// The recognized columns get named fields; every other header column is kept
/// verbatim in `passthrough`. `columns` holds the header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub lei: Option<String>,
    pub notional: Option<String>,
    pub rate: Option<String>,
    /// Unrecognized columns; `None` when the row was shorter than the header
    pub passthrough: Vec<(String, Option<String>)>,
    /// Fields beyond the header width
    pub overflow: Vec<String>,
    pub columns: Vec<Column>,

    pub legal_name: Option<String>,
    pub bic: Vec<String>,
    pub transactions_costs: Option<String>,
}

impl Record {
    /// Value of a column by header name, recognized or not.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            LEI_COLUMN => self.lei.as_deref(),
            NOTIONAL_COLUMN => self.notional.as_deref(),
            RATE_COLUMN => self.rate.as_deref(),
            other => self
                .passthrough
                .iter()
                .find(|(key, _)| key == other)
                .and_then(|(_, value)| value.as_deref()),
        }
    }

    /// Reset the enrichment fields to their "nothing known" values.
    pub fn clear_enrichment(&mut self) {
        self.legal_name = None;
        self.bic = Vec::new();
        self.transactions_costs = None;
    }
}

impl Serialize for Record {
    /// Header columns in header order, then `_overflow` and any enrichment
    /// key the header did not already place.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let (mut legal_name_done, mut bic_done, mut costs_done) = (false, false, false);

        for column in &self.columns {
            match *column {
                Column::Lei => map.serialize_entry(LEI_COLUMN, &self.lei)?,
                Column::Notional => map.serialize_entry(NOTIONAL_COLUMN, &self.notional)?,
                Column::Rate => map.serialize_entry(RATE_COLUMN, &self.rate)?,
                Column::Passthrough(index) => {
                    let Some((key, value)) = self.passthrough.get(index) else {
                        continue;
                    };
                    // The synthetic overflow list takes the key when present
                    if key == OVERFLOW_KEY && !self.overflow.is_empty() {
                        continue;
                    }
                    map.serialize_entry(key, value)?;
                }
                Column::LegalName => {
                    map.serialize_entry(LEGAL_NAME_KEY, &self.legal_name)?;
                    legal_name_done = true;
                }
                Column::Bic => {
                    map.serialize_entry(BIC_KEY, &self.bic)?;
                    bic_done = true;
                }
                Column::TransactionsCosts => {
                    map.serialize_entry(TRANSACTIONS_COSTS_KEY, &self.transactions_costs)?;
                    costs_done = true;
                }
            }
        }

        if !self.overflow.is_empty() {
            map.serialize_entry(OVERFLOW_KEY, &self.overflow)?;
        }
        if !legal_name_done {
            map.serialize_entry(LEGAL_NAME_KEY, &self.legal_name)?;
        }
        if !bic_done {
            map.serialize_entry(BIC_KEY, &self.bic)?;
        }
        if !costs_done {
            map.serialize_entry(TRANSACTIONS_COSTS_KEY, &self.transactions_costs)?;
        }
        map.end()
    }
}

/// Legal-entity reference data returned by the registry for one LEI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityReference {
    pub legal_name: Option<String>,
    pub bic: Vec<String>,
    pub legal_address_country: Option<String>,
}

/// Why a registry lookup could not be completed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFailure {
    #[error("timeout")]
    Timeout,

    #[error("connection-refused")]
    ConnectionRefused,

    #[error("http-status-error ({0})")]
    HttpStatus(u16),

    #[error("decode-error")]
    Decode,

    #[error("transport-error")]
    Transport,
}

impl LookupFailure {
    /// Stable label used for metrics and structured logs.
    pub fn category(&self) -> &'static str {
        match self {
            LookupFailure::Timeout => "timeout",
            LookupFailure::ConnectionRefused => "connection-refused",
            LookupFailure::HttpStatus(_) => "http-status-error",
            LookupFailure::Decode => "decode-error",
            LookupFailure::Transport => "transport-error",
        }
    }
}

/// A recoverable, per-record problem. Collected for the batch; never aborts it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("registry not reachable for {lei}: {failure}")]
    RegistryUnreachable { lei: String, failure: LookupFailure },

    #[error("Could not compute transactions_costs for {lei}; rate is 0")]
    NonComputableCost { lei: String },
}

/// Wire shape returned to callers of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichResponse {
    pub message: String,
    pub data: Vec<Record>,
}
