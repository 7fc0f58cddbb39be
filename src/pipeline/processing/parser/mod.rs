use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use tracing::debug;

use crate::constants::{
    BIC_KEY, LEGAL_NAME_KEY, LEI_COLUMN, NOTIONAL_COLUMN, RATE_COLUMN, TRANSACTIONS_COSTS_KEY,
};
use crate::error::Result;
use crate::observability::metrics;
use crate::types::{Column, Record};

/// Lazily maps the data rows of a CSV payload onto [`Record`]s.
///
/// Rows shorter than the header leave the missing columns absent; rows wider
/// than the header keep the surplus values in `Record::overflow`.
pub struct RecordReader<'a> {
    headers: StringRecord,
    rows: StringRecordsIntoIter<&'a [u8]>,
}

/// Validate `bytes` as UTF-8 and open a reader over its rows.
///
/// Decoding is checked up front so that a bad file fails before any record
/// is produced.
pub fn parse_records(bytes: &[u8]) -> Result<RecordReader<'_>> {
    std::str::from_utf8(bytes)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(true)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();
    debug!(columns = headers.len(), bytes = bytes.len(), "opened CSV payload");

    Ok(RecordReader {
        headers,
        rows: reader.into_records(),
    })
}

impl RecordReader<'_> {
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };
        metrics::parser::record_parsed();
        Some(Ok(map_row(&self.headers, &row)))
    }
}

fn map_row(headers: &StringRecord, row: &StringRecord) -> Record {
    let mut record = Record::default();

    for (index, name) in headers.iter().enumerate() {
        let value = row.get(index).map(str::to_string);
        let column = match name {
            LEI_COLUMN => {
                record.lei = value;
                Column::Lei
            }
            NOTIONAL_COLUMN => {
                record.notional = value;
                Column::Notional
            }
            RATE_COLUMN => {
                record.rate = value;
                Column::Rate
            }
            // Enrichment owns these keys; the input value is dropped
            LEGAL_NAME_KEY => Column::LegalName,
            BIC_KEY => Column::Bic,
            TRANSACTIONS_COSTS_KEY => Column::TransactionsCosts,
            other => match record.passthrough.iter().position(|(key, _)| key == other) {
                Some(existing) => {
                    record.passthrough[existing].1 = value;
                    Column::Passthrough(existing)
                }
                None => {
                    record.passthrough.push((other.to_string(), value));
                    Column::Passthrough(record.passthrough.len() - 1)
                }
            },
        };
        // A repeated header keeps its first position and its last value
        if !record.columns.contains(&column) {
            record.columns.push(column);
        }
    }

    if row.len() > headers.len() {
        record.overflow = row.iter().skip(headers.len()).map(str::to_string).collect();
    }

    record
}
