//! Reversible mapping between the on-disk delimited text store and an
//! in-memory [`RecordSet`].
//!
//! The store is a header row of field names followed by one row per
//! record. Field order is fixed across the whole file and derives from
//! the first record written. Appending never re-emits the header and
//! never disturbs existing bytes; a full rewrite is never performed.

use std::io::{Read, Write};

use vantage_types::{DATETIME_FIELD, Record, RecordSet, datetime};

use crate::error::{Error, Result};

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Parse a persisted store into a record collection.
///
/// An empty stream yields an empty collection. Fails with
/// [`Error::Malformed`] when a row has the wrong field count, lacks the
/// `Datetime` column, or carries an unparsable timestamp.
pub fn load<R: Read>(reader: R, delimiter: u8) -> Result<RecordSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(false)
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut set = RecordSet::new();

    for (idx, row) in rdr.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                if let csv::ErrorKind::UnequalLengths { expected_len, len, .. } = e.kind() {
                    return Err(Error::malformed(
                        line,
                        format!("expected {} fields, got {}", expected_len, len),
                    ));
                }
                return Err(Error::Csv(e));
            }
        };

        let mut record = Record::new();
        for (name, value) in headers.iter().zip(row.iter()) {
            record.set(name, value);
        }

        let timestamp = record
            .get(DATETIME_FIELD)
            .ok_or_else(|| Error::malformed(line, format!("no {} column", DATETIME_FIELD)))?;
        datetime::parse_seconds(timestamp)
            .map_err(|e| Error::malformed(line, e.to_string()))?;

        set.append(record);
    }

    Ok(set)
}

/// Serialize a collection onto a stream, optionally with a header row
/// first.
///
/// Every row must carry exactly the fields of the first record, in the
/// same order; a record missing one of those fields (or carrying an
/// extra one) fails with a field-not-found error before anything is
/// written for it. Values containing the delimiter, quotes, or newlines
/// are quoted per CSV convention.
pub fn append<W: Write>(
    writer: W,
    records: &RecordSet,
    include_header: bool,
    delimiter: u8,
) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let header: Vec<&str> = first.field_names().collect();

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(writer);

    if include_header {
        wtr.write_record(&header)?;
    }

    for record in records {
        if record.len() != header.len() {
            // Name the header field the record lacks; failing that, the
            // extra field the header has no column for.
            let odd = header
                .iter()
                .copied()
                .find(|name| record.get(name).is_none())
                .or_else(|| record.field_names().find(|name| !header.contains(name)))
                .unwrap_or(DATETIME_FIELD);
            return Err(vantage_types::ParseError::field_not_found(odd).into());
        }
        let mut row = Vec::with_capacity(header.len());
        for name in &header {
            row.push(
                record
                    .get(name)
                    .ok_or_else(|| vantage_types::ParseError::field_not_found(*name))?,
            );
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Serialize a collection to delimited text in memory.
pub fn to_string(records: &RecordSet, include_header: bool, delimiter: u8) -> Result<String> {
    let mut buf = Vec::new();
    append(&mut buf, records, include_header, delimiter)?;
    Ok(String::from_utf8(buf).expect("CSV output is UTF-8"))
}
