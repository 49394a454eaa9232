//! Flat archive records and ordered record collections.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::datetime;
use crate::error::{ParseError, ParseResult};

/// Name of the mandatory timestamp field carried by every archive record.
pub const DATETIME_FIELD: &str = "Datetime";

/// One flat timestamped data row.
///
/// A record is a mapping from field name to text value that remembers the
/// order fields were added in. Every record produced by the archive path
/// carries a [`DATETIME_FIELD`] value formatted `YYYY-MM-DD HH:MM:SS`;
/// the remaining fields are instrument-specific and opaque to this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a field value, appending the field if it is new.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Builder-style variant of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Field values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record carries no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The record's `Datetime` value as text.
    pub fn datetime_text(&self) -> ParseResult<&str> {
        self.get(DATETIME_FIELD)
            .ok_or_else(|| ParseError::field_not_found(DATETIME_FIELD))
    }

    /// The record's `Datetime` parsed at second precision.
    pub fn datetime(&self) -> ParseResult<PrimitiveDateTime> {
        datetime::parse_seconds(self.datetime_text()?)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.fields {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
            first = false;
        }
        Ok(())
    }
}

/// An ordered, append-friendly collection of [`Record`]s.
///
/// Insertion order is preserved until a sort is explicitly requested via
/// [`sorted_by`](Self::sorted_by). The collection enforces no uniqueness;
/// deduplication is the caller's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record at the end.
    pub fn append(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// First record, if any.
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Return a new collection sorted by the given field's textual value.
    ///
    /// The sort is stable: records with equal key values keep their relative
    /// order. Ascending unless `reverse` is set. Fails with
    /// [`ParseError::FieldNotFound`] if any record lacks the field.
    pub fn sorted_by(&self, field: &str, reverse: bool) -> ParseResult<RecordSet> {
        for record in &self.records {
            if record.get(field).is_none() {
                return Err(ParseError::field_not_found(field));
            }
        }

        let mut records = self.records.clone();
        records.sort_by(|a, b| {
            // Presence was checked above.
            let ka = a.get(field).unwrap_or_default();
            let kb = b.get(field).unwrap_or_default();
            if reverse { kb.cmp(ka) } else { ka.cmp(kb) }
        });

        Ok(RecordSet { records })
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
