use std::fmt;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::prelude::CoreResult;

/// A single typed cell. Typing is decided per field, so a column may mix
/// numbers and text across rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    /// Padding for columns absent from a short row.
    Missing,
}

impl FieldValue {
    /// Types a trimmed field: finite numbers become `Number`, anything else stays text.
    pub fn from_field(field: &str) -> Self {
        match field.parse::<f64>() {
            Ok(value) if value.is_finite() => FieldValue::Number(value),
            _ => FieldValue::Text(field.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(value) => write!(f, "{}", value),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Missing => Ok(()),
        }
    }
}

/// One data row keyed by header name, in header order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Looks up a column. With duplicate headers the last column wins.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parsed table plus the number of rows whose width differed from the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    pub ragged_rows: usize,
}

/// Parses comma-separated text with a header line into typed records.
///
/// Short rows are padded with [`FieldValue::Missing`], surplus fields on long
/// rows are dropped; both are counted in [`Table::ragged_rows`]. Blank lines
/// are skipped and empty or header-only input yields an empty table.
pub fn parse_table(raw: &str) -> CoreResult<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw.as_bytes());

    let mut rows = reader
        .records()
        .filter(|row| !matches!(row, Ok(record) if is_blank(record)));

    let headers: Vec<String> = match rows.next() {
        Some(row) => row?.iter().map(str::to_string).collect(),
        None => return Ok(Table::default()),
    };

    let mut records = Vec::new();
    let mut ragged_rows = 0;
    for row in rows {
        let row = row?;
        if row.len() != headers.len() {
            ragged_rows += 1;
        }
        let record = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let value = row
                    .get(index)
                    .map(FieldValue::from_field)
                    .unwrap_or(FieldValue::Missing);
                (header.clone(), value)
            })
            .collect();
        records.push(record);
    }

    Ok(Table {
        headers,
        records,
        ragged_rows,
    })
}

/// Record-only view of [`parse_table`].
pub fn parse(raw: &str) -> CoreResult<Vec<Record>> {
    parse_table(raw).map(|table| table.records)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}
