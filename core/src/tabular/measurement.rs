use std::collections::BTreeMap;

use serde::Serialize;

use crate::prelude::{CoreError, CoreResult};
use crate::tabular::parser::{FieldValue, Record};

pub const TIME_COLUMN: &str = "time";
pub const KP_COLUMN: &str = "kp_index";

/// One Kp sample. Columns other than `time` and `kp_index` ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub time: String,
    pub kp_index: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl Measurement {
    pub fn new(time: impl Into<String>, kp_index: f64) -> Self {
        Self {
            time: time.into(),
            kp_index,
            extra: BTreeMap::new(),
        }
    }
}

impl TryFrom<&Record> for Measurement {
    type Error = CoreError;

    fn try_from(record: &Record) -> CoreResult<Self> {
        let time = match record.get(TIME_COLUMN) {
            Some(value) if !value.is_missing() => value.to_string(),
            _ => return Err(CoreError::Parse(format!("missing `{}` field", TIME_COLUMN))),
        };
        let kp_index = record
            .get(KP_COLUMN)
            .and_then(FieldValue::as_number)
            .ok_or_else(|| CoreError::Parse(format!("`{}` is not numeric", KP_COLUMN)))?;

        let extra = record
            .columns()
            .filter(|(name, _)| *name != TIME_COLUMN && *name != KP_COLUMN)
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();

        Ok(Self {
            time,
            kp_index,
            extra,
        })
    }
}

/// Converts parsed records into measurements, failing on the first unusable row.
pub fn measurements(records: &[Record]) -> CoreResult<Vec<Measurement>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Measurement::try_from(record).map_err(|err| match err {
                CoreError::Parse(reason) => CoreError::Parse(format!("row {}: {}", index + 1, reason)),
                other => other,
            })
        })
        .collect()
}
