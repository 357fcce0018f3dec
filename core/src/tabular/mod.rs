pub mod measurement;
pub mod parser;

pub use measurement::{measurements, Measurement, KP_COLUMN, TIME_COLUMN};
pub use parser::{parse, parse_table, FieldValue, Record, Table};
