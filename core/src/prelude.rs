/// Common error type for the risk core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("fetch failure: {0}")]
    Fetch(String),
    #[error("parse failure: {0}")]
    Parse(String),
    #[error("persisted state `{key}` is corrupt: {reason}")]
    CorruptState { key: String, reason: String },
    #[error("validation failure: {0}")]
    Validation(String),
    #[error("unknown equipment id {0}")]
    UnknownEquipment(u32),
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Fetch(err.to_string())
    }
}
