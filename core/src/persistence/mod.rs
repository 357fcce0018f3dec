pub mod backend;

pub use backend::{load_json, store_json, FileBackend, MemoryBackend, StateBackend};

/// Key of the persisted unit profile record.
pub const PROFILE_KEY: &str = "unitProfile";
/// Key of the persisted mission log record.
pub const MISSION_LOG_KEY: &str = "missionLogs";
