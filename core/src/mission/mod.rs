pub mod model;
pub mod store;

pub use model::{FeedbackSubmission, ImpactLevel, MissionLogEntry};
pub use store::MissionLogStore;
