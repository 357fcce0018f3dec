pub mod data_feed;
pub mod source;

pub use data_feed::{DataFeed, FeedHandle, RefreshOutcome, DEFAULT_REFRESH_PERIOD};
pub use source::{source_for, FileSource, HttpSource, SeriesSource, DEFAULT_RESOURCE_PATH};
