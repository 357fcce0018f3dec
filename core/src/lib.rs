//! Risk-evaluation and state-persistence core for the Kp space-weather dashboard.
//!
//! A [`feed::DataFeed`] pulls the planetary K-index table, [`tabular`] types it,
//! and [`risk`] classifies the unit and each piece of equipment against the
//! [`profile`] thresholds. Operator feedback lands in the append-only
//! [`mission`] log. Both stores persist through a [`persistence::StateBackend`].

pub mod dashboard;
pub mod feed;
pub mod mission;
pub mod persistence;
pub mod prelude;
pub mod profile;
pub mod risk;
pub mod tabular;
pub mod telemetry;

pub use dashboard::Dashboard;
pub use prelude::{CoreError, CoreResult};
