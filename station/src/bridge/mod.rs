pub mod model;
pub mod routes;

pub use model::DashboardSnapshot;
pub use routes::StationBridge;
