use kpcore::mission::MissionLogEntry;
use kpcore::risk::RiskView;
use kpcore::telemetry::FeedMetrics;
use kpcore::Dashboard;
use serde::Serialize;

/// Everything the main dashboard screen renders in one payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub unit_name: String,
    pub samples: usize,
    pub risk: RiskView,
    pub recent_logs: Vec<MissionLogEntry>,
}

impl DashboardSnapshot {
    pub fn capture(dashboard: &Dashboard) -> Self {
        Self {
            unit_name: dashboard.get_profile().unit_name,
            samples: dashboard.feed().series().len(),
            risk: dashboard.current_risk_view(),
            recent_logs: dashboard.get_logs(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedStatus {
    pub source: String,
    #[serde(flatten)]
    pub metrics: FeedMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
