use crate::bridge::DashboardSnapshot;
use crate::workflow::config::StationConfig;
use anyhow::Context;
use kpcore::feed::{source_for, RefreshOutcome};
use kpcore::persistence::FileBackend;
use kpcore::risk::EquipmentStatus;
use kpcore::Dashboard;
use std::fmt::Write as _;
use std::sync::Arc;

pub struct CycleReport {
    pub outcome: RefreshOutcome,
    pub snapshot: DashboardSnapshot,
}

impl CycleReport {
    /// Plain-text rendering for the terminal.
    pub fn summary(&self) -> String {
        let risk = &self.snapshot.risk;
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.snapshot.unit_name);
        match &self.outcome {
            RefreshOutcome::Loaded { count, .. } => {
                let _ = writeln!(out, "samples: {}", count);
            }
            RefreshOutcome::Failed { reason } => {
                let _ = writeln!(out, "samples: none ({})", reason);
            }
        }
        let _ = writeln!(
            out,
            "overall: {:?} (max Kp {:.1}, threshold {:.1})",
            risk.overall, risk.max_kp, risk.threshold
        );
        for item in &risk.equipment {
            let label = match item.status {
                EquipmentStatus::AtRisk => "AT RISK",
                EquipmentStatus::Normal => "normal",
            };
            let _ = writeln!(
                out,
                "  {:<24} Kp {:.1}  {}",
                item.name, item.sensitivity, label
            );
        }
        let _ = write!(out, "feedback entries: {}", self.snapshot.recent_logs.len());
        out
    }
}

#[derive(Clone)]
pub struct Runner {
    config: StationConfig,
}

impl Runner {
    pub fn new(config: StationConfig) -> Self {
        Self { config }
    }

    pub fn open_dashboard(&self) -> anyhow::Result<Dashboard> {
        let source = source_for(&self.config.source)
            .with_context(|| format!("preparing Kp source {}", self.config.source))?;
        Ok(Dashboard::open(
            Arc::new(FileBackend::new(&self.config.state_dir)),
            source,
        ))
    }

    /// One refresh followed by a full evaluation.
    pub async fn execute(&self, dashboard: &Dashboard) -> CycleReport {
        let outcome = dashboard.refresh_series().await;
        CycleReport {
            outcome,
            snapshot: DashboardSnapshot::capture(dashboard),
        }
    }
}
