use std::sync::Arc;

use crate::feed::{DataFeed, RefreshOutcome, SeriesSource};
use crate::mission::{FeedbackSubmission, MissionLogEntry, MissionLogStore};
use crate::persistence::StateBackend;
use crate::prelude::CoreResult;
use crate::profile::{UnitProfile, UnitProfileStore};
use crate::risk::{evaluate, RiskView};
use crate::tabular::Measurement;

/// Entry point for presentation code: three reads, three writes.
pub struct Dashboard {
    profiles: UnitProfileStore,
    missions: MissionLogStore,
    feed: Arc<DataFeed>,
}

impl Dashboard {
    /// Loads both stores from `backend` and attaches a feed over `source`.
    /// The feed starts empty until the first refresh.
    pub fn open(backend: Arc<dyn StateBackend>, source: Arc<dyn SeriesSource>) -> Self {
        Self {
            profiles: UnitProfileStore::load(Arc::clone(&backend)),
            missions: MissionLogStore::load(backend),
            feed: Arc::new(DataFeed::new(source)),
        }
    }

    pub fn get_profile(&self) -> UnitProfile {
        self.profiles.profile().clone()
    }

    pub fn get_risk_view(&self, series: &[Measurement], profile: &UnitProfile) -> RiskView {
        evaluate(series, profile)
    }

    /// Risk view over the held series and committed profile.
    pub fn current_risk_view(&self) -> RiskView {
        evaluate(&self.feed.series(), self.profiles.profile())
    }

    /// Mission log, newest first.
    pub fn get_logs(&self) -> Vec<MissionLogEntry> {
        self.missions.list()
    }

    pub fn save_profile(&mut self, profile: UnitProfile) -> CoreResult<()> {
        self.profiles.replace(profile)
    }

    pub fn append_log(&mut self, submission: FeedbackSubmission) -> CoreResult<MissionLogEntry> {
        self.missions.append(submission)
    }

    pub async fn refresh_series(&self) -> RefreshOutcome {
        self.feed.refresh().await
    }

    pub fn profiles(&self) -> &UnitProfileStore {
        &self.profiles
    }

    pub fn profiles_mut(&mut self) -> &mut UnitProfileStore {
        &mut self.profiles
    }

    /// Shared handle to the feed, for spawning its refresh loop or awaiting a
    /// refresh without holding the dashboard.
    pub fn feed(&self) -> Arc<DataFeed> {
        Arc::clone(&self.feed)
    }
}
