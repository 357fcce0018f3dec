use std::sync::Arc;

use chrono::Utc;

use crate::mission::model::{FeedbackSubmission, MissionLogEntry};
use crate::persistence::{load_json, store_json, StateBackend, MISSION_LOG_KEY};
use crate::prelude::CoreResult;
use crate::telemetry::LogManager;

/// Append-only mission feedback log, stored in creation order.
pub struct MissionLogStore {
    backend: Arc<dyn StateBackend>,
    entries: Vec<MissionLogEntry>,
    logger: LogManager,
}

impl MissionLogStore {
    /// Loads the persisted log; an absent or unreadable record yields an empty log.
    pub fn load(backend: Arc<dyn StateBackend>) -> Self {
        let logger = LogManager::new("mission-log");
        let entries = match load_json::<Vec<MissionLogEntry>>(backend.as_ref(), MISSION_LOG_KEY) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(err) => {
                logger.warn(&format!("stored mission log unreadable, starting empty: {}", err));
                Vec::new()
            }
        };
        Self {
            backend,
            entries,
            logger,
        }
    }

    /// Validates the submission, stamps it with a creation id and appends it.
    pub fn append(&mut self, submission: FeedbackSubmission) -> CoreResult<MissionLogEntry> {
        let time = submission.validated_time()?;
        let entry = MissionLogEntry {
            id: self.next_id(Utc::now().timestamp_millis()),
            time,
            equipment: submission.equipment,
            impact_level: submission.impact_level,
        };
        self.entries.push(entry.clone());
        self.persist();
        self.logger.record(&format!(
            "feedback logged: {} {} {:?}",
            entry.time, entry.equipment, entry.impact_level
        ));
        Ok(entry)
    }

    /// Entries in creation order.
    pub fn entries(&self) -> &[MissionLogEntry] {
        &self.entries
    }

    /// Entries newest first.
    pub fn list(&self) -> Vec<MissionLogEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ids must stay strictly increasing even when two appends share a millisecond
    fn next_id(&self, now_millis: i64) -> i64 {
        match self.entries.last() {
            Some(last) if now_millis <= last.id => last.id + 1,
            _ => now_millis,
        }
    }

    fn persist(&self) {
        if let Err(err) = store_json(self.backend.as_ref(), MISSION_LOG_KEY, &self.entries) {
            self.logger.warn(&format!("failed to persist mission log: {}", err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::model::ImpactLevel;
    use crate::persistence::{MemoryBackend, PROFILE_KEY};
    use crate::prelude::CoreError;
    use crate::profile::UnitProfileStore;

    fn submission(equipment: &str, time: &str) -> FeedbackSubmission {
        FeedbackSubmission::new(equipment, ImpactLevel::Caution).at(time)
    }

    #[test]
    fn appends_keep_storage_order_and_reverse_for_display() {
        let mut store = MissionLogStore::load(Arc::new(MemoryBackend::new()));
        let a = store.append(submission("JDAM", "09:00")).unwrap();
        let b = store.append(submission("Tactical Data Link", "09:30")).unwrap();

        assert_eq!(store.entries(), &[a.clone(), b.clone()]);
        assert_eq!(store.list(), vec![b.clone(), a.clone()]);
        assert!(b.id > a.id);
    }

    #[test]
    fn rejected_submission_does_not_mutate_log() {
        let backend = Arc::new(MemoryBackend::new());
        let mut store = MissionLogStore::load(backend.clone());
        let err = store.append(submission("", "09:00")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.is_empty());
        assert!(backend.record(MISSION_LOG_KEY).is_none());
    }

    #[test]
    fn log_is_reloaded_after_restart() {
        let backend = Arc::new(MemoryBackend::new());
        let mut store = MissionLogStore::load(backend.clone());
        for minute in 0..5 {
            store
                .append(submission("JDAM", &format!("10:0{}", minute)))
                .unwrap();
        }

        let reloaded = MissionLogStore::load(backend);
        assert_eq!(reloaded.len(), 5);
        assert_eq!(reloaded.entries(), store.entries());
        let ids: Vec<i64> = reloaded.entries().iter().map(|entry| entry.id).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn next_id_bumps_past_clock_collisions() {
        let mut store = MissionLogStore::load(Arc::new(MemoryBackend::new()));
        store.entries.push(MissionLogEntry {
            id: 1_000,
            time: "00:00".into(),
            equipment: "JDAM".into(),
            impact_level: ImpactLevel::Normal,
        });
        assert_eq!(store.next_id(1_000), 1_001);
        assert_eq!(store.next_id(900), 1_001);
        assert_eq!(store.next_id(2_000), 2_000);
    }

    #[test]
    fn corrupt_log_resets_without_touching_profile() {
        let backend = Arc::new(MemoryBackend::with_record(MISSION_LOG_KEY, "[{\"id\":"));
        let mut profiles = UnitProfileStore::load(backend.clone());
        let mut draft = profiles.edit();
        draft.set_unit_name("Kept Wing");
        profiles.commit(draft).unwrap();

        let logs = MissionLogStore::load(backend.clone());
        assert!(logs.is_empty());
        assert!(backend.record(PROFILE_KEY).unwrap().contains("Kept Wing"));
    }
}
