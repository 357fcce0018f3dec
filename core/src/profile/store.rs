use std::sync::Arc;

use crate::persistence::{load_json, store_json, StateBackend, PROFILE_KEY};
use crate::prelude::CoreResult;
use crate::profile::draft::ProfileDraft;
use crate::profile::model::UnitProfile;
use crate::telemetry::LogManager;

/// Owns the committed unit profile and its persisted copy.
pub struct UnitProfileStore {
    backend: Arc<dyn StateBackend>,
    committed: UnitProfile,
    logger: LogManager,
}

impl UnitProfileStore {
    /// Loads the persisted profile, falling back to the built-in default when
    /// nothing is stored or the stored record cannot be used.
    pub fn load(backend: Arc<dyn StateBackend>) -> Self {
        let logger = LogManager::new("profile");
        let loaded = match load_json::<UnitProfile>(backend.as_ref(), PROFILE_KEY) {
            Ok(Some(profile)) => match profile.validate() {
                Ok(()) => Some(profile),
                Err(err) => {
                    logger.warn(&format!("stored profile rejected, using defaults: {}", err));
                    None
                }
            },
            Ok(None) => {
                logger.detail("no stored profile, using defaults");
                None
            }
            Err(err) => {
                logger.warn(&format!("stored profile unreadable, using defaults: {}", err));
                None
            }
        };

        let store = Self {
            backend,
            committed: loaded.clone().unwrap_or_default(),
            logger,
        };
        if loaded.is_none() {
            store.persist();
        }
        store
    }

    pub fn profile(&self) -> &UnitProfile {
        &self.committed
    }

    /// Validates and swaps in a whole new profile, then persists it.
    pub fn replace(&mut self, profile: UnitProfile) -> CoreResult<()> {
        profile.validate()?;
        self.committed = profile;
        self.persist();
        self.logger.record(&format!(
            "profile saved: {} ({} equipment, threshold {:.1})",
            self.committed.unit_name,
            self.committed.equipment.len(),
            self.committed.default_threshold
        ));
        Ok(())
    }

    /// Opens a working copy of the committed profile.
    pub fn edit(&self) -> ProfileDraft {
        ProfileDraft::new(self.committed.clone())
    }

    pub fn commit(&mut self, draft: ProfileDraft) -> CoreResult<()> {
        self.replace(draft.into_profile())
    }

    // best-effort: a failed write leaves the in-memory profile authoritative
    fn persist(&self) {
        if let Err(err) = store_json(self.backend.as_ref(), PROFILE_KEY, &self.committed) {
            self.logger.warn(&format!("failed to persist profile: {}", err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::{FeedbackSubmission, ImpactLevel, MissionLogStore};
    use crate::persistence::MemoryBackend;
    use crate::prelude::CoreError;
    use crate::profile::draft::EquipmentField;
    use crate::profile::model::Equipment;

    fn memory() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new())
    }

    #[test]
    fn first_load_uses_and_persists_defaults() {
        let backend = memory();
        let store = UnitProfileStore::load(backend.clone());
        assert_eq!(store.profile(), &UnitProfile::default());
        assert!(backend.record(PROFILE_KEY).is_some());
    }

    #[test]
    fn corrupt_record_falls_back_to_defaults() {
        let backend = Arc::new(MemoryBackend::with_record(PROFILE_KEY, "{\"unitName\": 3"));
        let store = UnitProfileStore::load(backend);
        assert_eq!(store.profile(), &UnitProfile::default());
    }

    #[test]
    fn corrupt_profile_leaves_mission_log_intact() {
        let backend = memory();
        let mut logs = MissionLogStore::load(backend.clone());
        logs.append(FeedbackSubmission::new("JDAM", ImpactLevel::Danger).at("07:15"))
            .unwrap();
        logs.append(FeedbackSubmission::new("Tactical Data Link", ImpactLevel::Caution).at("07:45"))
            .unwrap();
        backend.write(PROFILE_KEY, "{\"unitName\": [").unwrap();

        let profiles = UnitProfileStore::load(backend.clone());
        assert_eq!(profiles.profile(), &UnitProfile::default());

        let reloaded = MissionLogStore::load(backend);
        assert_eq!(reloaded.entries(), logs.entries());
        assert_eq!(reloaded.list()[0].equipment, "Tactical Data Link");
    }

    #[test]
    fn committed_draft_survives_reload() {
        let backend = memory();
        let mut store = UnitProfileStore::load(backend.clone());

        let mut draft = store.edit();
        draft.set_unit_name("Test Wing");
        let id = draft.add_equipment();
        draft
            .update_equipment_field(id, EquipmentField::Sensitivity, "7.5")
            .unwrap();
        store.commit(draft).unwrap();

        let reloaded = UnitProfileStore::load(backend);
        assert_eq!(reloaded.profile().unit_name, "Test Wing");
        assert_eq!(reloaded.profile().equipment(id).unwrap().sensitivity, 7.5);
    }

    #[test]
    fn discarded_draft_leaves_profile_untouched() {
        let mut store = UnitProfileStore::load(memory());
        {
            let mut draft = store.edit();
            draft.remove_equipment(1).unwrap();
            draft.set_default_threshold(8.0);
        }
        assert_eq!(store.profile(), &UnitProfile::default());

        let draft = store.edit();
        store.commit(draft).unwrap();
        assert_eq!(store.profile(), &UnitProfile::default());
    }

    #[test]
    fn invalid_replacement_is_rejected_without_mutation() {
        let backend = memory();
        let mut store = UnitProfileStore::load(backend.clone());
        let before = backend.record(PROFILE_KEY);

        let mut profile = UnitProfile::default();
        profile.equipment.push(Equipment::new(2, "duplicate", 5.0));
        assert!(matches!(store.replace(profile), Err(CoreError::Validation(_))));
        assert_eq!(store.profile(), &UnitProfile::default());
        assert_eq!(backend.record(PROFILE_KEY), before);
    }
}
