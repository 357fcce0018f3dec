use crate::prelude::{CoreError, CoreResult};
use crate::profile::model::{Equipment, UnitProfile, NEW_EQUIPMENT_NAME, NEW_EQUIPMENT_SENSITIVITY};

/// Editable equipment attributes on the settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentField {
    Name,
    Sensitivity,
}

/// Working copy of a profile. Nothing here touches the committed profile
/// until the draft is handed back to [`UnitProfileStore::commit`].
///
/// [`UnitProfileStore::commit`]: crate::profile::UnitProfileStore::commit
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDraft {
    profile: UnitProfile,
}

impl ProfileDraft {
    pub fn new(profile: UnitProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &UnitProfile {
        &self.profile
    }

    pub fn set_unit_name(&mut self, name: impl Into<String>) {
        self.profile.unit_name = name.into();
    }

    pub fn set_default_threshold(&mut self, threshold: f64) {
        self.profile.default_threshold = threshold;
    }

    /// Appends a default item and returns its id.
    pub fn add_equipment(&mut self) -> u32 {
        let id = self.profile.next_equipment_id();
        self.profile
            .equipment
            .push(Equipment::new(id, NEW_EQUIPMENT_NAME, NEW_EQUIPMENT_SENSITIVITY));
        id
    }

    pub fn remove_equipment(&mut self, id: u32) -> CoreResult<Equipment> {
        let index = self
            .profile
            .equipment
            .iter()
            .position(|item| item.id == id)
            .ok_or(CoreError::UnknownEquipment(id))?;
        Ok(self.profile.equipment.remove(index))
    }

    /// Applies raw form input to one field of an item.
    pub fn update_equipment_field(
        &mut self,
        id: u32,
        field: EquipmentField,
        value: &str,
    ) -> CoreResult<()> {
        let item = self
            .profile
            .equipment
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CoreError::UnknownEquipment(id))?;

        match field {
            EquipmentField::Name => item.name = value.to_string(),
            EquipmentField::Sensitivity => {
                let sensitivity = value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|kp| kp.is_finite() && *kp > 0.0)
                    .ok_or_else(|| {
                        CoreError::Validation(format!("`{}` is not a positive Kp value", value))
                    })?;
                item.sensitivity = sensitivity;
            }
        }
        Ok(())
    }

    pub fn into_profile(self) -> UnitProfile {
        self.profile
    }
}
