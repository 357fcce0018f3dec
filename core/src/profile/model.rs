use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::prelude::{CoreError, CoreResult};

pub const NEW_EQUIPMENT_NAME: &str = "New Equipment";
pub const NEW_EQUIPMENT_SENSITIVITY: f64 = 5.0;

/// A piece of equipment and the Kp value above which it is at risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: u32,
    pub name: String,
    pub sensitivity: f64,
}

impl Equipment {
    pub fn new(id: u32, name: impl Into<String>, sensitivity: f64) -> Self {
        Self {
            id,
            name: name.into(),
            sensitivity,
        }
    }
}

/// Unit identity, unit-wide Kp threshold and equipment inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitProfile {
    pub unit_name: String,
    pub default_threshold: f64,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
}

impl Default for UnitProfile {
    fn default() -> Self {
        Self {
            unit_name: "17th Fighter Wing".into(),
            default_threshold: 4.0,
            equipment: vec![
                Equipment::new(1, "JDAM", 5.0),
                Equipment::new(2, "Recon Drone (Type A)", 6.0),
                Equipment::new(3, "Tactical Data Link", 4.0),
            ],
        }
    }
}

impl UnitProfile {
    /// Next id for an added item: one past the highest id, or 1 for an empty list.
    ///
    /// Only safe with a single editor; concurrent drafts can allocate the same id.
    pub fn next_equipment_id(&self) -> u32 {
        self.equipment
            .iter()
            .map(|item| item.id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    pub fn equipment(&self, id: u32) -> Option<&Equipment> {
        self.equipment.iter().find(|item| item.id == id)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !self.default_threshold.is_finite() || self.default_threshold < 0.0 {
            return Err(CoreError::Validation(format!(
                "threshold must be a finite non-negative Kp value, got {}",
                self.default_threshold
            )));
        }

        let mut seen = HashSet::new();
        for item in &self.equipment {
            if !seen.insert(item.id) {
                return Err(CoreError::Validation(format!(
                    "duplicate equipment id {}",
                    item.id
                )));
            }
            if !item.sensitivity.is_finite() || item.sensitivity <= 0.0 {
                return Err(CoreError::Validation(format!(
                    "equipment {} sensitivity must be positive, got {}",
                    item.id, item.sensitivity
                )));
            }
        }
        Ok(())
    }
}
