use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::prelude::{CoreError, CoreResult};

/// Impact an operator observed on a piece of equipment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    #[default]
    Normal,
    Caution,
    Danger,
}

/// Stored feedback event. Entries are never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionLogEntry {
    /// Creation time in epoch milliseconds, unique within the log.
    pub id: i64,
    /// Operation time as `HH:MM`.
    pub time: String,
    /// Equipment name as typed at submission; not tied to profile ids.
    pub equipment: String,
    pub impact_level: ImpactLevel,
}

/// Operator input before it becomes a [`MissionLogEntry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedbackSubmission {
    /// `HH:MM`; the current local time is used when absent.
    pub time: Option<String>,
    pub equipment: String,
    pub impact_level: ImpactLevel,
}

impl FeedbackSubmission {
    pub fn new(equipment: impl Into<String>, impact_level: ImpactLevel) -> Self {
        Self {
            time: None,
            equipment: equipment.into(),
            impact_level,
        }
    }

    pub fn at(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    /// Checks the submission and resolves its time label.
    pub(crate) fn validated_time(&self) -> CoreResult<String> {
        if self.equipment.trim().is_empty() {
            return Err(CoreError::Validation("no equipment selected".into()));
        }
        match &self.time {
            Some(time) => {
                let well_formed =
                    time.len() == 5 && NaiveTime::parse_from_str(time, "%H:%M").is_ok();
                if well_formed {
                    Ok(time.clone())
                } else {
                    Err(CoreError::Validation(format!(
                        "time `{}` is not HH:MM",
                        time
                    )))
                }
            }
            None => Ok(Local::now().format("%H:%M").to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_equipment_is_rejected() {
        let submission = FeedbackSubmission::new("  ", ImpactLevel::Danger);
        assert!(matches!(
            submission.validated_time(),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn time_must_be_hh_mm() {
        let base = FeedbackSubmission::new("JDAM", ImpactLevel::Caution);
        assert_eq!(base.clone().at("07:45").validated_time().unwrap(), "07:45");
        assert!(base.clone().at("7:45").validated_time().is_err());
        assert!(base.clone().at("25:00").validated_time().is_err());
        assert!(base.at("noon").validated_time().is_err());
    }

    #[test]
    fn missing_time_defaults_to_now() {
        let time = FeedbackSubmission::new("JDAM", ImpactLevel::Normal)
            .validated_time()
            .unwrap();
        assert_eq!(time.len(), 5);
        assert_eq!(&time[2..3], ":");
    }

    #[test]
    fn submission_json_defaults_impact_to_normal() {
        let submission: FeedbackSubmission =
            serde_json::from_str(r#"{"equipment": "JDAM", "time": "10:00"}"#).unwrap();
        assert_eq!(submission.impact_level, ImpactLevel::Normal);

        let entry = MissionLogEntry {
            id: 1,
            time: "10:00".into(),
            equipment: "JDAM".into(),
            impact_level: ImpactLevel::Danger,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["impactLevel"], "danger");
    }
}
