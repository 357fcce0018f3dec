use serde::Serialize;

use crate::profile::UnitProfile;
use crate::tabular::Measurement;

/// Fraction of the unit threshold above which the overall status turns to caution.
pub const CAUTION_RATIO: f64 = 0.7;

/// Unit-wide classification of the current series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Normal,
    Caution,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentStatus {
    Normal,
    AtRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentRisk {
    pub id: u32,
    pub name: String,
    pub sensitivity: f64,
    pub status: EquipmentStatus,
}

/// Derived view handed to presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskView {
    pub max_kp: f64,
    pub threshold: f64,
    pub overall: RiskLevel,
    pub equipment: Vec<EquipmentRisk>,
}

impl RiskView {
    pub fn at_risk(&self) -> impl Iterator<Item = &EquipmentRisk> {
        self.equipment
            .iter()
            .filter(|item| item.status == EquipmentStatus::AtRisk)
    }
}

/// Highest Kp in the series, `0.0` when the series is empty.
pub fn max_kp(series: &[Measurement]) -> f64 {
    series
        .iter()
        .map(|sample| sample.kp_index)
        .fold(None, |peak: Option<f64>, kp| Some(peak.map_or(kp, |p| p.max(kp))))
        .unwrap_or(0.0)
}

/// Strict comparisons: a Kp exactly at a bound does not cross it.
pub fn classify(max_kp: f64, threshold: f64) -> RiskLevel {
    if max_kp > threshold {
        RiskLevel::Danger
    } else if max_kp > threshold * CAUTION_RATIO {
        RiskLevel::Caution
    } else {
        RiskLevel::Normal
    }
}

pub fn equipment_status(max_kp: f64, sensitivity: f64) -> EquipmentStatus {
    if max_kp > sensitivity {
        EquipmentStatus::AtRisk
    } else {
        EquipmentStatus::Normal
    }
}

pub fn evaluate(series: &[Measurement], profile: &UnitProfile) -> RiskView {
    let peak = max_kp(series);
    let equipment = profile
        .equipment
        .iter()
        .map(|item| EquipmentRisk {
            id: item.id,
            name: item.name.clone(),
            sensitivity: item.sensitivity,
            status: equipment_status(peak, item.sensitivity),
        })
        .collect();

    RiskView {
        max_kp: peak,
        threshold: profile.default_threshold,
        overall: classify(peak, profile.default_threshold),
        equipment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Equipment;

    fn series(values: &[f64]) -> Vec<Measurement> {
        values
            .iter()
            .enumerate()
            .map(|(index, kp)| Measurement::new(format!("{:02}:00", index * 3), *kp))
            .collect()
    }

    fn profile(threshold: f64, sensitivities: &[f64]) -> UnitProfile {
        UnitProfile {
            unit_name: "test".into(),
            default_threshold: threshold,
            equipment: sensitivities
                .iter()
                .enumerate()
                .map(|(index, s)| Equipment::new(index as u32 + 1, format!("eq-{}", index), *s))
                .collect(),
        }
    }

    #[test]
    fn empty_series_is_normal_for_any_threshold() {
        for threshold in [0.0, 0.5, 4.0, 9.0] {
            let view = evaluate(&[], &profile(threshold, &[1.0]));
            assert_eq!(view.max_kp, 0.0);
            assert_eq!(view.overall, RiskLevel::Normal);
            assert_eq!(view.equipment[0].status, EquipmentStatus::Normal);
        }
    }

    #[test]
    fn threshold_bounds_are_strict() {
        for threshold in [1.0, 3.0, 4.0, 7.5] {
            assert_ne!(classify(threshold, threshold), RiskLevel::Danger);
            assert_eq!(classify(threshold * 1.000001, threshold), RiskLevel::Danger);
            assert_eq!(
                classify(threshold * CAUTION_RATIO, threshold),
                RiskLevel::Normal
            );
        }
        assert_eq!(equipment_status(5.0, 5.0), EquipmentStatus::Normal);
    }

    #[test]
    fn tiers_follow_priority_order() {
        assert_eq!(classify(2.0, 4.0), RiskLevel::Normal);
        assert_eq!(classify(3.0, 4.0), RiskLevel::Caution);
        assert_eq!(classify(4.0, 4.0), RiskLevel::Caution);
        assert_eq!(classify(4.5, 4.0), RiskLevel::Danger);
    }

    #[test]
    fn at_risk_flag_is_monotonic_in_max_kp() {
        let sensitivity = 5.0;
        let mut flagged = false;
        for step in 0..=90 {
            let status = equipment_status(step as f64 / 10.0, sensitivity);
            if flagged {
                assert_eq!(status, EquipmentStatus::AtRisk);
            }
            flagged = status == EquipmentStatus::AtRisk;
        }
        assert!(flagged);
    }

    #[test]
    fn storm_scenario_flags_only_sensitive_equipment() {
        let view = evaluate(&series(&[1.0, 3.7, 5.2, 4.0]), &profile(4.0, &[6.0, 5.0]));
        assert_eq!(view.max_kp, 5.2);
        assert_eq!(view.overall, RiskLevel::Danger);
        assert_eq!(view.equipment[0].status, EquipmentStatus::Normal);
        assert_eq!(view.equipment[1].status, EquipmentStatus::AtRisk);
        assert_eq!(view.at_risk().count(), 1);
    }

    #[test]
    fn evaluation_does_not_touch_inputs() {
        let samples = series(&[2.0, 6.0]);
        let unit = profile(4.0, &[3.0]);
        let before = (samples.clone(), unit.clone());
        let _ = evaluate(&samples, &unit);
        assert_eq!((samples, unit), before);
    }

    #[test]
    fn risk_view_serializes_status_labels() {
        let view = evaluate(&series(&[6.0]), &profile(4.0, &[5.0]));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["overall"], "danger");
        assert_eq!(json["equipment"][0]["status"], "at-risk");
    }
}
