pub mod evaluator;

pub use evaluator::{
    classify, equipment_status, evaluate, max_kp, EquipmentRisk, EquipmentStatus, RiskLevel,
    RiskView, CAUTION_RATIO,
};
