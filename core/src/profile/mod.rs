pub mod draft;
pub mod model;
pub mod store;

pub use draft::{EquipmentField, ProfileDraft};
pub use model::{Equipment, UnitProfile};
pub use store::UnitProfileStore;
