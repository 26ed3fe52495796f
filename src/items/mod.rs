//! Item system

pub mod catalog;
pub mod definition;
pub mod instance;

pub use catalog::Catalog;
pub use definition::{DefId, EquipSlot, ItemCategory, ItemDefinition, Rarity};
pub use instance::{GridPos, InstanceId, ItemInstance, Owner};
