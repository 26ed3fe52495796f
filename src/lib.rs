//! Packrat - grid inventory and loadout core
//!
//! Containers are fixed-size occupancy grids; items occupy rotatable
//! rectangular footprints. The orchestrator is the single entry point for
//! mutations (move, swap, equip, stack, split) and guarantees that failed
//! operations leave no trace. The weapon sync bridge keeps the external
//! weapon runtime consistent with the equipped slots.

pub mod data;
pub mod inventory;
pub mod items;
pub mod save;
pub mod tick;
pub mod weapons;

// Re-export commonly used types
pub use inventory::{Container, ContainerId, InventoryError, InventoryEvent, Orchestrator};
pub use items::{Catalog, DefId, EquipSlot, GridPos, InstanceId, ItemCategory, ItemDefinition, ItemInstance, Owner};
pub use weapons::{BridgeState, WeaponRuntime, WeaponRuntimeState, WeaponSlot, WeaponSyncBridge};
