//! Weapon runtime synchronization

pub mod runtime;
pub mod sync;

pub use runtime::{WeaponRuntime, WeaponRuntimeState, WeaponSlot};
pub use sync::{derive_loadout, BridgeState, WeaponSyncBridge};
