//! Weapon runtime interface
//!
//! The weapon runtime (ballistics, firing, view models) lives outside this
//! crate. The sync bridge talks to it through this trait and pushes the
//! whole loadout in one batch so the runtime never sees a half-updated set.

use crate::items::definition::{DefId, EquipSlot};
use crate::items::instance::InstanceId;

/// The three weapon-bearing equipment slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponSlot {
    Primary,
    Secondary,
    Holster,
}

impl WeaponSlot {
    pub fn all() -> &'static [WeaponSlot] {
        &[WeaponSlot::Primary, WeaponSlot::Secondary, WeaponSlot::Holster]
    }

    /// The equipment slot backing this weapon slot
    pub fn equip_slot(&self) -> EquipSlot {
        match self {
            WeaponSlot::Primary => EquipSlot::PrimaryWeapon,
            WeaponSlot::Secondary => EquipSlot::SecondaryWeapon,
            WeaponSlot::Holster => EquipSlot::Holster,
        }
    }

    pub fn from_equip_slot(slot: EquipSlot) -> Option<WeaponSlot> {
        match slot {
            EquipSlot::PrimaryWeapon => Some(WeaponSlot::Primary),
            EquipSlot::SecondaryWeapon => Some(WeaponSlot::Secondary),
            EquipSlot::Holster => Some(WeaponSlot::Holster),
            _ => None,
        }
    }
}

/// One equipped weapon as the runtime sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponRuntimeState {
    pub slot: WeaponSlot,
    pub def_id: DefId,
    pub instance: InstanceId,
    pub ammo: u32,
}

/// External weapon runtime collaborator
pub trait WeaponRuntime {
    /// The loadout the runtime currently reports
    fn equipped_weapons(&self) -> Vec<WeaponRuntimeState>;

    /// Replace the runtime's loadout wholesale
    fn push_equipped_weapons(&mut self, loadout: &[WeaponRuntimeState]);

    /// Update the ammo count of one weapon
    fn set_ammo(&mut self, slot: WeaponSlot, ammo: u32);
}
