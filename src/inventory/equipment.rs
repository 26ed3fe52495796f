//! Equipment registry
//!
//! Fixed mapping of equipment slot to at most one equipped instance, plus
//! the static slot-compatibility table. Pulling items out of containers on
//! equip is the orchestrator's job; the registry only guards slot rules.

use std::collections::HashMap;

use thiserror::Error;

use crate::items::definition::{EquipSlot, ItemCategory, ItemDefinition};
use crate::items::instance::{InstanceId, ItemInstance, Owner};

/// Why an equip was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EquipError {
    #[error("item is not compatible with this slot")]
    Incompatible,
    #[error("slot is already occupied")]
    Occupied,
}

/// Categories a slot accepts. Weapon slots share the Weapon category; the
/// definition's own slot list separates rifles from sidearms.
pub fn compatible_categories(slot: EquipSlot) -> &'static [ItemCategory] {
    match slot {
        EquipSlot::Head => &[ItemCategory::Headgear],
        EquipSlot::Eyes => &[ItemCategory::Eyewear],
        EquipSlot::Ears => &[ItemCategory::Earpiece],
        EquipSlot::FaceCover => &[ItemCategory::FaceCover],
        EquipSlot::BodyArmor => &[ItemCategory::Armor],
        EquipSlot::TacticalRig => &[ItemCategory::Rig],
        EquipSlot::PrimaryWeapon | EquipSlot::SecondaryWeapon | EquipSlot::Holster => {
            &[ItemCategory::Weapon]
        }
        EquipSlot::Backpack | EquipSlot::Pouch => &[ItemCategory::Container],
        EquipSlot::Armband => &[ItemCategory::Armband],
    }
}

/// Definition-level compatibility: the slot's category table must accept
/// the item, the definition must list the slot, and weapon slots only ever
/// take weapon-category items.
pub fn is_compatible(def: &ItemDefinition, slot: EquipSlot) -> bool {
    if slot.is_weapon() && def.category != ItemCategory::Weapon {
        return false;
    }
    compatible_categories(slot).contains(&def.category) && def.equip_slots.contains(&slot)
}

/// Equipment slots and their occupants
#[derive(Debug, Clone, Default)]
pub struct EquipmentRegistry {
    slots: HashMap<EquipSlot, ItemInstance>,
}

impl EquipmentRegistry {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Equip an item. Fails if the definition is incompatible or the slot
    /// is occupied by a different instance; the item is handed back with
    /// the reason.
    pub fn equip(
        &mut self,
        mut item: ItemInstance,
        slot: EquipSlot,
    ) -> Result<(), (ItemInstance, EquipError)> {
        if !is_compatible(item.definition(), slot) {
            return Err((item, EquipError::Incompatible));
        }
        if let Some(occupant) = self.slots.get(&slot) {
            if occupant.id != item.id {
                return Err((item, EquipError::Occupied));
            }
        }
        item.owner = Owner::Slot(slot);
        self.slots.insert(slot, item);
        Ok(())
    }

    /// Clear a slot, returning the previous occupant detached
    pub fn unequip(&mut self, slot: EquipSlot) -> Option<ItemInstance> {
        let mut item = self.slots.remove(&slot)?;
        item.owner = Owner::Detached;
        Some(item)
    }

    /// Get item in a slot
    pub fn get(&self, slot: EquipSlot) -> Option<&ItemInstance> {
        self.slots.get(&slot)
    }

    /// Get mutable reference to item in a slot
    pub fn get_mut(&mut self, slot: EquipSlot) -> Option<&mut ItemInstance> {
        self.slots.get_mut(&slot)
    }

    /// Check if a slot is empty
    pub fn is_empty(&self, slot: EquipSlot) -> bool {
        !self.slots.contains_key(&slot)
    }

    /// Find which slot holds an instance
    pub fn slot_of(&self, id: InstanceId) -> Option<EquipSlot> {
        self.slots
            .iter()
            .find(|(_, item)| item.id == id)
            .map(|(slot, _)| *slot)
    }

    /// All equipped items with their slots, in display order
    pub fn all_equipped(&self) -> impl Iterator<Item = (EquipSlot, &ItemInstance)> {
        EquipSlot::all()
            .iter()
            .filter_map(move |slot| self.slots.get(slot).map(|item| (*slot, item)))
    }

    /// Number of occupied slots
    pub fn equipped_count(&self) -> usize {
        self.slots.len()
    }

    /// Total carried weight of equipped items
    pub fn total_weight(&self) -> f32 {
        self.slots.values().map(|i| i.total_weight()).sum()
    }

    /// Clear all slots, returning the detached occupants
    pub fn clear(&mut self) -> Vec<ItemInstance> {
        self.slots
            .drain()
            .map(|(_, mut item)| {
                item.owner = Owner::Detached;
                item
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::definition::ItemDefinition;
    use crate::items::instance::ItemInstance;
    use std::sync::Arc;

    fn helmet(id: InstanceId) -> ItemInstance {
        let def = Arc::new(
            ItemDefinition::new("steel_helmet", "Steel Helmet", ItemCategory::Headgear)
                .with_equip_slots(&[EquipSlot::Head]),
        );
        ItemInstance::new(id, def)
    }

    fn pistol(id: InstanceId) -> ItemInstance {
        let def = Arc::new(
            ItemDefinition::new("p9_pistol", "P9 Pistol", ItemCategory::Weapon)
                .with_equip_slots(&[EquipSlot::Holster])
                .with_magazine(15),
        );
        ItemInstance::new(id, def)
    }

    #[test]
    fn test_equip_and_unequip() {
        let mut reg = EquipmentRegistry::new();
        reg.equip(helmet(1), EquipSlot::Head).unwrap();

        assert!(!reg.is_empty(EquipSlot::Head));
        assert_eq!(reg.get(EquipSlot::Head).unwrap().id, 1);
        assert_eq!(reg.get(EquipSlot::Head).unwrap().owner, Owner::Slot(EquipSlot::Head));

        let removed = reg.unequip(EquipSlot::Head).unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(removed.owner, Owner::Detached);
        assert!(reg.is_empty(EquipSlot::Head));
    }

    #[test]
    fn test_incompatible_category_rejected() {
        let mut reg = EquipmentRegistry::new();
        let (item, err) = reg.equip(helmet(1), EquipSlot::BodyArmor).unwrap_err();
        assert_eq!(err, EquipError::Incompatible);
        assert_eq!(item.id, 1);
        assert!(reg.is_empty(EquipSlot::BodyArmor));
    }

    #[test]
    fn test_weapon_slot_requires_listed_slot() {
        let mut reg = EquipmentRegistry::new();
        // A holster pistol does not go in the primary slot even though both
        // are weapon slots
        let (_, err) = reg.equip(pistol(1), EquipSlot::PrimaryWeapon).unwrap_err();
        assert_eq!(err, EquipError::Incompatible);

        reg.equip(pistol(2), EquipSlot::Holster).unwrap();
        assert_eq!(reg.get(EquipSlot::Holster).unwrap().id, 2);
    }

    #[test]
    fn test_occupied_slot_rejected() {
        let mut reg = EquipmentRegistry::new();
        reg.equip(helmet(1), EquipSlot::Head).unwrap();

        let (_, err) = reg.equip(helmet(2), EquipSlot::Head).unwrap_err();
        assert_eq!(err, EquipError::Occupied);
        assert_eq!(reg.get(EquipSlot::Head).unwrap().id, 1);
    }

    #[test]
    fn test_slot_of() {
        let mut reg = EquipmentRegistry::new();
        reg.equip(pistol(5), EquipSlot::Holster).unwrap();
        assert_eq!(reg.slot_of(5), Some(EquipSlot::Holster));
        assert_eq!(reg.slot_of(6), None);
    }

    #[test]
    fn test_compatibility_table_is_queryable() {
        assert_eq!(
            compatible_categories(EquipSlot::Backpack),
            &[ItemCategory::Container]
        );
        assert!(compatible_categories(EquipSlot::Holster).contains(&ItemCategory::Weapon));
    }
}
