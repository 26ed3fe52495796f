//! Item definitions
//!
//! Static catalog entries: dimensions, category, stacking and equip rules.
//! Definitions are immutable once loaded; live state belongs to
//! `ItemInstance`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Definition identifier (unique string ID, e.g. "mk4_rifle")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefId(pub String);

impl From<&str> for DefId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Get display color RGB
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Rarity::Common => (200, 200, 200),
            Rarity::Uncommon => (100, 255, 100),
            Rarity::Rare => (100, 150, 255),
            Rarity::Epic => (200, 100, 255),
            Rarity::Legendary => (255, 180, 50),
        }
    }

    /// Get rarity name
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }

    /// Get numeric value for sorting (higher = rarer)
    pub fn sort_value(&self) -> u8 {
        match self {
            Rarity::Common => 0,
            Rarity::Uncommon => 1,
            Rarity::Rare => 2,
            Rarity::Epic => 3,
            Rarity::Legendary => 4,
        }
    }
}

/// Main item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Weapon,
    Ammunition,
    Armor,
    Headgear,
    Eyewear,
    Earpiece,
    FaceCover,
    Rig,
    Medicine,
    Food,
    Container,
    Key,
    Armband,
    Misc,
}

impl ItemCategory {
    /// Get sort value for grouping (lower = appears first)
    pub fn sort_value(&self) -> u8 {
        match self {
            ItemCategory::Weapon => 0,
            ItemCategory::Ammunition => 1,
            ItemCategory::Armor => 2,
            ItemCategory::Headgear => 3,
            ItemCategory::Eyewear => 4,
            ItemCategory::Earpiece => 5,
            ItemCategory::FaceCover => 6,
            ItemCategory::Rig => 7,
            ItemCategory::Container => 8,
            ItemCategory::Medicine => 9,
            ItemCategory::Food => 10,
            ItemCategory::Key => 11,
            ItemCategory::Armband => 12,
            ItemCategory::Misc => 13,
        }
    }

    /// Get category name
    pub fn name(&self) -> &'static str {
        match self {
            ItemCategory::Weapon => "Weapon",
            ItemCategory::Ammunition => "Ammunition",
            ItemCategory::Armor => "Armor",
            ItemCategory::Headgear => "Headgear",
            ItemCategory::Eyewear => "Eyewear",
            ItemCategory::Earpiece => "Earpiece",
            ItemCategory::FaceCover => "Face Cover",
            ItemCategory::Rig => "Rig",
            ItemCategory::Medicine => "Medicine",
            ItemCategory::Food => "Food",
            ItemCategory::Container => "Container",
            ItemCategory::Key => "Key",
            ItemCategory::Armband => "Armband",
            ItemCategory::Misc => "Misc",
        }
    }

    /// Check if items of this category are used up on consumption
    pub fn is_consumable(&self) -> bool {
        matches!(self, ItemCategory::Medicine | ItemCategory::Food)
    }
}

/// Equipment slot for wearable items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Head,
    Eyes,
    Ears,
    FaceCover,
    BodyArmor,
    TacticalRig,
    PrimaryWeapon,
    SecondaryWeapon,
    Holster,
    Backpack,
    Pouch,
    Armband,
}

impl EquipSlot {
    pub fn name(&self) -> &'static str {
        match self {
            EquipSlot::Head => "Head",
            EquipSlot::Eyes => "Eyes",
            EquipSlot::Ears => "Ears",
            EquipSlot::FaceCover => "Face Cover",
            EquipSlot::BodyArmor => "Body Armor",
            EquipSlot::TacticalRig => "Tactical Rig",
            EquipSlot::PrimaryWeapon => "Primary Weapon",
            EquipSlot::SecondaryWeapon => "Secondary Weapon",
            EquipSlot::Holster => "Holster",
            EquipSlot::Backpack => "Backpack",
            EquipSlot::Pouch => "Pouch",
            EquipSlot::Armband => "Armband",
        }
    }

    /// Check if this slot holds a weapon
    pub fn is_weapon(&self) -> bool {
        matches!(
            self,
            EquipSlot::PrimaryWeapon | EquipSlot::SecondaryWeapon | EquipSlot::Holster
        )
    }

    /// Get all slots in display order
    pub fn all() -> &'static [EquipSlot] {
        &[
            EquipSlot::Head,
            EquipSlot::Eyes,
            EquipSlot::Ears,
            EquipSlot::FaceCover,
            EquipSlot::BodyArmor,
            EquipSlot::TacticalRig,
            EquipSlot::PrimaryWeapon,
            EquipSlot::SecondaryWeapon,
            EquipSlot::Holster,
            EquipSlot::Backpack,
            EquipSlot::Pouch,
            EquipSlot::Armband,
        ]
    }
}

/// Static item definition (immutable blueprint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique ID
    pub id: DefId,
    /// Display name
    pub name: String,
    /// Description/flavor text
    #[serde(default)]
    pub description: String,
    /// Item category
    pub category: ItemCategory,
    /// Rarity tier
    pub rarity: Rarity,
    /// Grid footprint width in cells
    pub width: u8,
    /// Grid footprint height in cells
    pub height: u8,
    /// Weight per unit (kg)
    pub weight: f32,
    /// Maximum stack size (1 = not stackable)
    pub max_stack: u32,
    /// Whether the footprint can be rotated 90 degrees
    pub rotatable: bool,
    /// Equipment slots this definition may occupy (empty = not equippable)
    #[serde(default)]
    pub equip_slots: Vec<EquipSlot>,
    /// Maximum durability
    pub max_durability: f32,
    /// Magazine size (weapon category only, 0 otherwise)
    #[serde(default)]
    pub magazine_size: u32,
}

impl ItemDefinition {
    /// Create a new definition with sane defaults: 1x1, unstackable, no rotation
    pub fn new(id: impl Into<DefId>, name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            rarity: Rarity::Common,
            width: 1,
            height: 1,
            weight: 0.0,
            max_stack: 1,
            rotatable: false,
            equip_slots: Vec::new(),
            max_durability: 100.0,
            magazine_size: 0,
        }
    }

    /// Set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Set grid footprint
    pub fn with_size(mut self, width: u8, height: u8) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    /// Set weight
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Set rarity
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    /// Set max stack size
    pub fn with_max_stack(mut self, max: u32) -> Self {
        self.max_stack = max.max(1);
        self
    }

    /// Allow 90-degree rotation
    pub fn rotatable(mut self) -> Self {
        self.rotatable = true;
        self
    }

    /// Set compatible equipment slots
    pub fn with_equip_slots(mut self, slots: &[EquipSlot]) -> Self {
        self.equip_slots = slots.to_vec();
        self
    }

    /// Set max durability
    pub fn with_durability(mut self, max: f32) -> Self {
        self.max_durability = max;
        self
    }

    /// Set magazine size (marks ammo capacity for weapons)
    pub fn with_magazine(mut self, size: u32) -> Self {
        self.magazine_size = size;
        self
    }

    /// Check if this definition can stack
    pub fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }

    /// Check if this is a weapon definition
    pub fn is_weapon(&self) -> bool {
        self.category == ItemCategory::Weapon
    }

    /// Check if this definition can be equipped anywhere
    pub fn is_equippable(&self) -> bool {
        !self.equip_slots.is_empty()
    }

    /// Grid footprint (width, height), un-rotated
    pub fn size(&self) -> (u8, u8) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let def = ItemDefinition::new("mk4_rifle", "MK-4 Rifle", ItemCategory::Weapon)
            .with_size(4, 2)
            .rotatable()
            .with_equip_slots(&[EquipSlot::PrimaryWeapon, EquipSlot::SecondaryWeapon])
            .with_magazine(30);

        assert_eq!(def.id, DefId::from("mk4_rifle"));
        assert_eq!(def.size(), (4, 2));
        assert!(def.rotatable);
        assert!(def.is_weapon());
        assert!(def.is_equippable());
        assert!(!def.is_stackable());
        assert_eq!(def.magazine_size, 30);
    }

    #[test]
    fn test_stackable() {
        let def = ItemDefinition::new("ammo_9mm", "9mm Rounds", ItemCategory::Ammunition)
            .with_max_stack(50);
        assert!(def.is_stackable());
        assert!(!def.is_equippable());
    }

    #[test]
    fn test_consumable_categories() {
        assert!(ItemCategory::Medicine.is_consumable());
        assert!(ItemCategory::Food.is_consumable());
        assert!(!ItemCategory::Weapon.is_consumable());
        assert!(!ItemCategory::Key.is_consumable());
    }
}
