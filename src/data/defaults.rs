//! Built-in item definitions
//!
//! Used when no external data files are present; also the source for
//! `export_default_data`.

use crate::items::definition::{EquipSlot, ItemCategory, ItemDefinition, Rarity};

/// The default item catalog
pub fn default_definitions() -> Vec<ItemDefinition> {
    vec![
        // Weapons
        ItemDefinition::new("mk4_rifle", "MK-4 Rifle", ItemCategory::Weapon)
            .with_size(4, 2)
            .with_weight(3.6)
            .with_rarity(Rarity::Rare)
            .rotatable()
            .with_equip_slots(&[EquipSlot::PrimaryWeapon, EquipSlot::SecondaryWeapon])
            .with_magazine(30)
            .with_description("Standard-issue assault rifle. Reliable in the dust."),
        ItemDefinition::new("vz_carbine", "VZ Carbine", ItemCategory::Weapon)
            .with_size(3, 2)
            .with_weight(2.9)
            .with_rarity(Rarity::Uncommon)
            .rotatable()
            .with_equip_slots(&[EquipSlot::PrimaryWeapon, EquipSlot::SecondaryWeapon])
            .with_magazine(20)
            .with_description("Short carbine favoured by scavengers."),
        ItemDefinition::new("p9_pistol", "P9 Pistol", ItemCategory::Weapon)
            .with_size(2, 1)
            .with_weight(0.8)
            .rotatable()
            .with_equip_slots(&[EquipSlot::Holster])
            .with_magazine(15)
            .with_description("Compact sidearm. Better than nothing."),
        // Ammunition
        ItemDefinition::new("ammo_545", "5.45mm Rounds", ItemCategory::Ammunition)
            .with_weight(0.01)
            .with_max_stack(60)
            .with_description("Rifle ammunition."),
        ItemDefinition::new("ammo_9mm", "9mm Rounds", ItemCategory::Ammunition)
            .with_weight(0.01)
            .with_max_stack(50)
            .with_description("Pistol ammunition."),
        // Protection
        ItemDefinition::new("steel_helmet", "Steel Helmet", ItemCategory::Headgear)
            .with_size(2, 2)
            .with_weight(1.9)
            .with_equip_slots(&[EquipSlot::Head])
            .with_durability(40.0)
            .with_description("Dented but serviceable."),
        ItemDefinition::new("shaded_goggles", "Shaded Goggles", ItemCategory::Eyewear)
            .with_weight(0.1)
            .with_equip_slots(&[EquipSlot::Eyes])
            .with_durability(10.0),
        ItemDefinition::new("radio_headset", "Radio Headset", ItemCategory::Earpiece)
            .with_size(2, 1)
            .with_weight(0.4)
            .with_equip_slots(&[EquipSlot::Ears])
            .with_durability(20.0),
        ItemDefinition::new("dust_mask", "Dust Mask", ItemCategory::FaceCover)
            .with_weight(0.2)
            .with_equip_slots(&[EquipSlot::FaceCover])
            .with_durability(15.0),
        ItemDefinition::new("flak_vest", "Flak Vest", ItemCategory::Armor)
            .with_size(3, 3)
            .with_weight(6.5)
            .with_rarity(Rarity::Uncommon)
            .with_equip_slots(&[EquipSlot::BodyArmor])
            .with_durability(60.0)
            .with_description("Stops fragments; slows everything else a little."),
        // Carry gear
        ItemDefinition::new("scout_rig", "Scout Rig", ItemCategory::Rig)
            .with_size(3, 3)
            .with_weight(1.2)
            .with_equip_slots(&[EquipSlot::TacticalRig]),
        ItemDefinition::new("field_pack", "Field Pack", ItemCategory::Container)
            .with_size(4, 4)
            .with_weight(1.5)
            .with_equip_slots(&[EquipSlot::Backpack])
            .with_description("Worn canvas backpack."),
        ItemDefinition::new("belt_pouch", "Belt Pouch", ItemCategory::Container)
            .with_size(2, 2)
            .with_weight(0.3)
            .with_equip_slots(&[EquipSlot::Pouch]),
        // Consumables
        ItemDefinition::new("bandage", "Bandage", ItemCategory::Medicine)
            .with_weight(0.1)
            .with_max_stack(5)
            .with_description("Stops bleeding."),
        ItemDefinition::new("field_medkit", "Field Medkit", ItemCategory::Medicine)
            .with_size(2, 1)
            .with_weight(0.6)
            .with_rarity(Rarity::Uncommon)
            .rotatable()
            .with_description("Surgical basics in a tin box."),
        ItemDefinition::new("canned_stew", "Canned Stew", ItemCategory::Food)
            .with_weight(0.5)
            .with_max_stack(3)
            .with_description("Expired years ago. Still edible, probably."),
        // Misc
        ItemDefinition::new("rusted_key", "Rusted Key", ItemCategory::Key)
            .with_weight(0.05)
            .with_rarity(Rarity::Rare)
            .with_description("Opens something, somewhere."),
        ItemDefinition::new("militia_armband", "Militia Armband", ItemCategory::Armband)
            .with_weight(0.05)
            .with_equip_slots(&[EquipSlot::Armband]),
        ItemDefinition::new("scrap_electronics", "Scrap Electronics", ItemCategory::Misc)
            .with_size(2, 2)
            .with_weight(0.9)
            .with_description("Barter fodder."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_ids_are_unique() {
        let defs = default_definitions();
        let ids: HashSet<_> = defs.iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids.len(), defs.len());
    }

    #[test]
    fn test_weapons_have_magazines_and_slots() {
        for def in default_definitions() {
            if def.category == ItemCategory::Weapon {
                assert!(def.magazine_size > 0, "{} has no magazine", def.id);
                assert!(
                    def.equip_slots.iter().all(|s| s.is_weapon()),
                    "{} lists a non-weapon slot",
                    def.id
                );
            }
        }
    }

    #[test]
    fn test_equip_slots_match_categories() {
        use crate::inventory::equipment::is_compatible;
        for def in default_definitions() {
            for slot in &def.equip_slots {
                assert!(is_compatible(&def, *slot), "{} vs {:?}", def.id, slot);
            }
        }
    }
}
