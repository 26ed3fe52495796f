//! Item instances
//!
//! A live item: definition reference plus the mutable state that
//! distinguishes one copy from another (position, rotation, stack count,
//! durability, ammo).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::definition::{EquipSlot, ItemDefinition};
use crate::inventory::container::ContainerId;

/// Unique instance ID for tracking
pub type InstanceId = u64;

/// Position in a container grid (top-left cell of the footprint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: u8,
    pub y: u8,
}

impl GridPos {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Who currently owns an instance.
///
/// Exactly one owner at a time; `Detached` only while the orchestrator
/// holds the item mid-transaction (drag or split).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Container(ContainerId),
    Slot(EquipSlot),
    Detached,
}

/// A live item
#[derive(Debug, Clone)]
pub struct ItemInstance {
    /// Unique instance ID
    pub id: InstanceId,
    /// Shared immutable definition
    def: Arc<ItemDefinition>,
    /// Top-left cell of the footprint (meaningful only when container-owned)
    pub position: GridPos,
    /// If true, width and height are swapped
    pub rotated: bool,
    /// Current stack count (1..=max_stack)
    pub stack_count: u32,
    /// Current durability
    pub durability: f32,
    /// Loaded rounds (weapon category only)
    pub ammo_count: u32,
    /// Current owner
    pub owner: Owner,
}

impl ItemInstance {
    /// Create a fresh, detached instance of a definition
    pub fn new(id: InstanceId, def: Arc<ItemDefinition>) -> Self {
        let durability = def.max_durability;
        Self {
            id,
            def,
            position: GridPos::new(0, 0),
            rotated: false,
            stack_count: 1,
            durability,
            ammo_count: 0,
            owner: Owner::Detached,
        }
    }

    /// The immutable definition this instance was created from
    pub fn definition(&self) -> &ItemDefinition {
        &self.def
    }

    /// Cheap handle to the shared definition
    pub fn definition_arc(&self) -> Arc<ItemDefinition> {
        Arc::clone(&self.def)
    }

    /// Get the effective width (accounting for rotation)
    pub fn width(&self) -> u8 {
        if self.rotated {
            self.def.height
        } else {
            self.def.width
        }
    }

    /// Get the effective height (accounting for rotation)
    pub fn height(&self) -> u8 {
        if self.rotated {
            self.def.width
        } else {
            self.def.height
        }
    }

    /// Get all cells occupied by this item at its current position
    pub fn occupied_cells(&self) -> Vec<GridPos> {
        self.cells_at(self.position)
    }

    /// Get the cells this item would occupy at a candidate position
    pub fn cells_at(&self, pos: GridPos) -> Vec<GridPos> {
        let mut cells = Vec::with_capacity(self.width() as usize * self.height() as usize);
        for dy in 0..self.height() {
            for dx in 0..self.width() {
                cells.push(GridPos::new(pos.x + dx, pos.y + dy));
            }
        }
        cells
    }

    /// Check if this is a weapon instance
    pub fn is_weapon(&self) -> bool {
        self.def.is_weapon()
    }

    /// How many more units this stack can absorb
    pub fn remaining_stack_capacity(&self) -> u32 {
        self.def.max_stack.saturating_sub(self.stack_count)
    }

    /// Total weight of the stack
    pub fn total_weight(&self) -> f32 {
        self.def.weight * self.stack_count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::definition::ItemCategory;

    fn rifle_def() -> Arc<ItemDefinition> {
        Arc::new(
            ItemDefinition::new("test_rifle", "Test Rifle", ItemCategory::Weapon)
                .with_size(4, 2)
                .rotatable()
                .with_magazine(30),
        )
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let mut item = ItemInstance::new(1, rifle_def());
        assert_eq!((item.width(), item.height()), (4, 2));

        item.rotated = true;
        assert_eq!((item.width(), item.height()), (2, 4));
    }

    #[test]
    fn test_occupied_cells() {
        let mut item = ItemInstance::new(1, rifle_def());
        item.position = GridPos::new(1, 2);

        let cells = item.occupied_cells();
        assert_eq!(cells.len(), 8);
        assert!(cells.contains(&GridPos::new(1, 2)));
        assert!(cells.contains(&GridPos::new(4, 3)));
        assert!(!cells.contains(&GridPos::new(5, 2)));
    }

    #[test]
    fn test_new_instance_defaults() {
        let item = ItemInstance::new(7, rifle_def());
        assert_eq!(item.stack_count, 1);
        assert_eq!(item.ammo_count, 0);
        assert_eq!(item.durability, 100.0);
        assert_eq!(item.owner, Owner::Detached);
    }

    #[test]
    fn test_stack_capacity() {
        let def = Arc::new(
            ItemDefinition::new("ammo", "Rounds", ItemCategory::Ammunition).with_max_stack(50),
        );
        let mut item = ItemInstance::new(1, def);
        item.stack_count = 30;
        assert_eq!(item.remaining_stack_capacity(), 20);
    }
}
