//! Inventory change notifications
//!
//! One typed event channel for every structural change category. Events
//! are queued by the orchestrator after an operation fully commits and are
//! drained by the host each tick; collaborators only ever observe
//! consistent post-states.

use std::collections::VecDeque;

use crate::items::definition::EquipSlot;
use crate::items::instance::{InstanceId, Owner};
use super::container::ContainerId;

/// Inventory events
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEvent {
    /// Item placed into a container
    ItemAdded {
        container: ContainerId,
        item: InstanceId,
    },
    /// Item destroyed or taken out of the inventory entirely
    ItemRemoved {
        container: Option<ContainerId>,
        item: InstanceId,
    },
    /// Item relocated to a container (from a container or a slot)
    ItemMoved {
        item: InstanceId,
        from: Owner,
        to: ContainerId,
    },
    /// Item equipped to a slot
    ItemEquipped {
        slot: EquipSlot,
        item: InstanceId,
    },
    /// Item removed from a slot
    ItemUnequipped {
        slot: EquipSlot,
        item: InstanceId,
    },
    /// Weapon ammo count written through to an instance
    AmmoChanged {
        item: InstanceId,
        ammo: u32,
    },
    /// Coarse notification, fired once after every committed operation
    InventoryChanged,
}

/// Pending events, drained by the host
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<InventoryEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: InventoryEvent) {
        self.events.push_back(event);
    }

    /// Take all pending events in emission order
    pub fn drain(&mut self) -> Vec<InventoryEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let mut queue = EventQueue::new();
        queue.push(InventoryEvent::InventoryChanged);
        queue.push(InventoryEvent::AmmoChanged { item: 1, ammo: 12 });

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], InventoryEvent::InventoryChanged);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }
}
