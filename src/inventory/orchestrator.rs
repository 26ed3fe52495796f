//! Inventory orchestrator
//!
//! The single entry point collaborators use to mutate inventory state.
//! Every multi-step operation stages its mutation, verifies it, and either
//! commits or restores the original state before returning; callers never
//! observe an intermediate layout. Spatial math is delegated to
//! `Container`, slot rules to `equipment`.

use thiserror::Error;

use crate::items::catalog::Catalog;
use crate::items::definition::{DefId, EquipSlot};
use crate::items::instance::{GridPos, InstanceId, ItemInstance, Owner};

use super::container::{Container, ContainerId};
use super::equipment::{self, EquipmentRegistry};
use super::events::{EventQueue, InventoryEvent};

/// Default container ids, in unequip fallback order
pub const RIG: &str = "rig";
pub const POCKETS: &str = "pockets";
pub const BACKPACK: &str = "backpack";
pub const STASH: &str = "stash";
pub const GROUND: &str = "ground";

/// Why an inventory operation was refused. Operations that fail leave all
/// state exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    #[error("unknown item {0}")]
    UnknownItem(InstanceId),
    #[error("unknown container {0}")]
    UnknownContainer(ContainerId),
    #[error("unknown definition {0}")]
    UnknownDefinition(DefId),
    #[error("no container has space for the item")]
    NoSpace,
    #[error("placement rejected")]
    PlacementRejected,
    #[error("item is not compatible with slot {0:?}")]
    Incompatible(EquipSlot),
    #[error("slot {0:?} is already occupied")]
    SlotOccupied(EquipSlot),
    #[error("slot {0:?} is empty")]
    EmptySlot(EquipSlot),
    #[error("item is not in a container")]
    NotInContainer,
    #[error("another operation is in flight")]
    OperationInFlight,
    #[error("no operation in flight")]
    NoOperationInFlight,
    #[error("invalid split amount {0}")]
    InvalidSplit(u32),
    #[error("items cannot stack")]
    StackMismatch,
    #[error("item is not consumable")]
    NotConsumable,
    #[error("item is not a weapon")]
    NotAWeapon,
}

/// Result of a stack merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackOutcome {
    /// Units moved into the target
    pub transferred: u32,
    /// True if the source reached zero and was destroyed
    pub source_destroyed: bool,
}

/// Where an item was taken from, with enough detail to put it back
#[derive(Debug, Clone)]
enum TakenFrom {
    Container {
        id: ContainerId,
        pos: GridPos,
        rotated: bool,
    },
    Slot(EquipSlot),
}

impl TakenFrom {
    fn owner(&self) -> Owner {
        match self {
            TakenFrom::Container { id, .. } => Owner::Container(id.clone()),
            TakenFrom::Slot(slot) => Owner::Slot(*slot),
        }
    }
}

/// The single in-flight item (drag gesture or pending split)
#[derive(Debug)]
struct Transit {
    item: ItemInstance,
    origin: TransitOrigin,
}

#[derive(Debug, Clone)]
enum TransitOrigin {
    Drag(TakenFrom),
    Split { source: InstanceId },
}

/// Facade coordinating containers and the equipment registry
#[derive(Debug)]
pub struct Orchestrator {
    catalog: Catalog,
    containers: Vec<Container>,
    /// Containers tried, in order, when an unequipped item needs a home
    fallback_order: Vec<ContainerId>,
    equipment: EquipmentRegistry,
    events: EventQueue,
    in_transit: Option<Transit>,
    next_instance_id: InstanceId,
}

impl Orchestrator {
    /// Create an orchestrator with no containers
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            containers: Vec::new(),
            fallback_order: Vec::new(),
            equipment: EquipmentRegistry::new(),
            events: EventQueue::new(),
            in_transit: None,
            next_instance_id: 1,
        }
    }

    /// Create an orchestrator with the standard container set: rig,
    /// pockets, backpack, stash and ground, which is also the unequip
    /// fallback order.
    pub fn with_standard_containers(catalog: Catalog) -> Self {
        use crate::items::definition::ItemCategory;

        let mut orch = Self::new(catalog);
        orch.add_container(
            Container::new(RIG, 4, 3).with_denied_categories(&[ItemCategory::Container]),
        );
        orch.add_container(
            Container::new(POCKETS, 4, 1).with_denied_categories(&[ItemCategory::Container]),
        );
        orch.add_container(Container::new(BACKPACK, 5, 5));
        orch.add_container(Container::new(STASH, 10, 20));
        orch.add_container(Container::new(GROUND, 20, 20));
        orch.fallback_order = [RIG, POCKETS, BACKPACK, STASH, GROUND]
            .iter()
            .map(|s| ContainerId::from(*s))
            .collect();
        orch
    }

    pub fn add_container(&mut self, container: Container) {
        self.containers.push(container);
    }

    pub fn set_fallback_order(&mut self, order: Vec<ContainerId>) {
        self.fallback_order = order;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn container(&self, id: &ContainerId) -> Option<&Container> {
        self.containers.iter().find(|c| c.id() == id)
    }

    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }

    pub fn equipment(&self) -> &EquipmentRegistry {
        &self.equipment
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Find an item anywhere: containers, equipment or in transit
    pub fn item(&self, id: InstanceId) -> Option<&ItemInstance> {
        for container in &self.containers {
            if let Some(item) = container.get(id) {
                return Some(item);
            }
        }
        if let Some(slot) = self.equipment.slot_of(id) {
            return self.equipment.get(slot);
        }
        match &self.in_transit {
            Some(transit) if transit.item.id == id => Some(&transit.item),
            _ => None,
        }
    }

    /// All items of a category, containers first then equipped
    pub fn items_by_category(
        &self,
        category: crate::items::definition::ItemCategory,
    ) -> Vec<&ItemInstance> {
        let mut result: Vec<&ItemInstance> = Vec::new();
        for container in &self.containers {
            result.extend(
                container
                    .placed()
                    .into_iter()
                    .filter(|i| i.definition().category == category),
            );
        }
        result.extend(
            self.equipment
                .all_equipped()
                .map(|(_, item)| item)
                .filter(|i| i.definition().category == category),
        );
        result
    }

    /// Whether a definition would fit anywhere in the given container
    pub fn has_space_for(&self, def_id: &DefId, container: &ContainerId) -> bool {
        let Some(def) = self.catalog.definition_by_id(def_id) else {
            return false;
        };
        self.container(container)
            .map(|c| c.has_space_for(&def))
            .unwrap_or(false)
    }

    /// The item currently held by a drag or split, if any
    pub fn in_transit_item(&self) -> Option<&ItemInstance> {
        self.in_transit.as_ref().map(|t| &t.item)
    }

    /// Take all pending change notifications
    pub fn drain_events(&mut self) -> Vec<InventoryEvent> {
        self.events.drain()
    }

    // ------------------------------------------------------------------
    // Creation / destruction
    // ------------------------------------------------------------------

    /// Create an instance of a definition and auto-place it in a container
    pub fn spawn_item(
        &mut self,
        def_id: &DefId,
        container: &ContainerId,
    ) -> Result<InstanceId, InventoryError> {
        self.ensure_idle()?;
        let def = self
            .catalog
            .definition_by_id(def_id)
            .ok_or_else(|| InventoryError::UnknownDefinition(def_id.clone()))?;
        let idx = self
            .container_index(container)
            .ok_or_else(|| InventoryError::UnknownContainer(container.clone()))?;

        let mut item = ItemInstance::new(self.next_instance_id, def);
        let placement = self.containers[idx]
            .find_available_position(&item)
            .ok_or(InventoryError::NoSpace)?;
        item.rotated = placement.rotated;
        let id = item.id;
        if self.containers[idx].add_item(item, placement.pos).is_err() {
            return Err(InventoryError::PlacementRejected);
        }
        self.next_instance_id += 1;
        self.events.push(InventoryEvent::ItemAdded {
            container: container.clone(),
            item: id,
        });
        self.events.push(InventoryEvent::InventoryChanged);
        Ok(id)
    }

    /// Create an instance at an explicit position
    pub fn spawn_item_at(
        &mut self,
        def_id: &DefId,
        container: &ContainerId,
        pos: GridPos,
        rotated: bool,
    ) -> Result<InstanceId, InventoryError> {
        self.ensure_idle()?;
        let def = self
            .catalog
            .definition_by_id(def_id)
            .ok_or_else(|| InventoryError::UnknownDefinition(def_id.clone()))?;
        let idx = self
            .container_index(container)
            .ok_or_else(|| InventoryError::UnknownContainer(container.clone()))?;

        let mut item = ItemInstance::new(self.next_instance_id, def);
        item.rotated = rotated;
        let id = item.id;
        if self.containers[idx].add_item(item, pos).is_err() {
            return Err(InventoryError::PlacementRejected);
        }
        self.next_instance_id += 1;
        self.events.push(InventoryEvent::ItemAdded {
            container: container.clone(),
            item: id,
        });
        self.events.push(InventoryEvent::InventoryChanged);
        Ok(id)
    }

    /// Create an instance directly in an equipment slot
    pub fn spawn_item_equipped(
        &mut self,
        def_id: &DefId,
        slot: EquipSlot,
    ) -> Result<InstanceId, InventoryError> {
        self.ensure_idle()?;
        let def = self
            .catalog
            .definition_by_id(def_id)
            .ok_or_else(|| InventoryError::UnknownDefinition(def_id.clone()))?;
        if !self.equipment.is_empty(slot) {
            return Err(InventoryError::SlotOccupied(slot));
        }

        let item = ItemInstance::new(self.next_instance_id, def);
        let id = item.id;
        match self.equipment.equip(item, slot) {
            Ok(()) => {
                self.next_instance_id += 1;
                self.events.push(InventoryEvent::ItemEquipped { slot, item: id });
                self.events.push(InventoryEvent::InventoryChanged);
                Ok(id)
            }
            Err((_, equipment::EquipError::Incompatible)) => {
                Err(InventoryError::Incompatible(slot))
            }
            Err((_, equipment::EquipError::Occupied)) => Err(InventoryError::SlotOccupied(slot)),
        }
    }

    /// Destroy an item outright
    pub fn discard_item(&mut self, id: InstanceId) -> Result<(), InventoryError> {
        self.ensure_idle()?;
        let (item, from) = self.take_item(id)?;
        let container = match &from {
            TakenFrom::Container { id, .. } => Some(id.clone()),
            TakenFrom::Slot(_) => None,
        };
        log::info!("Discarded item {} ({})", item.id, item.definition().id);
        self.events.push(InventoryEvent::ItemRemoved {
            container,
            item: id,
        });
        self.events.push(InventoryEvent::InventoryChanged);
        Ok(())
    }

    /// Use one unit of a medicine/food item; destroys the instance when the
    /// stack reaches zero
    pub fn consume_item(&mut self, id: InstanceId) -> Result<(), InventoryError> {
        self.ensure_idle()?;
        let stack = {
            let item = self.item(id).ok_or(InventoryError::UnknownItem(id))?;
            if !item.definition().category.is_consumable() {
                return Err(InventoryError::NotConsumable);
            }
            item.stack_count
        };
        if stack > 1 {
            if let Some(item) = self.item_mut(id) {
                item.stack_count -= 1;
            }
        } else {
            let (item, from) = self.take_item(id)?;
            let container = match &from {
                TakenFrom::Container { id, .. } => Some(id.clone()),
                TakenFrom::Slot(_) => None,
            };
            log::debug!("Consumed last unit of item {} ({})", id, item.definition().id);
            self.events.push(InventoryEvent::ItemRemoved {
                container,
                item: id,
            });
        }
        self.events.push(InventoryEvent::InventoryChanged);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transactional operations
    // ------------------------------------------------------------------

    /// Move an item (from a container or a slot) to a position in a target
    /// container. On failure the item returns to exactly where it was.
    pub fn move_item(
        &mut self,
        id: InstanceId,
        target: &ContainerId,
        pos: GridPos,
    ) -> Result<(), InventoryError> {
        self.ensure_idle()?;
        let target_idx = self
            .container_index(target)
            .ok_or_else(|| InventoryError::UnknownContainer(target.clone()))?;

        let (item, from) = self.take_item(id)?;
        match self.containers[target_idx].add_item(item, pos) {
            Ok(()) => {
                if let TakenFrom::Slot(slot) = &from {
                    self.events.push(InventoryEvent::ItemUnequipped {
                        slot: *slot,
                        item: id,
                    });
                }
                self.events.push(InventoryEvent::ItemMoved {
                    item: id,
                    from: from.owner(),
                    to: target.clone(),
                });
                self.events.push(InventoryEvent::InventoryChanged);
                Ok(())
            }
            Err(item) => {
                self.restore_item(item, &from);
                Err(InventoryError::PlacementRejected)
            }
        }
    }

    /// Swap two container-held items, each taking the other's position.
    /// Both placements are verified before anything moves; if either check
    /// fails, neither item moves.
    pub fn swap_items(&mut self, a: InstanceId, b: InstanceId) -> Result<(), InventoryError> {
        self.ensure_idle()?;
        if a == b {
            return Ok(());
        }

        let (a_cont, a_pos) = self.container_position(a)?;
        let (b_cont, b_pos) = self.container_position(b)?;

        // Precondition: each fits at the other's position with both
        // footprints treated as vacated.
        let ignore = [a, b];
        let a_item = self.containers[a_cont].get(a).ok_or(InventoryError::UnknownItem(a))?;
        let b_item = self.containers[b_cont].get(b).ok_or(InventoryError::UnknownItem(b))?;
        let a_fits = self.containers[b_cont].can_place_ignoring(a_item, b_pos, &ignore);
        let b_fits = self.containers[a_cont].can_place_ignoring(b_item, a_pos, &ignore);
        if !a_fits || !b_fits {
            return Err(InventoryError::PlacementRejected);
        }

        let a_id_cont = self.containers[a_cont].id().clone();
        let b_id_cont = self.containers[b_cont].id().clone();

        let a_item = self.containers[a_cont]
            .remove_item(a)
            .ok_or(InventoryError::UnknownItem(a))?;
        let b_item = self.containers[b_cont]
            .remove_item(b)
            .ok_or(InventoryError::UnknownItem(b))?;

        // Defensive: the precondition makes these adds infallible, but a
        // failure must still restore both originals.
        if let Err(a_item) = self.containers[b_cont].add_item(a_item, b_pos) {
            let _ = self.containers[a_cont].add_item(a_item, a_pos);
            let _ = self.containers[b_cont].add_item(b_item, b_pos);
            log::error!("Swap of {} and {} failed after precondition check", a, b);
            return Err(InventoryError::PlacementRejected);
        }
        if let Err(b_item) = self.containers[a_cont].add_item(b_item, a_pos) {
            if let Some(a_item) = self.containers[b_cont].remove_item(a) {
                let _ = self.containers[a_cont].add_item(a_item, a_pos);
            }
            let _ = self.containers[b_cont].add_item(b_item, b_pos);
            log::error!("Swap of {} and {} failed after precondition check", a, b);
            return Err(InventoryError::PlacementRejected);
        }

        self.events.push(InventoryEvent::ItemMoved {
            item: a,
            from: Owner::Container(a_id_cont.clone()),
            to: b_id_cont.clone(),
        });
        self.events.push(InventoryEvent::ItemMoved {
            item: b,
            from: Owner::Container(b_id_cont),
            to: a_id_cont,
        });
        self.events.push(InventoryEvent::InventoryChanged);
        Ok(())
    }

    /// Equip an item into a slot. A different occupant is first moved into
    /// the fallback container chain; if no container has space the occupant
    /// keeps the slot and the operation fails.
    pub fn equip_item(&mut self, id: InstanceId, slot: EquipSlot) -> Result<(), InventoryError> {
        self.ensure_idle()?;
        {
            let item = self.item(id).ok_or(InventoryError::UnknownItem(id))?;
            if !equipment::is_compatible(item.definition(), slot) {
                return Err(InventoryError::Incompatible(slot));
            }
            if self.equipment.get(slot).map(|o| o.id) == Some(id) {
                return Ok(());
            }
        }

        // Displace the current occupant into the fallback chain
        let displaced = if let Some(occupant) = self.equipment.unequip(slot) {
            let occupant_id = occupant.id;
            match self.place_in_fallback(occupant) {
                Ok(container) => Some((occupant_id, container)),
                Err(occupant) => {
                    if self.equipment.equip(occupant, slot).is_err() {
                        log::error!("Failed to restore displaced occupant of {:?}", slot);
                    }
                    return Err(InventoryError::NoSpace);
                }
            }
        } else {
            None
        };

        let (item, from) = self.take_item(id)?;
        if let Err((item, _)) = self.equipment.equip(item, slot) {
            // Compatibility was pre-checked and the slot vacated; put
            // everything back.
            self.restore_item(item, &from);
            if let Some((occupant_id, container)) = displaced {
                if let Some(idx) = self.container_index(&container) {
                    if let Some(occupant) = self.containers[idx].remove_item(occupant_id) {
                        if self.equipment.equip(occupant, slot).is_err() {
                            log::error!("Failed to restore displaced occupant of {:?}", slot);
                        }
                    }
                }
            }
            return Err(InventoryError::SlotOccupied(slot));
        }

        if let Some((occupant_id, container)) = displaced {
            self.events.push(InventoryEvent::ItemUnequipped {
                slot,
                item: occupant_id,
            });
            self.events.push(InventoryEvent::ItemAdded {
                container,
                item: occupant_id,
            });
        }
        if let TakenFrom::Slot(old_slot) = &from {
            self.events.push(InventoryEvent::ItemUnequipped {
                slot: *old_slot,
                item: id,
            });
        }
        self.events.push(InventoryEvent::ItemEquipped { slot, item: id });
        self.events.push(InventoryEvent::InventoryChanged);
        Ok(())
    }

    /// Unequip a slot into the fallback container chain. If no container
    /// has space, the item stays equipped and the operation fails.
    pub fn unequip_to_containers(
        &mut self,
        slot: EquipSlot,
    ) -> Result<InstanceId, InventoryError> {
        self.ensure_idle()?;
        let item = self
            .equipment
            .unequip(slot)
            .ok_or(InventoryError::EmptySlot(slot))?;
        let id = item.id;
        match self.place_in_fallback(item) {
            Ok(container) => {
                self.events.push(InventoryEvent::ItemUnequipped { slot, item: id });
                self.events.push(InventoryEvent::ItemAdded {
                    container,
                    item: id,
                });
                self.events.push(InventoryEvent::InventoryChanged);
                Ok(id)
            }
            Err(item) => {
                if self.equipment.equip(item, slot).is_err() {
                    log::error!("Failed to restore occupant of {:?}", slot);
                }
                Err(InventoryError::NoSpace)
            }
        }
    }

    /// Merge `source` into `target` up to the target's max stack size.
    /// Partial merges are valid; the source is destroyed when it reaches
    /// zero.
    pub fn stack_items(
        &mut self,
        target: InstanceId,
        source: InstanceId,
    ) -> Result<StackOutcome, InventoryError> {
        self.ensure_idle()?;
        if target == source {
            return Err(InventoryError::StackMismatch);
        }

        let (capacity, source_count) = {
            let target_item = self.item(target).ok_or(InventoryError::UnknownItem(target))?;
            let source_item = self.item(source).ok_or(InventoryError::UnknownItem(source))?;
            if target_item.definition().id != source_item.definition().id
                || !target_item.definition().is_stackable()
            {
                return Err(InventoryError::StackMismatch);
            }
            (
                target_item.remaining_stack_capacity(),
                source_item.stack_count,
            )
        };

        let transferred = capacity.min(source_count);
        if transferred == 0 {
            return Ok(StackOutcome {
                transferred: 0,
                source_destroyed: false,
            });
        }

        if let Some(item) = self.item_mut(target) {
            item.stack_count += transferred;
        }
        let source_destroyed = if transferred == source_count {
            let (_, from) = self.take_item(source)?;
            let container = match &from {
                TakenFrom::Container { id, .. } => Some(id.clone()),
                TakenFrom::Slot(_) => None,
            };
            self.events.push(InventoryEvent::ItemRemoved {
                container,
                item: source,
            });
            true
        } else {
            if let Some(item) = self.item_mut(source) {
                item.stack_count -= transferred;
            }
            false
        };

        self.events.push(InventoryEvent::InventoryChanged);
        Ok(StackOutcome {
            transferred,
            source_destroyed,
        })
    }

    /// Split `amount` off a stack into a new detached instance. The new
    /// instance is held by the orchestrator until `place_split` or
    /// `cancel_split`; the amount is never lost.
    pub fn split_item(
        &mut self,
        id: InstanceId,
        amount: u32,
    ) -> Result<InstanceId, InventoryError> {
        self.ensure_idle()?;
        let (def, durability) = {
            let item = self.item(id).ok_or(InventoryError::UnknownItem(id))?;
            if amount == 0 || amount >= item.stack_count {
                return Err(InventoryError::InvalidSplit(amount));
            }
            (item.definition_arc(), item.durability)
        };

        if let Some(item) = self.item_mut(id) {
            item.stack_count -= amount;
        }

        let mut split = ItemInstance::new(self.next_instance_id, def);
        split.stack_count = amount;
        split.durability = durability;
        let split_id = split.id;
        self.next_instance_id += 1;
        self.in_transit = Some(Transit {
            item: split,
            origin: TransitOrigin::Split { source: id },
        });
        self.events.push(InventoryEvent::InventoryChanged);
        Ok(split_id)
    }

    /// Place a pending split into a container
    pub fn place_split(
        &mut self,
        container: &ContainerId,
        pos: GridPos,
    ) -> Result<(), InventoryError> {
        if !matches!(
            &self.in_transit,
            Some(Transit {
                origin: TransitOrigin::Split { .. },
                ..
            })
        ) {
            return Err(InventoryError::NoOperationInFlight);
        }
        let idx = self
            .container_index(container)
            .ok_or_else(|| InventoryError::UnknownContainer(container.clone()))?;

        let Some(transit) = self.in_transit.take() else {
            return Err(InventoryError::NoOperationInFlight);
        };
        let id = transit.item.id;
        match self.containers[idx].add_item(transit.item, pos) {
            Ok(()) => {
                self.events.push(InventoryEvent::ItemAdded {
                    container: container.clone(),
                    item: id,
                });
                self.events.push(InventoryEvent::InventoryChanged);
                Ok(())
            }
            Err(item) => {
                self.in_transit = Some(Transit {
                    item,
                    origin: transit.origin,
                });
                Err(InventoryError::PlacementRejected)
            }
        }
    }

    /// Merge a pending split back into its source stack
    pub fn cancel_split(&mut self) -> Result<(), InventoryError> {
        let source = match &self.in_transit {
            Some(Transit {
                origin: TransitOrigin::Split { source },
                ..
            }) => *source,
            _ => return Err(InventoryError::NoOperationInFlight),
        };
        let Some(transit) = self.in_transit.take() else {
            return Err(InventoryError::NoOperationInFlight);
        };
        match self.item_mut(source) {
            Some(item) => {
                item.stack_count += transit.item.stack_count;
            }
            None => {
                // Source gone: hold on to the amount through the fallback chain
                log::error!("Split source {} vanished; re-homing split stack", source);
                if let Err(item) = self.place_in_fallback(transit.item) {
                    log::error!("No space to re-home split stack of item {}", item.id);
                }
            }
        }
        self.events.push(InventoryEvent::InventoryChanged);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Drag lifecycle
    // ------------------------------------------------------------------

    /// Detach an item for a drag gesture. At most one operation may be in
    /// flight; all other mutations are refused until the drag resolves.
    pub fn begin_drag(&mut self, id: InstanceId) -> Result<(), InventoryError> {
        self.ensure_idle()?;
        let (item, from) = self.take_item(id)?;
        self.in_transit = Some(Transit {
            item,
            origin: TransitOrigin::Drag(from),
        });
        Ok(())
    }

    /// Toggle rotation of the dragged item (preview only; committed on drop)
    pub fn rotate_drag(&mut self) -> Result<(), InventoryError> {
        match &mut self.in_transit {
            Some(Transit {
                item,
                origin: TransitOrigin::Drag(_),
            }) => {
                if item.definition().rotatable {
                    item.rotated = !item.rotated;
                }
                Ok(())
            }
            _ => Err(InventoryError::NoOperationInFlight),
        }
    }

    /// Cancel a drag, restoring the item to its pre-drag owner exactly
    pub fn cancel_drag(&mut self) -> Result<(), InventoryError> {
        if !matches!(
            &self.in_transit,
            Some(Transit {
                origin: TransitOrigin::Drag(_),
                ..
            })
        ) {
            return Err(InventoryError::NoOperationInFlight);
        }
        let Some(Transit {
            item,
            origin: TransitOrigin::Drag(from),
        }) = self.in_transit.take()
        else {
            return Err(InventoryError::NoOperationInFlight);
        };
        self.restore_item(item, &from);
        Ok(())
    }

    /// Drop a dragged item into a container position. On rejection the drag
    /// stays in flight.
    pub fn drop_drag(
        &mut self,
        target: &ContainerId,
        pos: GridPos,
    ) -> Result<(), InventoryError> {
        if !matches!(
            &self.in_transit,
            Some(Transit {
                origin: TransitOrigin::Drag(_),
                ..
            })
        ) {
            return Err(InventoryError::NoOperationInFlight);
        }
        let idx = self
            .container_index(target)
            .ok_or_else(|| InventoryError::UnknownContainer(target.clone()))?;

        let Some(Transit {
            item,
            origin: TransitOrigin::Drag(from),
        }) = self.in_transit.take()
        else {
            return Err(InventoryError::NoOperationInFlight);
        };
        let id = item.id;
        match self.containers[idx].add_item(item, pos) {
            Ok(()) => {
                if let TakenFrom::Slot(slot) = &from {
                    self.events.push(InventoryEvent::ItemUnequipped {
                        slot: *slot,
                        item: id,
                    });
                }
                self.events.push(InventoryEvent::ItemMoved {
                    item: id,
                    from: from.owner(),
                    to: target.clone(),
                });
                self.events.push(InventoryEvent::InventoryChanged);
                Ok(())
            }
            Err(item) => {
                self.in_transit = Some(Transit {
                    item,
                    origin: TransitOrigin::Drag(from),
                });
                Err(InventoryError::PlacementRejected)
            }
        }
    }

    /// Drop a dragged item onto an equipment slot. The slot must be empty
    /// and compatible; otherwise the drag stays in flight.
    pub fn drop_drag_equip(&mut self, slot: EquipSlot) -> Result<(), InventoryError> {
        match &self.in_transit {
            Some(Transit {
                item,
                origin: TransitOrigin::Drag(_),
            }) => {
                if !equipment::is_compatible(item.definition(), slot) {
                    return Err(InventoryError::Incompatible(slot));
                }
                if !self.equipment.is_empty(slot) {
                    return Err(InventoryError::SlotOccupied(slot));
                }
            }
            _ => return Err(InventoryError::NoOperationInFlight),
        }

        let Some(Transit {
            item,
            origin: TransitOrigin::Drag(from),
        }) = self.in_transit.take()
        else {
            return Err(InventoryError::NoOperationInFlight);
        };
        let id = item.id;
        match self.equipment.equip(item, slot) {
            Ok(()) => {
                if let TakenFrom::Slot(old_slot) = &from {
                    self.events.push(InventoryEvent::ItemUnequipped {
                        slot: *old_slot,
                        item: id,
                    });
                }
                self.events.push(InventoryEvent::ItemEquipped { slot, item: id });
                self.events.push(InventoryEvent::InventoryChanged);
                Ok(())
            }
            Err((item, _)) => {
                self.in_transit = Some(Transit {
                    item,
                    origin: TransitOrigin::Drag(from),
                });
                Err(InventoryError::SlotOccupied(slot))
            }
        }
    }

    // ------------------------------------------------------------------
    // Field mutators
    // ------------------------------------------------------------------

    /// Write a weapon's ammo count through to its instance. Allowed while a
    /// drag is in flight; ammo updates do not move items.
    pub fn set_item_ammo(&mut self, id: InstanceId, ammo: u32) -> Result<(), InventoryError> {
        let item = self.item_mut(id).ok_or(InventoryError::UnknownItem(id))?;
        if !item.is_weapon() {
            return Err(InventoryError::NotAWeapon);
        }
        let clamped = ammo.min(item.definition().magazine_size);
        item.ammo_count = clamped;
        self.events.push(InventoryEvent::AmmoChanged {
            item: id,
            ammo: clamped,
        });
        Ok(())
    }

    /// Set an item's durability, clamped to the definition's maximum
    pub fn set_item_durability(
        &mut self,
        id: InstanceId,
        durability: f32,
    ) -> Result<(), InventoryError> {
        let item = self.item_mut(id).ok_or(InventoryError::UnknownItem(id))?;
        item.durability = durability.clamp(0.0, item.definition().max_durability);
        Ok(())
    }

    /// Set an item's stack count, clamped to 1..=max
    pub fn set_item_stack(&mut self, id: InstanceId, count: u32) -> Result<(), InventoryError> {
        let item = self.item_mut(id).ok_or(InventoryError::UnknownItem(id))?;
        item.stack_count = count.clamp(1, item.definition().max_stack);
        Ok(())
    }

    /// Empty every container and slot (session reset; containers persist)
    pub fn clear_all(&mut self) {
        for container in &mut self.containers {
            container.clear();
        }
        self.equipment.clear();
        self.in_transit = None;
        self.events.push(InventoryEvent::InventoryChanged);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_idle(&self) -> Result<(), InventoryError> {
        if self.in_transit.is_some() {
            Err(InventoryError::OperationInFlight)
        } else {
            Ok(())
        }
    }

    fn container_index(&self, id: &ContainerId) -> Option<usize> {
        self.containers.iter().position(|c| c.id() == id)
    }

    fn container_position(
        &self,
        id: InstanceId,
    ) -> Result<(usize, GridPos), InventoryError> {
        for (idx, container) in self.containers.iter().enumerate() {
            if let Some(item) = container.get(id) {
                return Ok((idx, item.position));
            }
        }
        if self.item(id).is_some() {
            Err(InventoryError::NotInContainer)
        } else {
            Err(InventoryError::UnknownItem(id))
        }
    }

    fn item_mut(&mut self, id: InstanceId) -> Option<&mut ItemInstance> {
        if let Some(idx) = self.containers.iter().position(|c| c.contains(id)) {
            return self.containers[idx].get_mut(id);
        }
        if let Some(slot) = self.equipment.slot_of(id) {
            return self.equipment.get_mut(slot);
        }
        match &mut self.in_transit {
            Some(transit) if transit.item.id == id => Some(&mut transit.item),
            _ => None,
        }
    }

    /// Detach an item from wherever it lives, remembering how to put it back
    fn take_item(
        &mut self,
        id: InstanceId,
    ) -> Result<(ItemInstance, TakenFrom), InventoryError> {
        for container in &mut self.containers {
            if container.contains(id) {
                let item = container
                    .remove_item(id)
                    .ok_or(InventoryError::UnknownItem(id))?;
                let from = TakenFrom::Container {
                    id: container.id().clone(),
                    pos: item.position,
                    rotated: item.rotated,
                };
                return Ok((item, from));
            }
        }
        if let Some(slot) = self.equipment.slot_of(id) {
            let item = self
                .equipment
                .unequip(slot)
                .ok_or(InventoryError::UnknownItem(id))?;
            return Ok((item, TakenFrom::Slot(slot)));
        }
        Err(InventoryError::UnknownItem(id))
    }

    /// Put an item back exactly where `take_item` found it. Between a take
    /// and a restore no other mutation runs, so this cannot fail; the
    /// cascade below is a last line of defense, not a code path.
    fn restore_item(&mut self, mut item: ItemInstance, from: &TakenFrom) {
        let id = item.id;
        match from {
            TakenFrom::Container { id: cid, pos, rotated } => {
                item.rotated = *rotated;
                if let Some(idx) = self.container_index(cid) {
                    match self.containers[idx].add_item(item, *pos) {
                        Ok(()) => return,
                        Err(returned) => item = returned,
                    }
                } // fall through with the item still in hand
            }
            TakenFrom::Slot(slot) => {
                match self.equipment.equip(item, *slot) {
                    Ok(()) => return,
                    Err((returned, _)) => item = returned,
                }
            }
        }
        log::error!("Failed to restore item {} to its origin", id);
        if let Err(item) = self.place_in_fallback(item) {
            log::error!("Item {} could not be re-homed anywhere", item.id);
        }
    }

    /// Place an item into the first fallback container with space
    fn place_in_fallback(
        &mut self,
        mut item: ItemInstance,
    ) -> Result<ContainerId, ItemInstance> {
        let order = self.fallback_order.clone();
        for cid in order {
            let Some(idx) = self.container_index(&cid) else {
                continue;
            };
            if let Some(placement) = self.containers[idx].find_available_position(&item) {
                item.rotated = placement.rotated;
                match self.containers[idx].add_item(item, placement.pos) {
                    Ok(()) => return Ok(cid),
                    Err(returned) => item = returned,
                }
            }
        }
        Err(item)
    }
}
