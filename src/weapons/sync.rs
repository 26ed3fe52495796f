//! Weapon sync bridge
//!
//! Keeps the equipped-weapon slots of the inventory and the external
//! weapon runtime mutually consistent. The runtime only ever receives the
//! full loadout as one batch; periodic validation re-derives the expected
//! set from the equipment registry and forces a full resync on mismatch
//! instead of patching incrementally.

use std::time::Duration;

use crate::inventory::equipment::EquipmentRegistry;
use crate::inventory::events::InventoryEvent;
use crate::inventory::orchestrator::{InventoryError, Orchestrator};
use crate::tick::TickTimer;

use super::runtime::{WeaponRuntime, WeaponRuntimeState, WeaponSlot};

/// Bridge lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Runtime collaborator not attached yet; retrying with backoff
    Uninitialized,
    /// Inventory and runtime agree
    Synced,
    /// Validation found a divergence; a forced resync is pending
    Stale,
    /// Non-gameplay context or retry budget exhausted; the bridge is inert
    Disabled,
}

/// Default seconds between validation passes
const DEFAULT_VALIDATION_INTERVAL: f32 = 5.0;
/// Base seconds between attach retries; grows linearly per attempt
const DEFAULT_RETRY_BACKOFF: f32 = 0.5;
/// Attach attempts before the bridge gives up
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Derive the expected runtime loadout from the equipment registry
pub fn derive_loadout(registry: &EquipmentRegistry) -> Vec<WeaponRuntimeState> {
    WeaponSlot::all()
        .iter()
        .filter_map(|slot| {
            registry.get(slot.equip_slot()).map(|item| WeaponRuntimeState {
                slot: *slot,
                def_id: item.definition().id.clone(),
                instance: item.id,
                ammo: item.ammo_count,
            })
        })
        .collect()
}

/// Synchronizes equipped weapons with the weapon runtime
pub struct WeaponSyncBridge {
    state: BridgeState,
    runtime: Option<Box<dyn WeaponRuntime>>,
    validation: TickTimer,
    retry_attempts: u32,
    retry_countdown: f32,
    max_attempts: u32,
    retry_backoff: f32,
    gameplay: bool,
}

impl WeaponSyncBridge {
    pub fn new() -> Self {
        Self::with_validation_interval(DEFAULT_VALIDATION_INTERVAL)
    }

    pub fn with_validation_interval(interval: f32) -> Self {
        Self {
            state: BridgeState::Uninitialized,
            runtime: None,
            validation: TickTimer::new(interval),
            retry_attempts: 0,
            retry_countdown: DEFAULT_RETRY_BACKOFF,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            gameplay: true,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Attach the weapon runtime collaborator and push the current loadout.
    /// Attaching also recovers a bridge that gave up retrying.
    pub fn attach(&mut self, runtime: Box<dyn WeaponRuntime>, registry: &EquipmentRegistry) {
        self.runtime = Some(runtime);
        self.retry_attempts = 0;
        self.retry_countdown = self.retry_backoff;
        if self.gameplay {
            log::info!("Weapon runtime attached");
            self.force_resync(registry);
        } else {
            self.state = BridgeState::Disabled;
        }
    }

    /// Detach the runtime (scene teardown). The bridge returns to its
    /// initial state and resumes retrying.
    pub fn detach(&mut self) -> Option<Box<dyn WeaponRuntime>> {
        self.state = BridgeState::Uninitialized;
        self.retry_attempts = 0;
        self.retry_countdown = self.retry_backoff;
        self.runtime.take()
    }

    /// Enter or leave gameplay. Outside gameplay all weapon state is
    /// cleared rather than synced.
    pub fn set_gameplay(&mut self, gameplay: bool, registry: &EquipmentRegistry) {
        self.gameplay = gameplay;
        if !gameplay {
            if let Some(runtime) = &mut self.runtime {
                runtime.push_equipped_weapons(&[]);
            }
            self.state = BridgeState::Disabled;
        } else if self.runtime.is_some() {
            self.force_resync(registry);
        } else {
            self.state = BridgeState::Uninitialized;
            self.retry_attempts = 0;
            self.retry_countdown = self.retry_backoff;
        }
    }

    /// Process drained orchestrator events. Any equip/unequip/ammo change
    /// touching a weapon slot triggers one full batch push.
    pub fn handle_events(&mut self, events: &[InventoryEvent], registry: &EquipmentRegistry) {
        if self.state == BridgeState::Disabled || self.runtime.is_none() {
            return;
        }
        let relevant = events.iter().any(|event| match event {
            InventoryEvent::ItemEquipped { slot, .. }
            | InventoryEvent::ItemUnequipped { slot, .. } => slot.is_weapon(),
            InventoryEvent::AmmoChanged { item, .. } => WeaponSlot::all()
                .iter()
                .any(|s| registry.get(s.equip_slot()).map(|i| i.id) == Some(*item)),
            _ => false,
        });
        if relevant {
            self.force_resync(registry);
        }
    }

    /// Drive retry backoff and periodic validation
    pub fn update(&mut self, delta: Duration, registry: &EquipmentRegistry) {
        if self.state == BridgeState::Disabled {
            return;
        }

        if self.runtime.is_none() {
            self.retry_countdown -= delta.as_secs_f32();
            if self.retry_countdown <= 0.0 {
                self.retry_attempts += 1;
                if self.retry_attempts >= self.max_attempts {
                    log::error!(
                        "Weapon runtime never attached after {} attempts; weapon sync disabled",
                        self.retry_attempts
                    );
                    self.state = BridgeState::Disabled;
                } else {
                    log::debug!(
                        "Weapon runtime not attached yet (attempt {}/{})",
                        self.retry_attempts,
                        self.max_attempts
                    );
                    // Linear backoff: each attempt waits one base interval longer
                    self.retry_countdown = self.retry_backoff * (self.retry_attempts + 1) as f32;
                }
            }
            return;
        }

        if self.validation.update(delta) {
            self.validate(registry);
        }
    }

    /// Compare the registry-derived loadout against what the runtime
    /// reports. Membership mismatches force a full resync; ammo drift alone
    /// is expected (the runtime is authoritative between notifications).
    pub fn validate(&mut self, registry: &EquipmentRegistry) {
        let Some(runtime) = &self.runtime else {
            return;
        };

        let expected = derive_loadout(registry);
        let reported = runtime.equipped_weapons();

        let mut expected_set: Vec<(WeaponSlot, u64)> =
            expected.iter().map(|w| (w.slot, w.instance)).collect();
        let mut reported_set: Vec<(WeaponSlot, u64)> =
            reported.iter().map(|w| (w.slot, w.instance)).collect();
        expected_set.sort_by_key(|(slot, id)| (slot.equip_slot() as u8, *id));
        reported_set.sort_by_key(|(slot, id)| (slot.equip_slot() as u8, *id));

        if expected_set != reported_set {
            log::warn!(
                "Weapon desync detected ({} expected, {} reported); forcing resync",
                expected_set.len(),
                reported_set.len()
            );
            self.state = BridgeState::Stale;
            self.force_resync(registry);
        }
    }

    /// Push the full derived loadout to the runtime in one batch
    pub fn force_resync(&mut self, registry: &EquipmentRegistry) {
        let Some(runtime) = &mut self.runtime else {
            return;
        };
        let loadout = derive_loadout(registry);
        runtime.push_equipped_weapons(&loadout);
        self.state = BridgeState::Synced;
    }

    /// Write ammo the runtime observed (e.g. after firing) back into the
    /// equipped instance for the given slot.
    pub fn apply_runtime_ammo(
        &self,
        orchestrator: &mut Orchestrator,
        slot: WeaponSlot,
        ammo: u32,
    ) -> Result<(), InventoryError> {
        let id = orchestrator
            .equipment()
            .get(slot.equip_slot())
            .map(|item| item.id)
            .ok_or(InventoryError::EmptySlot(slot.equip_slot()))?;
        orchestrator.set_item_ammo(id, ammo)
    }
}

impl Default for WeaponSyncBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use crate::items::catalog::Catalog;
    use crate::items::definition::{DefId, EquipSlot, ItemCategory, ItemDefinition};
    use crate::items::instance::ItemInstance;
    use crate::inventory::container::ContainerId;
    use crate::inventory::orchestrator::{Orchestrator, STASH};

    #[derive(Debug, Default)]
    struct MockState {
        loadout: Vec<WeaponRuntimeState>,
        pushes: usize,
    }

    #[derive(Clone, Default)]
    struct MockRuntime(Rc<RefCell<MockState>>);

    impl WeaponRuntime for MockRuntime {
        fn equipped_weapons(&self) -> Vec<WeaponRuntimeState> {
            self.0.borrow().loadout.clone()
        }

        fn push_equipped_weapons(&mut self, loadout: &[WeaponRuntimeState]) {
            let mut state = self.0.borrow_mut();
            state.loadout = loadout.to_vec();
            state.pushes += 1;
        }

        fn set_ammo(&mut self, slot: WeaponSlot, ammo: u32) {
            let mut state = self.0.borrow_mut();
            if let Some(entry) = state.loadout.iter_mut().find(|w| w.slot == slot) {
                entry.ammo = ammo;
            }
        }
    }

    fn rifle_def() -> Arc<ItemDefinition> {
        Arc::new(
            ItemDefinition::new("mk4_rifle", "MK-4 Rifle", ItemCategory::Weapon)
                .with_size(4, 2)
                .with_equip_slots(&[EquipSlot::PrimaryWeapon])
                .with_magazine(30),
        )
    }

    fn registry_with_rifle(id: u64, ammo: u32) -> EquipmentRegistry {
        let mut registry = EquipmentRegistry::new();
        let mut rifle = ItemInstance::new(id, rifle_def());
        rifle.ammo_count = ammo;
        registry.equip(rifle, EquipSlot::PrimaryWeapon).unwrap();
        registry
    }

    #[test]
    fn test_attach_pushes_full_loadout() {
        let registry = registry_with_rifle(1, 30);
        let mock = MockRuntime::default();
        let mut bridge = WeaponSyncBridge::new();
        assert_eq!(bridge.state(), BridgeState::Uninitialized);

        bridge.attach(Box::new(mock.clone()), &registry);
        assert_eq!(bridge.state(), BridgeState::Synced);

        let state = mock.0.borrow();
        assert_eq!(state.pushes, 1);
        assert_eq!(state.loadout.len(), 1);
        assert_eq!(state.loadout[0].slot, WeaponSlot::Primary);
        assert_eq!(state.loadout[0].instance, 1);
        assert_eq!(state.loadout[0].ammo, 30);
    }

    #[test]
    fn test_weapon_events_trigger_one_batch_push() {
        let registry = registry_with_rifle(1, 30);
        let mock = MockRuntime::default();
        let mut bridge = WeaponSyncBridge::new();
        bridge.attach(Box::new(mock.clone()), &registry);

        let events = vec![
            InventoryEvent::ItemEquipped {
                slot: EquipSlot::PrimaryWeapon,
                item: 1,
            },
            InventoryEvent::AmmoChanged { item: 1, ammo: 28 },
            InventoryEvent::InventoryChanged,
        ];
        bridge.handle_events(&events, &registry);

        // One resync for the whole batch, not one per event
        assert_eq!(mock.0.borrow().pushes, 2);
    }

    #[test]
    fn test_non_weapon_events_ignored() {
        let registry = registry_with_rifle(1, 30);
        let mock = MockRuntime::default();
        let mut bridge = WeaponSyncBridge::new();
        bridge.attach(Box::new(mock.clone()), &registry);

        let events = vec![
            InventoryEvent::ItemEquipped {
                slot: EquipSlot::Head,
                item: 9,
            },
            InventoryEvent::ItemAdded {
                container: ContainerId::from("backpack"),
                item: 9,
            },
            InventoryEvent::InventoryChanged,
        ];
        bridge.handle_events(&events, &registry);
        assert_eq!(mock.0.borrow().pushes, 1);
    }

    #[test]
    fn test_validation_mismatch_forces_resync() {
        let registry = registry_with_rifle(1, 30);
        let mock = MockRuntime::default();
        let mut bridge = WeaponSyncBridge::with_validation_interval(1.0);
        bridge.attach(Box::new(mock.clone()), &registry);

        // The runtime loses its loadout behind the bridge's back
        mock.0.borrow_mut().loadout.clear();

        bridge.update(Duration::from_secs_f32(1.5), &registry);
        assert_eq!(bridge.state(), BridgeState::Synced);
        let state = mock.0.borrow();
        assert_eq!(state.pushes, 2);
        assert_eq!(state.loadout.len(), 1);
    }

    #[test]
    fn test_ammo_drift_alone_is_not_a_desync() {
        let registry = registry_with_rifle(1, 30);
        let mock = MockRuntime::default();
        let mut bridge = WeaponSyncBridge::with_validation_interval(1.0);
        bridge.attach(Box::new(mock.clone()), &registry);

        // Firing drains ammo runtime-side; membership still matches
        mock.0.borrow_mut().loadout[0].ammo = 25;

        bridge.update(Duration::from_secs_f32(1.5), &registry);
        assert_eq!(bridge.state(), BridgeState::Synced);
        assert_eq!(mock.0.borrow().pushes, 1);
    }

    #[test]
    fn test_retry_exhaustion_disables_bridge() {
        let registry = EquipmentRegistry::new();
        let mut bridge = WeaponSyncBridge::new();

        for _ in 0..16 {
            bridge.update(Duration::from_secs(1), &registry);
        }
        assert_eq!(bridge.state(), BridgeState::Disabled);

        // An explicit attach still recovers the bridge
        let mock = MockRuntime::default();
        bridge.attach(Box::new(mock.clone()), &registry);
        assert_eq!(bridge.state(), BridgeState::Synced);
    }

    #[test]
    fn test_leaving_gameplay_clears_weapon_state() {
        let registry = registry_with_rifle(1, 30);
        let mock = MockRuntime::default();
        let mut bridge = WeaponSyncBridge::new();
        bridge.attach(Box::new(mock.clone()), &registry);

        bridge.set_gameplay(false, &registry);
        assert_eq!(bridge.state(), BridgeState::Disabled);
        assert!(mock.0.borrow().loadout.is_empty());

        // Events are ignored while disabled
        bridge.handle_events(
            &[InventoryEvent::ItemEquipped {
                slot: EquipSlot::PrimaryWeapon,
                item: 1,
            }],
            &registry,
        );
        assert!(mock.0.borrow().loadout.is_empty());

        bridge.set_gameplay(true, &registry);
        assert_eq!(bridge.state(), BridgeState::Synced);
        assert_eq!(mock.0.borrow().loadout.len(), 1);
    }

    #[test]
    fn test_runtime_ammo_written_back_without_resync() {
        let catalog = Catalog::from_definitions(vec![
            ItemDefinition::new("mk4_rifle", "MK-4 Rifle", ItemCategory::Weapon)
                .with_size(4, 2)
                .with_equip_slots(&[EquipSlot::PrimaryWeapon])
                .with_magazine(30),
        ]);
        let mut orch = Orchestrator::with_standard_containers(catalog);
        let rifle = orch.spawn_item(&DefId::from("mk4_rifle"), &ContainerId::from(STASH)).unwrap();
        orch.equip_item(rifle, EquipSlot::PrimaryWeapon).unwrap();
        orch.set_item_ammo(rifle, 30).unwrap();
        orch.drain_events();

        let mock = MockRuntime::default();
        let mut bridge = WeaponSyncBridge::with_validation_interval(1.0);
        bridge.attach(Box::new(mock.clone()), orch.equipment());

        // The runtime fired 5 rounds; write 25 back into the instance
        bridge.apply_runtime_ammo(&mut orch, WeaponSlot::Primary, 25).unwrap();
        assert_eq!(orch.item(rifle).unwrap().ammo_count, 25);

        let events = orch.drain_events();
        assert!(events.contains(&InventoryEvent::AmmoChanged {
            item: rifle,
            ammo: 25
        }));

        // Validation right after sees matching membership: no extra resync
        let pushes_before = mock.0.borrow().pushes;
        bridge.update(Duration::from_secs_f32(1.5), orch.equipment());
        assert_eq!(bridge.state(), BridgeState::Synced);
        assert_eq!(mock.0.borrow().pushes, pushes_before);
    }
}
