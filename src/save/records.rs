//! Flat save records
//!
//! Each persisted item is one row: definition id, owning container or
//! slot, placement, stack, durability and ammo. Weapon fields are present
//! on every row but ignored for non-weapon categories.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inventory::container::ContainerId;
use crate::inventory::orchestrator::Orchestrator;
use crate::items::definition::{DefId, EquipSlot};
use crate::items::instance::GridPos;

/// Save file version for compatibility checking
const SAVE_VERSION: u32 = 1;

/// One persisted item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub def_id: DefId,
    /// Owning container, or None when equipped
    pub container_id: Option<ContainerId>,
    /// Owning equipment slot, mutually exclusive with `container_id`
    pub slot: Option<EquipSlot>,
    pub x: u8,
    pub y: u8,
    pub rotated: bool,
    pub stack_count: u32,
    pub durability: f32,
    pub ammo_count: u32,
}

/// Complete save payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub records: Vec<ItemRecord>,
}

/// Save error types
#[derive(Debug, Clone, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Invalid save data: {0}")]
    InvalidData(String),
}

/// What a restore managed to bring back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    /// Records dropped because their definition is unknown or their
    /// placement no longer fits
    pub skipped: usize,
}

/// Get the save directory path
pub fn save_directory() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "packrat", "Packrat") {
        let mut path = proj_dirs.data_local_dir().to_path_buf();
        path.push("saves");
        path
    } else {
        // Fallback to current directory
        PathBuf::from("./saves")
    }
}

/// Get the path for a specific save slot
pub fn save_path(slot: u8) -> PathBuf {
    let mut path = save_directory();
    path.push(format!("save_{}.json", slot));
    path
}

/// Check if a save exists in the given slot
pub fn save_exists(slot: u8) -> bool {
    save_path(slot).exists()
}

/// Delete a save slot
pub fn delete_save(slot: u8) -> Result<(), SaveError> {
    let path = save_path(slot);
    if path.exists() {
        fs::remove_file(&path).map_err(|e| SaveError::Io(e.to_string()))?;
        log::info!("Deleted save slot {}", slot);
    }
    Ok(())
}

/// Capture every placed and equipped item as flat records
pub fn snapshot(orchestrator: &Orchestrator) -> SaveData {
    let mut records = Vec::new();

    for container in orchestrator.containers() {
        for item in container.placed() {
            records.push(ItemRecord {
                def_id: item.definition().id.clone(),
                container_id: Some(container.id().clone()),
                slot: None,
                x: item.position.x,
                y: item.position.y,
                rotated: item.rotated,
                stack_count: item.stack_count,
                durability: item.durability,
                ammo_count: item.ammo_count,
            });
        }
    }
    for (slot, item) in orchestrator.equipment().all_equipped() {
        records.push(ItemRecord {
            def_id: item.definition().id.clone(),
            container_id: None,
            slot: Some(slot),
            x: 0,
            y: 0,
            rotated: false,
            stack_count: item.stack_count,
            durability: item.durability,
            ammo_count: item.ammo_count,
        });
    }

    SaveData {
        version: SAVE_VERSION,
        records,
    }
}

/// Rebuild the orchestrator's contents from records. Existing contents are
/// cleared first. Records that no longer resolve (missing definition,
/// placement that does not fit) are skipped and counted, never fatal.
pub fn restore(
    orchestrator: &mut Orchestrator,
    data: &SaveData,
) -> Result<RestoreReport, SaveError> {
    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }

    orchestrator.clear_all();
    let mut report = RestoreReport {
        restored: 0,
        skipped: 0,
    };

    for record in &data.records {
        let spawned = match (&record.container_id, record.slot) {
            (Some(container), None) => orchestrator.spawn_item_at(
                &record.def_id,
                container,
                GridPos::new(record.x, record.y),
                record.rotated,
            ),
            (None, Some(slot)) => orchestrator.spawn_item_equipped(&record.def_id, slot),
            _ => {
                log::warn!(
                    "Save record for {} has ambiguous ownership; skipping",
                    record.def_id
                );
                report.skipped += 1;
                continue;
            }
        };

        match spawned {
            Ok(id) => {
                let _ = orchestrator.set_item_stack(id, record.stack_count);
                let _ = orchestrator.set_item_durability(id, record.durability);
                let is_weapon = orchestrator
                    .item(id)
                    .map(|i| i.is_weapon())
                    .unwrap_or(false);
                if is_weapon {
                    let _ = orchestrator.set_item_ammo(id, record.ammo_count);
                }
                report.restored += 1;
            }
            Err(e) => {
                log::warn!("Skipping save record for {}: {}", record.def_id, e);
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

/// Write a save payload to a file
pub fn write_save(data: &SaveData, path: &Path) -> Result<(), SaveError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| SaveError::Io(e.to_string()))?;
    }
    let json = serde_json::to_string_pretty(data).map_err(|e| SaveError::Parse(e.to_string()))?;
    fs::write(path, json).map_err(|e| SaveError::Io(e.to_string()))?;
    Ok(())
}

/// Read a save payload from a file
pub fn read_save(path: &Path) -> Result<SaveData, SaveError> {
    let data = fs::read_to_string(path).map_err(|e| SaveError::Io(e.to_string()))?;
    let save: SaveData =
        serde_json::from_str(&data).map_err(|e| SaveError::Parse(e.to_string()))?;

    if save.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save.version,
        });
    }
    Ok(save)
}

/// Save the inventory to a slot
pub fn save_to_slot(orchestrator: &Orchestrator, slot: u8) -> Result<(), SaveError> {
    let data = snapshot(orchestrator);
    write_save(&data, &save_path(slot))?;
    log::info!("Inventory saved to slot {} ({} items)", slot, data.records.len());
    Ok(())
}

/// Load a save payload from a slot
pub fn load_slot(slot: u8) -> Result<SaveData, SaveError> {
    let save = read_save(&save_path(slot))?;
    log::info!("Inventory loaded from slot {}", slot);
    Ok(save)
}
