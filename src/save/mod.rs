//! Save/load system
//!
//! Persists the inventory as a flat, category-agnostic list of item
//! records and restores it against the loaded catalog.

pub mod records;

pub use records::{
    delete_save, load_slot, read_save, restore, save_directory, save_exists, save_path,
    save_to_slot, snapshot, write_save, ItemRecord, RestoreReport, SaveData, SaveError,
};
