//! Data loading and external item content
//!
//! Loads the item catalog from external RON files, allowing for
//! data-driven content and easy modding.

pub mod defaults;
pub mod loader;

pub use defaults::default_definitions;
pub use loader::{export_default_data, load_catalog, load_catalog_from};
