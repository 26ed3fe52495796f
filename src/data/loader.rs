//! RON catalog loader
//!
//! Loads item definitions from external RON files, with fallback to the
//! hardcoded defaults when a file is missing or malformed.

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::items::catalog::Catalog;
use crate::items::definition::ItemDefinition;

use super::defaults::default_definitions;

/// Default data directory, relative to the working directory
const DATA_DIR: &str = "assets/data";

/// Load the item catalog from `assets/data/items.ron`, falling back to the
/// built-in defaults
pub fn load_catalog() -> Catalog {
    load_catalog_from(Path::new(DATA_DIR))
}

/// Load the item catalog from `items.ron` under the given directory
pub fn load_catalog_from(base_path: &Path) -> Catalog {
    let path = base_path.join("items.ron");
    if path.exists() {
        match read_definitions(&path) {
            Ok(defs) => {
                log::info!("Loaded {} item definitions from {:?}", defs.len(), path);
                return Catalog::from_definitions(defs);
            }
            Err(e) => {
                log::warn!("Failed to load {:?}: {:#}. Using defaults.", path, e);
            }
        }
    }
    Catalog::from_definitions(default_definitions())
}

fn read_definitions(path: &Path) -> anyhow::Result<Vec<ItemDefinition>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let defs: Vec<ItemDefinition> = ron::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(defs)
}

/// Export the default definitions to `items.ron` for easy editing
pub fn export_default_data(base_path: &Path) -> anyhow::Result<()> {
    if !base_path.exists() {
        fs::create_dir_all(base_path)
            .with_context(|| format!("creating {}", base_path.display()))?;
    }

    let defs = default_definitions();
    let pretty = ron::ser::to_string_pretty(&defs, ron::ser::PrettyConfig::default())
        .context("serializing default item definitions")?;
    fs::write(base_path.join("items.ron"), pretty)
        .with_context(|| format!("writing {}/items.ron", base_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = load_catalog_from(dir.path());
        assert!(!catalog.is_empty());
        assert!(catalog.get("mk4_rifle").is_some());
    }

    #[test]
    fn test_export_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        export_default_data(dir.path()).unwrap();
        assert!(dir.path().join("items.ron").exists());

        let catalog = load_catalog_from(dir.path());
        assert_eq!(catalog.len(), default_definitions().len());
        let rifle = catalog.get("mk4_rifle").unwrap();
        assert_eq!(rifle.magazine_size, 30);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("items.ron"), "not ron at all (").unwrap();
        let catalog = load_catalog_from(dir.path());
        assert_eq!(catalog.len(), default_definitions().len());
    }
}
