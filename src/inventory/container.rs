//! Spatial containers
//!
//! A container is a fixed-size 2D occupancy grid. Items occupy rectangular
//! footprints based on their size and can be rotated to fit into available
//! space. The container owns the authoritative set of instances inside it;
//! no two footprints may overlap.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::items::definition::{ItemCategory, ItemDefinition};
use crate::items::instance::{GridPos, InstanceId, ItemInstance, Owner};

/// Container identifier (unique string ID, e.g. "backpack")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A found placement: position plus whether the item must be rotated into it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub pos: GridPos,
    pub rotated: bool,
}

/// Per-cell validity for placement previews
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPreview {
    pub pos: GridPos,
    pub valid: bool,
}

/// Grid-based container
#[derive(Debug, Clone)]
pub struct Container {
    id: ContainerId,
    width: u8,
    height: u8,
    /// Categories this container refuses
    denied: Vec<ItemCategory>,
    /// Row-major cells; each occupied cell points at the claiming instance
    cells: Vec<Option<InstanceId>>,
    /// Items stored by ID
    items: HashMap<InstanceId, ItemInstance>,
}

impl Container {
    /// Create a new empty container
    pub fn new(id: impl Into<ContainerId>, width: u8, height: u8) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            id: id.into(),
            width,
            height,
            denied: Vec::new(),
            cells: vec![None; width as usize * height as usize],
            items: HashMap::new(),
        }
    }

    /// Refuse the given categories
    pub fn with_denied_categories(mut self, denied: &[ItemCategory]) -> Self {
        self.denied = denied.to_vec();
        self
    }

    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    fn idx(&self, x: u8, y: u8) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Check if a position is valid within the grid
    pub fn in_bounds(&self, x: u8, y: u8) -> bool {
        x < self.width && y < self.height
    }

    /// Check if this container accepts a category
    pub fn accepts_category(&self, category: ItemCategory) -> bool {
        !self.denied.contains(&category)
    }

    /// Check a rectangle for bounds and occupancy, treating cells claimed
    /// by `ignore` ids as free. Own-cell exclusion is what lets an item be
    /// re-placed over its current footprint during rotation and rollback.
    fn can_place_rect(&self, x: u8, y: u8, w: u8, h: u8, ignore: &[InstanceId]) -> bool {
        for dy in 0..h {
            for dx in 0..w {
                let nx = x as u16 + dx as u16;
                let ny = y as u16 + dy as u16;
                if nx >= self.width as u16 || ny >= self.height as u16 {
                    return false;
                }
                match self.cells[self.idx(nx as u8, ny as u8)] {
                    Some(occupant) if !ignore.contains(&occupant) => return false,
                    _ => {}
                }
            }
        }
        true
    }

    /// Check if an item can be placed at a position with its current rotation
    pub fn can_place(&self, item: &ItemInstance, pos: GridPos) -> bool {
        self.can_place_ignoring(item, pos, &[item.id])
    }

    /// Placement check treating the given instances' cells as vacated.
    /// Used by multi-item transactions (swap) that verify both target
    /// positions before moving anything.
    pub(crate) fn can_place_ignoring(
        &self,
        item: &ItemInstance,
        pos: GridPos,
        ignore: &[InstanceId],
    ) -> bool {
        self.accepts_category(item.definition().category)
            && self.can_place_rect(pos.x, pos.y, item.width(), item.height(), ignore)
    }

    /// Place an item at a position. On rejection the item is handed back
    /// untouched and nothing is mutated.
    pub fn add_item(&mut self, mut item: ItemInstance, pos: GridPos) -> Result<(), ItemInstance> {
        if !self.can_place(&item, pos) {
            return Err(item);
        }

        item.position = pos;
        item.owner = Owner::Container(self.id.clone());

        let id = item.id;
        for cell in item.occupied_cells() {
            let idx = self.idx(cell.x, cell.y);
            self.cells[idx] = Some(id);
        }
        self.items.insert(id, item);
        Ok(())
    }

    /// Remove an item by ID, clearing its footprint. The returned instance
    /// is detached.
    pub fn remove_item(&mut self, id: InstanceId) -> Option<ItemInstance> {
        let mut item = self.items.remove(&id)?;
        for cell in item.occupied_cells() {
            let idx = self.idx(cell.x, cell.y);
            self.cells[idx] = None;
        }
        item.owner = Owner::Detached;
        Some(item)
    }

    /// Find the first position the item fits at, scanning row-major from the
    /// top-left. The un-rotated orientation is tried over the whole grid
    /// first; only if that fails and the definition is rotatable is the
    /// rotated orientation scanned.
    pub fn find_available_position(&self, item: &ItemInstance) -> Option<Placement> {
        if !self.accepts_category(item.definition().category) {
            return None;
        }

        let (w, h) = item.definition().size();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.can_place_rect(x, y, w, h, &[item.id]) {
                    return Some(Placement {
                        pos: GridPos::new(x, y),
                        rotated: false,
                    });
                }
            }
        }

        if item.definition().rotatable && w != h {
            for y in 0..self.height {
                for x in 0..self.width {
                    if self.can_place_rect(x, y, h, w, &[item.id]) {
                        return Some(Placement {
                            pos: GridPos::new(x, y),
                            rotated: true,
                        });
                    }
                }
            }
        }

        None
    }

    /// Check whether a definition would fit anywhere in this container
    pub fn has_space_for(&self, def: &ItemDefinition) -> bool {
        if !self.accepts_category(def.category) {
            return false;
        }
        let (w, h) = def.size();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.can_place_rect(x, y, w, h, &[]) {
                    return true;
                }
            }
        }
        if def.rotatable && w != h {
            for y in 0..self.height {
                for x in 0..self.width {
                    if self.can_place_rect(x, y, h, w, &[]) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Get the instance whose footprint contains the cell
    pub fn item_at(&self, pos: GridPos) -> Option<&ItemInstance> {
        if !self.in_bounds(pos.x, pos.y) {
            return None;
        }
        self.cells[self.idx(pos.x, pos.y)]
            .and_then(|id| self.items.get(&id))
    }

    /// Get item by ID
    pub fn get(&self, id: InstanceId) -> Option<&ItemInstance> {
        self.items.get(&id)
    }

    /// Get mutable item by ID
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut ItemInstance> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.items.contains_key(&id)
    }

    /// Per-cell validity map for the item's footprint at a candidate
    /// position (for preview rendering). Does not mutate anything.
    pub fn placement_map(&self, item: &ItemInstance, pos: GridPos) -> Vec<CellPreview> {
        let category_ok = self.accepts_category(item.definition().category);
        item.cells_at(pos)
            .into_iter()
            .map(|cell| {
                let valid = if !category_ok || !self.in_bounds(cell.x, cell.y) {
                    false
                } else {
                    match self.cells[self.idx(cell.x, cell.y)] {
                        Some(occupant) => occupant == item.id,
                        None => true,
                    }
                };
                CellPreview { pos: cell, valid }
            })
            .collect()
    }

    /// Rotate an item in place (if the rotated footprint fits)
    pub fn rotate_in_place(&mut self, id: InstanceId) -> bool {
        let (pos, new_w, new_h) = match self.items.get(&id) {
            Some(item) if item.definition().rotatable => {
                (item.position, item.height(), item.width())
            }
            _ => return false,
        };

        if !self.can_place_rect(pos.x, pos.y, new_w, new_h, &[id]) {
            return false;
        }

        // Re-mark cells under the new footprint
        let Some(mut item) = self.items.remove(&id) else {
            return false;
        };
        for cell in item.occupied_cells() {
            let idx = self.idx(cell.x, cell.y);
            self.cells[idx] = None;
        }
        item.rotated = !item.rotated;
        for cell in item.occupied_cells() {
            let idx = self.idx(cell.x, cell.y);
            self.cells[idx] = Some(id);
        }
        self.items.insert(id, item);
        true
    }

    /// Move an item to a new position within this container
    pub fn move_within(&mut self, id: InstanceId, pos: GridPos) -> bool {
        let (w, h) = match self.items.get(&id) {
            Some(item) => (item.width(), item.height()),
            None => return false,
        };

        if !self.can_place_rect(pos.x, pos.y, w, h, &[id]) {
            return false;
        }

        let Some(mut item) = self.items.remove(&id) else {
            return false;
        };
        for cell in item.occupied_cells() {
            let idx = self.idx(cell.x, cell.y);
            self.cells[idx] = None;
        }
        item.position = pos;
        for cell in item.occupied_cells() {
            let idx = self.idx(cell.x, cell.y);
            self.cells[idx] = Some(id);
        }
        self.items.insert(id, item);
        true
    }

    /// All items in scan order (top-left to bottom-right)
    pub fn placed(&self) -> Vec<&ItemInstance> {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for cell in &self.cells {
            if let Some(id) = cell {
                if seen.insert(*id) {
                    if let Some(item) = self.items.get(id) {
                        result.push(item);
                    }
                }
            }
        }
        result
    }

    /// Raw cell contents (row-major, for rendering)
    pub fn cells(&self) -> &[Option<InstanceId>] {
        &self.cells
    }

    /// Number of items in the container
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total carried weight
    pub fn total_weight(&self) -> f32 {
        self.items.values().map(|i| i.total_weight()).sum()
    }

    /// Remove everything, returning the detached instances
    pub fn clear(&mut self) -> Vec<ItemInstance> {
        self.cells.fill(None);
        self.items
            .drain()
            .map(|(_, mut item)| {
                item.owner = Owner::Detached;
                item
            })
            .collect()
    }
}
