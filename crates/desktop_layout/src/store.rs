//! Two-region layout store: a position-stable dock and an ordered desktop.
//!
//! The store is addressed as one flat array when persisted (`[0, R)` dock slots, then desktop
//! entries) but keeps the regions as separate collections internally. Every mutation builds the
//! next collections and swaps them in together, bumping [`LayoutStore::revision`], so readers only
//! ever observe complete states.

use std::collections::HashSet;

use thiserror::Error;

use leptos::logging;

use crate::model::{DesktopItem, Footprint, ItemId, ItemKind, Region, DEFAULT_DOCK_CAPACITY};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors for layout mutations that cannot be applied.
pub enum LayoutError {
    /// The referenced item is not in either region.
    #[error("item {0:?} not found")]
    ItemNotFound(ItemId),
    /// Every dock slot is taken.
    #[error("dock is full ({capacity} slots)")]
    DockFull {
        /// Reserved dock capacity.
        capacity: usize,
    },
    /// An item with the same id is already placed.
    #[error("item {0:?} already exists")]
    DuplicateItem(ItemId),
    /// Only desktop widgets can change footprint.
    #[error("item {0:?} cannot be resized")]
    NotResizable(ItemId),
    /// The add-button is synthetic and cannot be stored or moved.
    #[error("the add-button is virtual")]
    AddButtonIsVirtual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStore {
    /// Always exactly `capacity` slots; `None` keeps neighbouring dock positions stable.
    dock: Vec<Option<DesktopItem>>,
    /// Ordered desktop entries. `None` only appears after a soft delete, until compaction.
    desktop: Vec<Option<DesktopItem>>,
    revision: u64,
}

impl LayoutStore {
    /// Rebuilds a store from the flat persisted array.
    ///
    /// Duplicate ids keep their first occurrence, persisted add-buttons are dropped, and desktop
    /// holes are compacted away. A capacity outside `1..=DEFAULT_DOCK_CAPACITY` falls back to the
    /// default.
    pub fn from_layout_array(slots: Vec<Option<DesktopItem>>, dock_capacity: usize) -> Self {
        let dock_capacity = checked_dock_capacity(dock_capacity);
        let mut seen = HashSet::new();
        let mut keep = |slot: Option<DesktopItem>| {
            slot.filter(|item| !item.is_add_button() && seen.insert(item.id))
        };

        let mut slots = slots.into_iter();
        let dock = slots.by_ref().take(dock_capacity).map(&mut keep).collect::<Vec<_>>();
        let desktop = slots.filter_map(&mut keep).map(Some).collect();

        let mut store = Self {
            dock,
            desktop,
            revision: 0,
        };
        store.dock.resize(dock_capacity, None);
        store
    }

    /// The flat array: `R` dock slots followed by desktop entries.
    pub fn layout_array(&self) -> Vec<Option<DesktopItem>> {
        self.dock.iter().chain(self.desktop.iter()).cloned().collect()
    }

    pub fn dock_capacity(&self) -> usize {
        self.dock.len()
    }

    /// Raw dock slots, including empty ones.
    pub fn dock_slots(&self) -> &[Option<DesktopItem>] {
        &self.dock
    }

    pub fn dock_items(&self) -> Vec<&DesktopItem> {
        self.dock.iter().flatten().collect()
    }

    pub fn desktop_items(&self) -> Vec<&DesktopItem> {
        self.desktop.iter().flatten().collect()
    }

    pub fn desktop_ids(&self) -> Vec<ItemId> {
        self.desktop.iter().flatten().map(|item| item.id).collect()
    }

    pub fn dock_len(&self) -> usize {
        self.dock.iter().flatten().count()
    }

    pub fn desktop_len(&self) -> usize {
        self.desktop.iter().flatten().count()
    }

    pub fn is_dock_full(&self) -> bool {
        self.dock_len() >= self.dock_capacity()
    }

    /// Incremented on every applied mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn max_item_id(&self) -> Option<ItemId> {
        self.dock
            .iter()
            .chain(self.desktop.iter())
            .flatten()
            .map(|item| item.id)
            .max()
    }

    /// Finds an item and its index within the compacted region list.
    pub fn find(&self, item_id: ItemId) -> Option<(Region, usize, &DesktopItem)> {
        if let Some((index, item)) = locate(&self.dock, item_id) {
            return Some((Region::Dock, index, item));
        }
        locate(&self.desktop, item_id).map(|(index, item)| (Region::Desktop, index, item))
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.find(item_id).is_some()
    }

    /// Moves an item to `index` within `target`, interpreting `index` against the compacted
    /// target list as it was before the move.
    ///
    /// Returns `Ok(false)` when the item already sits at the resulting position.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ItemNotFound`] for unknown ids and [`LayoutError::DockFull`] when a desktop
    /// item is moved into a full dock; in both cases the store is unchanged.
    pub fn move_item(
        &mut self,
        item_id: ItemId,
        target: Region,
        index: usize,
    ) -> Result<bool, LayoutError> {
        if item_id == ItemId::ADD_BUTTON {
            return Err(LayoutError::AddButtonIsVirtual);
        }
        let (source, _, _) = self
            .find(item_id)
            .ok_or(LayoutError::ItemNotFound(item_id))?;

        match (source, target) {
            (Region::Desktop, Region::Desktop) => {
                let desktop = compacted(&self.desktop);
                let Some(next) = reinsert(desktop, item_id, index) else {
                    return Ok(false);
                };
                self.commit(self.dock.clone(), next.into_iter().map(Some).collect());
            }
            (Region::Dock, Region::Dock) => {
                let capacity = self.dock_capacity();
                let dock = compacted(&self.dock);
                let Some(next) = reinsert(dock, item_id, index) else {
                    return Ok(false);
                };
                self.commit(expand_dock(next, capacity), self.desktop.clone());
            }
            (Region::Dock, Region::Desktop) => {
                let mut dock = self.dock.clone();
                let Some(mut item) = dock
                    .iter_mut()
                    .find(|slot| slot.as_ref().is_some_and(|item| item.id == item_id))
                    .and_then(Option::take)
                else {
                    return Err(LayoutError::ItemNotFound(item_id));
                };
                item.footprint = Footprint::UNIT;

                let mut desktop = compacted(&self.desktop);
                desktop.insert(index.min(desktop.len()), item);
                self.commit(dock, desktop.into_iter().map(Some).collect());
            }
            (Region::Desktop, Region::Dock) => {
                let capacity = self.dock_capacity();
                if self.is_dock_full() {
                    return Err(LayoutError::DockFull { capacity });
                }
                let mut desktop = compacted(&self.desktop);
                let Some(from) = desktop.iter().position(|item| item.id == item_id) else {
                    return Err(LayoutError::ItemNotFound(item_id));
                };
                let mut item = desktop.remove(from);
                item.footprint = Footprint::UNIT;

                let mut dock = compacted(&self.dock);
                dock.insert(index.min(dock.len()), item);
                self.commit(
                    expand_dock(dock, capacity),
                    desktop.into_iter().map(Some).collect(),
                );
            }
        }
        Ok(true)
    }

    /// Soft delete: nulls the item's slot in place. Dock neighbours keep their positions; desktop
    /// holes are hidden by the projections until [`LayoutStore::compact`] runs.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ItemNotFound`] when no slot holds `item_id`.
    pub fn delete_item(&mut self, item_id: ItemId) -> Result<(), LayoutError> {
        let null_out = |slots: &[Option<DesktopItem>]| {
            let mut next = slots.to_vec();
            let slot = next
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|item| item.id == item_id))?;
            *slot = None;
            Some(next)
        };

        if let Some(dock) = null_out(&self.dock) {
            self.commit(dock, self.desktop.clone());
            return Ok(());
        }
        if let Some(desktop) = null_out(&self.desktop) {
            self.commit(self.dock.clone(), desktop);
            return Ok(());
        }
        Err(LayoutError::ItemNotFound(item_id))
    }

    /// Appends an item at the end of the desktop region.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DuplicateItem`] when the id is already placed and
    /// [`LayoutError::AddButtonIsVirtual`] for the synthetic add-button.
    pub fn append_item(&mut self, item: DesktopItem) -> Result<(), LayoutError> {
        if item.is_add_button() {
            return Err(LayoutError::AddButtonIsVirtual);
        }
        if self.contains(item.id) {
            return Err(LayoutError::DuplicateItem(item.id));
        }
        let mut desktop = self.desktop.clone();
        desktop.push(Some(item));
        self.commit(self.dock.clone(), desktop);
        Ok(())
    }

    /// Sets a desktop widget's footprint, clamped to `[1, MAX_WIDGET_SPAN]` per axis.
    ///
    /// Returns `Ok(false)` when the clamped footprint equals the current one.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ItemNotFound`] for unknown ids and [`LayoutError::NotResizable`] for icons
    /// or items parked in the dock.
    pub fn resize_item(&mut self, item_id: ItemId, w: i32, h: i32) -> Result<bool, LayoutError> {
        let (region, _, item) = self
            .find(item_id)
            .ok_or(LayoutError::ItemNotFound(item_id))?;
        if region != Region::Desktop || !matches!(item.kind, ItemKind::Widget { .. }) {
            return Err(LayoutError::NotResizable(item_id));
        }

        let footprint = Footprint::new(w, h).clamped_to_widget_range();
        if item.footprint == footprint {
            return Ok(false);
        }
        let desktop = self
            .desktop
            .iter()
            .cloned()
            .map(|slot| {
                slot.map(|mut item| {
                    if item.id == item_id {
                        item.footprint = footprint;
                    }
                    item
                })
            })
            .collect();
        self.commit(self.dock.clone(), desktop);
        Ok(true)
    }

    /// Drops soft-deleted desktop holes. Returns whether anything was removed.
    pub fn compact(&mut self) -> bool {
        if self.desktop.iter().all(Option::is_some) {
            return false;
        }
        let desktop = self.desktop.iter().flatten().cloned().map(Some).collect();
        self.commit(self.dock.clone(), desktop);
        true
    }

    /// Stamps a freshly built store as the successor of one at `previous`, so revision-keyed
    /// caches see hydration as a change.
    pub(crate) fn succeed(&mut self, previous: u64) {
        self.revision = previous.wrapping_add(1);
    }

    fn commit(&mut self, dock: Vec<Option<DesktopItem>>, desktop: Vec<Option<DesktopItem>>) {
        debug_assert_eq!(dock.len(), self.dock.len());
        self.dock = dock;
        self.desktop = desktop;
        self.revision = self.revision.wrapping_add(1);
    }
}

fn locate(slots: &[Option<DesktopItem>], item_id: ItemId) -> Option<(usize, &DesktopItem)> {
    slots
        .iter()
        .flatten()
        .enumerate()
        .find(|(_, item)| item.id == item_id)
}

fn compacted(slots: &[Option<DesktopItem>]) -> Vec<DesktopItem> {
    slots.iter().flatten().cloned().collect()
}

fn expand_dock(items: Vec<DesktopItem>, capacity: usize) -> Vec<Option<DesktopItem>> {
    let mut dock = items.into_iter().map(Some).collect::<Vec<_>>();
    dock.resize(capacity, None);
    dock
}

/// Splice-and-reinsert within one list. `target` is read against the list before removal, so a
/// target past the source shifts down by one. `None` when nothing would move.
fn reinsert(
    mut list: Vec<DesktopItem>,
    item_id: ItemId,
    target: usize,
) -> Option<Vec<DesktopItem>> {
    let from = list.iter().position(|item| item.id == item_id)?;
    let item = list.remove(from);
    let to = if from < target { target - 1 } else { target }.min(list.len());
    if to == from {
        return None;
    }
    list.insert(to, item);
    Some(list)
}

fn checked_dock_capacity(capacity: usize) -> usize {
    match capacity {
        1..=DEFAULT_DOCK_CAPACITY => capacity,
        0 => DEFAULT_DOCK_CAPACITY,
        _ => {
            logging::warn!(
                "ignoring persisted dock capacity {capacity}; using {DEFAULT_DOCK_CAPACITY}"
            );
            DEFAULT_DOCK_CAPACITY
        }
    }
}
