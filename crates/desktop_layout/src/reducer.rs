//! Reducer actions, side-effect intents, and transition logic for the layout engine.

use crate::hit_test::FlipDirection;
use crate::model::{
    DesktopItem, ItemId, ItemKind, LayoutSettings, LayoutSnapshot, LayoutState, Region,
};
use crate::store::LayoutError;

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_layout`] to mutate [`LayoutState`].
pub enum LayoutAction {
    /// Move an item to `index` within `target` (index read against the list before the move).
    MoveItem {
        /// Item to move.
        item_id: ItemId,
        /// Destination region.
        target: Region,
        /// Insertion index within the destination's compacted list.
        index: usize,
    },
    /// Soft-delete an item.
    DeleteItem {
        /// Item to delete.
        item_id: ItemId,
    },
    /// Append an item at the end of the desktop.
    AppendItem {
        /// Item to append; its id must be unused.
        item: DesktopItem,
    },
    /// Set a desktop widget's footprint (clamped per axis).
    ResizeItem {
        /// Widget to resize.
        item_id: ItemId,
        /// Requested width in cells.
        w: i32,
        /// Requested height in cells.
        h: i32,
    },
    /// Drop soft-deleted desktop holes.
    CompactLayout,
    /// Activate (click) an item.
    ActivateItem {
        /// Item that was clicked.
        item_id: ItemId,
    },
    /// Jump to a page, clamped to `[0, page_count)`.
    SetPage {
        /// Requested page.
        page: u32,
        /// Pages currently laid out.
        page_count: u32,
    },
    /// Step one page in `direction`, stopping at the first and last page.
    FlipPage {
        /// Flip direction.
        direction: FlipDirection,
        /// Pages currently laid out.
        page_count: u32,
    },
    /// Toggle edit mode (widget resize handles, delete badges).
    SetEditMode {
        /// Whether edit mode is on.
        enabled: bool,
    },
    /// Show or hide the dock.
    SetDockVisible {
        /// Whether the dock is shown.
        visible: bool,
    },
    /// Show or hide the trailing add-button.
    SetShowAddButton {
        /// Whether the add-button is shown.
        visible: bool,
    },
    /// Replace the layout with a persisted snapshot.
    HydrateLayout {
        /// Snapshot to restore.
        snapshot: LayoutSnapshot,
    },
    /// Replace settings with persisted values.
    HydrateSettings {
        /// Settings to restore.
        settings: LayoutSettings,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_layout`] for the host to execute.
pub enum LayoutEffect {
    /// Persist the current layout snapshot.
    PersistLayout,
    /// Persist the layout settings.
    PersistSettings,
    /// Ask the window manager to open an app window for an icon.
    OpenAppWindow {
        /// Activated icon.
        item_id: ItemId,
        /// App address carried by the icon.
        url: String,
    },
    /// Open an external URL.
    OpenExternalUrl(String),
    /// Show the "add item" flow.
    RequestAddItem,
}

/// Applies a [`LayoutAction`] to the layout state and collects resulting side effects.
///
/// Mutations that leave the layout unchanged (a move onto the item's own position, a resize to
/// the current footprint) succeed without emitting [`LayoutEffect::PersistLayout`].
///
/// # Errors
///
/// Returns the store's [`LayoutError`] when a mutation cannot be applied. The state is unchanged
/// in that case.
pub fn reduce_layout(
    state: &mut LayoutState,
    action: LayoutAction,
) -> Result<Vec<LayoutEffect>, LayoutError> {
    let mut effects = Vec::new();
    match action {
        LayoutAction::MoveItem {
            item_id,
            target,
            index,
        } => {
            if state.store.move_item(item_id, target, index)? {
                effects.push(LayoutEffect::PersistLayout);
            }
        }
        LayoutAction::DeleteItem { item_id } => {
            state.store.delete_item(item_id)?;
            effects.push(LayoutEffect::PersistLayout);
        }
        LayoutAction::AppendItem { item } => {
            let id = item.id;
            state.store.append_item(item)?;
            state.next_item_id = state.next_item_id.max(id.0.saturating_add(1));
            effects.push(LayoutEffect::PersistLayout);
        }
        LayoutAction::ResizeItem { item_id, w, h } => {
            if state.store.resize_item(item_id, w, h)? {
                effects.push(LayoutEffect::PersistLayout);
            }
        }
        LayoutAction::CompactLayout => {
            if state.store.compact() {
                effects.push(LayoutEffect::PersistLayout);
            }
        }
        LayoutAction::ActivateItem { item_id } => {
            if item_id == ItemId::ADD_BUTTON {
                effects.push(LayoutEffect::RequestAddItem);
            } else {
                let (_, _, item) = state
                    .store
                    .find(item_id)
                    .ok_or(LayoutError::ItemNotFound(item_id))?;
                match &item.kind {
                    ItemKind::Icon {
                        url,
                        opens_in_window: true,
                        ..
                    } => effects.push(LayoutEffect::OpenAppWindow {
                        item_id,
                        url: url.clone(),
                    }),
                    ItemKind::Icon { url, .. } => {
                        effects.push(LayoutEffect::OpenExternalUrl(url.clone()))
                    }
                    ItemKind::AddButton => effects.push(LayoutEffect::RequestAddItem),
                    ItemKind::Widget { .. } => {}
                }
            }
        }
        LayoutAction::SetPage { page, page_count } => {
            state.current_page = page.min(last_page(page_count));
        }
        LayoutAction::FlipPage {
            direction,
            page_count,
        } => {
            let current = state.current_page.min(last_page(page_count));
            state.current_page = match direction {
                FlipDirection::Previous => current.saturating_sub(1),
                FlipDirection::Next => (current + 1).min(last_page(page_count)),
            };
        }
        LayoutAction::SetEditMode { enabled } => {
            state.edit_mode = enabled;
        }
        LayoutAction::SetDockVisible { visible } => {
            if state.settings.dock_visible != visible {
                state.settings.dock_visible = visible;
                effects.push(LayoutEffect::PersistSettings);
            }
        }
        LayoutAction::SetShowAddButton { visible } => {
            if state.settings.show_add_button != visible {
                state.settings.show_add_button = visible;
                effects.push(LayoutEffect::PersistSettings);
            }
        }
        LayoutAction::HydrateLayout { snapshot } => {
            let previous_revision = state.store.revision();
            let settings = state.settings.clone();
            *state = LayoutState::from_snapshot(snapshot);
            state.settings = settings;
            state.store.succeed(previous_revision);
        }
        LayoutAction::HydrateSettings { settings } => {
            state.settings = settings;
        }
    }
    Ok(effects)
}

fn last_page(page_count: u32) -> u32 {
    page_count.max(1) - 1
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{default_snapshot, Footprint};

    fn reduce(state: &mut LayoutState, action: LayoutAction) -> Vec<LayoutEffect> {
        reduce_layout(state, action).expect("reduce")
    }

    #[test]
    fn moves_persist_only_when_the_layout_changes() {
        let mut state = LayoutState::default();
        let first = state.store.desktop_ids()[0];

        let effects = reduce(
            &mut state,
            LayoutAction::MoveItem {
                item_id: first,
                target: Region::Desktop,
                index: 0,
            },
        );
        assert!(effects.is_empty());

        let effects = reduce(
            &mut state,
            LayoutAction::MoveItem {
                item_id: first,
                target: Region::Desktop,
                index: 3,
            },
        );
        assert_eq!(effects, vec![LayoutEffect::PersistLayout]);
        assert_eq!(state.store.desktop_ids()[2], first);
    }

    #[test]
    fn dock_to_desktop_move_lands_first_as_unit_footprint() {
        let mut state = LayoutState::from_snapshot(LayoutSnapshot {
            schema_version: 1,
            dock_capacity: 2,
            slots: vec![
                Some(DesktopItem::widget(ItemId(1), "clock", 2, 2)),
                None,
                Some(DesktopItem::icon(ItemId(2), "a", "https://a.test")),
            ],
        });
        reduce(
            &mut state,
            LayoutAction::MoveItem {
                item_id: ItemId(1),
                target: Region::Desktop,
                index: 0,
            },
        );
        let desktop = state.store.desktop_items();
        assert_eq!(desktop[0].id, ItemId(1));
        assert_eq!(desktop[0].footprint, Footprint::UNIT);
        assert_eq!(state.store.dock_len(), 0);
    }

    #[test]
    fn failed_mutation_leaves_state_untouched() {
        let mut state = LayoutState::default();
        let before = state.clone();
        assert_eq!(
            reduce_layout(
                &mut state,
                LayoutAction::DeleteItem {
                    item_id: ItemId(404)
                }
            ),
            Err(LayoutError::ItemNotFound(ItemId(404)))
        );
        assert_eq!(
            reduce_layout(
                &mut state,
                LayoutAction::ResizeItem {
                    item_id: ItemId(1),
                    w: 2,
                    h: 2
                }
            ),
            Err(LayoutError::NotResizable(ItemId(1)))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn append_advances_the_id_allocator() {
        let mut state = LayoutState::default();
        reduce(
            &mut state,
            LayoutAction::AppendItem {
                item: DesktopItem::icon(ItemId(40), "x", "https://x.test"),
            },
        );
        assert_eq!(state.store.desktop_ids().last(), Some(&ItemId(40)));
        assert_eq!(state.allocate_item_id(), ItemId(41));
    }

    #[test]
    fn activation_routes_by_item_kind() {
        let mut state = LayoutState::default();
        let app = reduce(&mut state, LayoutAction::ActivateItem { item_id: ItemId(3) });
        assert_eq!(
            app,
            vec![LayoutEffect::OpenAppWindow {
                item_id: ItemId(3),
                url: "app://notes".to_string(),
            }]
        );
        let link = reduce(&mut state, LayoutAction::ActivateItem { item_id: ItemId(7) });
        assert_eq!(
            link,
            vec![LayoutEffect::OpenExternalUrl("https://github.com".to_string())]
        );
        let widget = reduce(&mut state, LayoutAction::ActivateItem { item_id: ItemId(6) });
        assert!(widget.is_empty());
        let add = reduce(
            &mut state,
            LayoutAction::ActivateItem {
                item_id: ItemId::ADD_BUTTON,
            },
        );
        assert_eq!(add, vec![LayoutEffect::RequestAddItem]);
    }

    #[test]
    fn page_changes_stay_within_range() {
        let mut state = LayoutState::default();
        reduce(
            &mut state,
            LayoutAction::SetPage {
                page: 7,
                page_count: 3,
            },
        );
        assert_eq!(state.current_page, 2);
        reduce(
            &mut state,
            LayoutAction::FlipPage {
                direction: FlipDirection::Next,
                page_count: 3,
            },
        );
        assert_eq!(state.current_page, 2);
        for _ in 0..4 {
            reduce(
                &mut state,
                LayoutAction::FlipPage {
                    direction: FlipDirection::Previous,
                    page_count: 3,
                },
            );
        }
        assert_eq!(state.current_page, 0);
        reduce(
            &mut state,
            LayoutAction::SetPage {
                page: 5,
                page_count: 0,
            },
        );
        assert_eq!(state.current_page, 0);
    }

    #[test]
    fn settings_changes_persist_once() {
        let mut state = LayoutState::default();
        let effects = reduce(&mut state, LayoutAction::SetDockVisible { visible: false });
        assert_eq!(effects, vec![LayoutEffect::PersistSettings]);
        assert!(reduce(&mut state, LayoutAction::SetDockVisible { visible: false }).is_empty());
        let effects = reduce(&mut state, LayoutAction::SetShowAddButton { visible: false });
        assert_eq!(effects, vec![LayoutEffect::PersistSettings]);
        assert_eq!(
            state.settings,
            LayoutSettings {
                dock_visible: false,
                show_add_button: false,
            }
        );
    }

    #[test]
    fn hydration_replaces_layout_but_keeps_settings_and_bumps_revision() {
        let mut state = LayoutState::default();
        reduce(&mut state, LayoutAction::SetDockVisible { visible: false });
        reduce(&mut state, LayoutAction::SetEditMode { enabled: true });
        reduce(&mut state, LayoutAction::DeleteItem { item_id: ItemId(7) });
        let revision = state.store.revision();

        let effects = reduce(
            &mut state,
            LayoutAction::HydrateLayout {
                snapshot: default_snapshot(),
            },
        );
        assert!(effects.is_empty());
        assert!(state.store.contains(ItemId(7)));
        assert!(!state.settings.dock_visible);
        assert!(!state.edit_mode);
        assert!(state.store.revision() > revision);
    }

    #[test]
    fn compaction_persists_only_when_holes_exist() {
        let mut state = LayoutState::default();
        assert!(reduce(&mut state, LayoutAction::CompactLayout).is_empty());
        reduce(&mut state, LayoutAction::DeleteItem { item_id: ItemId(8) });
        assert_eq!(
            reduce(&mut state, LayoutAction::CompactLayout),
            vec![LayoutEffect::PersistLayout]
        );
    }
}
