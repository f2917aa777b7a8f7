//! Runtime container that owns the layout state and routes pointer events through the
//! interaction controller into the reducer.
//!
//! Every intent the controller proposes is reduced synchronously, in order, before the next event
//! is looked at. The packed layout is re-derived after each applied mutation, so hit testing
//! always runs against the latest committed layout.

use std::rc::Rc;

use leptos::logging;
use platform_host::{Clock, SystemClock};

use crate::geometry::{GridGeometry, Viewport};
use crate::hit_test::DockFrame;
use crate::host::LayoutHostContext;
use crate::interaction::{InteractionController, LayoutFrame, PressTarget};
use crate::model::{DesktopItem, Footprint, ItemId, ItemKind, LayoutState, PointerPosition, Region};
use crate::packing::{pack, page_count, PackedItem};
use crate::reducer::{reduce_layout, LayoutAction, LayoutEffect};
use crate::store::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PackKey {
    revision: u64,
    cols: u32,
    rows: u32,
    show_add_button: bool,
}

/// Screen measurements plus the derived placement of the desktop.
#[derive(Debug, Clone, Default)]
struct LayoutView {
    viewport: Viewport,
    geometry: GridGeometry,
    grid_origin: PointerPosition,
    dock: Option<DockFrame>,
    packed: Vec<PackedItem>,
    desktop_ids: Vec<ItemId>,
    page_count: u32,
    key: Option<PackKey>,
}

impl LayoutView {
    fn refresh(&mut self, state: &LayoutState) {
        self.geometry = GridGeometry::compute(self.viewport, state.settings.dock_visible);
        let key = PackKey {
            revision: state.store.revision(),
            cols: self.geometry.cols,
            rows: self.geometry.rows,
            show_add_button: state.settings.show_add_button,
        };
        if self.key == Some(key) {
            return;
        }

        let mut items = state
            .store
            .desktop_items()
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        self.desktop_ids = items.iter().map(|item| item.id).collect();
        if state.settings.show_add_button {
            items.push(DesktopItem::add_button());
        }
        self.packed = pack(&items, self.geometry.cols, self.geometry.rows);
        self.page_count = page_count(&self.packed);
        self.key = Some(key);
    }

    fn frame<'a>(&'a self, state: &LayoutState) -> LayoutFrame<'a> {
        LayoutFrame {
            geometry: &self.geometry,
            viewport: self.viewport,
            grid_origin: self.grid_origin,
            packed: &self.packed,
            desktop_ids: &self.desktop_ids,
            dock: self.dock.filter(|_| state.settings.dock_visible),
            dock_len: state.store.dock_len(),
            dock_full: state.store.is_dock_full(),
            current_page: state.current_page,
            page_count: self.page_count,
        }
    }
}

/// Layout state, interaction controller, and pending effects for one desktop surface.
pub struct LayoutRuntime {
    state: LayoutState,
    controller: InteractionController,
    view: LayoutView,
    effects: Vec<LayoutEffect>,
    clock: Rc<dyn Clock>,
}

impl Default for LayoutRuntime {
    fn default() -> Self {
        Self::new(LayoutState::default(), Rc::new(SystemClock))
    }
}

impl LayoutRuntime {
    pub fn new(state: LayoutState, clock: Rc<dyn Clock>) -> Self {
        let mut runtime = Self {
            state,
            controller: InteractionController::new(),
            view: LayoutView::default(),
            effects: Vec::new(),
            clock,
        };
        runtime.view.refresh(&runtime.state);
        runtime
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.view.geometry
    }

    pub fn dock_items(&self) -> Vec<&DesktopItem> {
        self.state.store.dock_items()
    }

    pub fn desktop_items(&self) -> Vec<&DesktopItem> {
        self.state.store.desktop_items()
    }

    /// Placements for every desktop item (plus the add-button when shown), across all pages.
    pub fn packed_layout(&self) -> &[PackedItem] {
        &self.view.packed
    }

    pub fn page_count(&self) -> u32 {
        self.view.page_count
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    /// Placements to render on the current page. The dragged item is left out; it follows the
    /// pointer in a floating layer instead.
    pub fn visible_items(&self) -> Vec<&PackedItem> {
        let dragged = self.controller.dragged_item();
        self.view
            .packed
            .iter()
            .filter(|placed| placed.page == self.state.current_page)
            .filter(|placed| Some(placed.item.id) != dragged)
            .collect()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.view.viewport = viewport;
        self.after_change();
    }

    pub fn set_grid_origin(&mut self, origin: PointerPosition) {
        self.view.grid_origin = origin;
    }

    pub fn set_dock_frame(&mut self, dock: Option<DockFrame>) {
        self.view.dock = dock;
    }

    /// Applies one action and queues its effects.
    ///
    /// # Errors
    ///
    /// Returns the reducer's error; the layout is left as it was.
    pub fn dispatch(&mut self, action: LayoutAction) -> Result<(), LayoutError> {
        let result = reduce_layout(&mut self.state, action);
        let outcome = match result {
            Ok(effects) => {
                self.effects.extend(effects);
                Ok(())
            }
            Err(err) => {
                logging::warn!("layout action rejected: {err}");
                Err(err)
            }
        };
        self.after_change();
        outcome
    }

    /// Appends a new item with a freshly allocated id and returns that id.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::AddButtonIsVirtual`] for the add-button kind.
    pub fn add_item(
        &mut self,
        kind: ItemKind,
        footprint: Footprint,
    ) -> Result<ItemId, LayoutError> {
        if matches!(kind, ItemKind::AddButton) {
            return Err(LayoutError::AddButtonIsVirtual);
        }
        let id = self.state.allocate_item_id();
        self.dispatch(LayoutAction::AppendItem {
            item: DesktopItem {
                id,
                footprint,
                kind,
            },
        })?;
        Ok(id)
    }

    /// Pointer went down on an item (dock or desktop, or the add-button).
    pub fn pointer_down(&mut self, item_id: ItemId, pointer: PointerPosition) -> bool {
        let target = if item_id == ItemId::ADD_BUTTON {
            PressTarget {
                item_id,
                region: Region::Desktop,
                index: self.view.desktop_ids.len(),
            }
        } else {
            let Some((region, index, _)) = self.state.store.find(item_id) else {
                return false;
            };
            PressTarget {
                item_id,
                region,
                index,
            }
        };
        let now = self.clock.now_ms();
        self.controller.pointer_down(target, pointer, now)
    }

    /// Pointer went down on a widget's resize handle.
    pub fn begin_resize(&mut self, item_id: ItemId, pointer: PointerPosition) -> bool {
        let footprint = match self.state.store.find(item_id) {
            Some((Region::Desktop, _, item)) if item.is_widget() => item.footprint,
            _ => return false,
        };
        self.controller
            .begin_resize(item_id, footprint, pointer, self.state.edit_mode)
    }

    pub fn pointer_move(&mut self, pointer: PointerPosition) {
        let now = self.clock.now_ms();
        let frame = self.view.frame(&self.state);
        let intents = self.controller.pointer_move(pointer, now, &frame);
        self.apply_intents(intents);
    }

    /// Advances timers to the clock's current reading.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        let frame = self.view.frame(&self.state);
        let intents = self.controller.tick(now, &frame);
        self.apply_intents(intents);
    }

    pub fn pointer_up(&mut self) {
        let intents = self.controller.pointer_up();
        self.apply_intents(intents);
    }

    /// Pointer capture was lost; whatever was already moved stays moved.
    pub fn cancel_pointer(&mut self) {
        self.controller.cancel();
    }

    /// When the host should call [`LayoutRuntime::tick`] next.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.controller.next_deadline_ms()
    }

    /// Drains queued effects in emission order.
    pub fn take_effects(&mut self) -> Vec<LayoutEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Runs queued effects against `host`, in order.
    pub async fn flush_effects(&mut self, host: &LayoutHostContext) {
        for effect in self.take_effects() {
            host.run_effect(effect, &self.state).await;
        }
    }

    /// Hydrates from the host's storage. Boot actions do not queue persistence.
    pub async fn boot(&mut self, host: &LayoutHostContext) {
        for action in host.boot().await {
            let _ = self.dispatch(action);
        }
    }

    fn apply_intents(&mut self, intents: Vec<LayoutAction>) {
        for intent in intents {
            // Rejections are logged by dispatch; the drag stays at its last valid position.
            let _ = self.dispatch(intent);
        }
    }

    fn after_change(&mut self) {
        self.view.refresh(&self.state);

        let last_page = self.view.page_count.max(1) - 1;
        if self.state.current_page > last_page {
            self.state.current_page = last_page;
        }

        if let Some(item_id) = self.controller.dragged_item() {
            match self.state.store.find(item_id) {
                Some((region, index, _)) => self.controller.sync_drag_position(region, index),
                None => {
                    logging::warn!("dragged item {item_id:?} disappeared; ending drag");
                    self.controller.cancel();
                }
            }
        }
    }
}
