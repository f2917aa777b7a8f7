//! Pointer-driven drag/resize state machine.
//!
//! The controller never touches the layout store. It reads a [`LayoutFrame`] describing what is
//! currently on screen and answers every pointer event with the [`LayoutAction`] intents the
//! reducer should apply, in order. The owner feeds those intents to the reducer synchronously and
//! then reports the dragged item's new position back through
//! [`InteractionController::sync_drag_position`].

use crate::geometry::{GridGeometry, Viewport};
use crate::hit_test::{
    desktop_insertion_index, edge_flip_direction, grid_cell_at, DockFrame, FlipDirection,
};
use crate::model::{Footprint, ItemId, PointerPosition, Region, MAX_WIDGET_SPAN};
use crate::packing::PackedItem;
use crate::reducer::LayoutAction;
use crate::timers::Timer;

/// How long a pointer must stay down on an item before it lifts into a drag.
pub const LONG_PRESS_MS: u64 = 800;
/// Movement allowed during a press before it stops counting as a press.
pub const PRESS_MOVE_TOLERANCE_PX: f64 = 10.0;
/// Interval between automatic page flips while hovering an edge band.
pub const EDGE_FLIP_INTERVAL_MS: u64 = 600;

/// Read-only view of the rendered layout that pointer events are interpreted against.
#[derive(Debug, Clone, Copy)]
pub struct LayoutFrame<'a> {
    pub geometry: &'a GridGeometry,
    pub viewport: Viewport,
    /// Screen position of the grid's top-left corner.
    pub grid_origin: PointerPosition,
    /// Desktop placements, add-button included when shown.
    pub packed: &'a [PackedItem],
    pub desktop_ids: &'a [ItemId],
    /// `None` while the dock is hidden or not yet measured.
    pub dock: Option<DockFrame>,
    pub dock_len: usize,
    pub dock_full: bool,
    pub current_page: u32,
    pub page_count: u32,
}

/// The item under a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressTarget {
    pub item_id: ItemId,
    pub region: Region,
    /// Index within the region's compacted list.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PressSession {
    pub target: PressTarget,
    pub origin: PointerPosition,
    /// `None` for targets that can be clicked but never dragged (the add-button).
    long_press: Option<Timer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub item_id: ItemId,
    /// Where the item currently sits; updated after every committed move.
    pub region: Region,
    pub index: usize,
    pub pointer: PointerPosition,
    edge_flip: Option<EdgeFlip>,
    /// A refused drop onto the full dock has been logged for this drag.
    dock_full_logged: bool,
}

impl DragSession {
    fn lifted(target: PressTarget, pointer: PointerPosition) -> Self {
        Self {
            item_id: target.item_id,
            region: target.region,
            index: target.index,
            pointer,
            edge_flip: None,
            dock_full_logged: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct EdgeFlip {
    direction: FlipDirection,
    timer: Timer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub item_id: ItemId,
    pub origin: PointerPosition,
    pub start: Footprint,
    /// Last footprint proposed to the reducer.
    pub current: Footprint,
}

/// Interaction state. Timers are owned by the session that armed them, so every transition out
/// of a state drops its pending timers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionPhase {
    #[default]
    Idle,
    Pressing(PressSession),
    Dragging(DragSession),
    Resizing(ResizeSession),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionController {
    phase: InteractionPhase,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &InteractionPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, InteractionPhase::Idle)
    }

    /// Item lifted into a drag, if any. Renderers draw it in a floating layer instead of at its
    /// packed position.
    pub fn dragged_item(&self) -> Option<ItemId> {
        match &self.phase {
            InteractionPhase::Dragging(session) => Some(session.item_id),
            _ => None,
        }
    }

    /// Earliest pending timer deadline, for hosts that schedule a wake-up instead of polling.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        match &self.phase {
            InteractionPhase::Pressing(press) => {
                press.long_press.as_ref().and_then(Timer::deadline_ms)
            }
            InteractionPhase::Dragging(drag) => drag
                .edge_flip
                .as_ref()
                .and_then(|flip| flip.timer.deadline_ms()),
            InteractionPhase::Idle | InteractionPhase::Resizing(_) => None,
        }
    }

    /// Starts a press on `target`. Ignored (returns `false`) while another session is active.
    pub fn pointer_down(
        &mut self,
        target: PressTarget,
        pointer: PointerPosition,
        now_ms: u64,
    ) -> bool {
        if !self.is_idle() {
            return false;
        }
        let long_press =
            (target.item_id != ItemId::ADD_BUTTON).then(|| Timer::one_shot(now_ms, LONG_PRESS_MS));
        self.phase = InteractionPhase::Pressing(PressSession {
            target,
            origin: pointer,
            long_press,
        });
        true
    }

    /// Grabs a widget's resize handle. Only valid from idle, in edit mode, for desktop widgets;
    /// the caller checks the item kind.
    pub fn begin_resize(
        &mut self,
        item_id: ItemId,
        footprint: Footprint,
        pointer: PointerPosition,
        edit_mode: bool,
    ) -> bool {
        if !self.is_idle() || !edit_mode || item_id == ItemId::ADD_BUTTON {
            return false;
        }
        let start = footprint.clamped_to_widget_range();
        self.phase = InteractionPhase::Resizing(ResizeSession {
            item_id,
            origin: pointer,
            start,
            current: start,
        });
        true
    }

    /// Interprets a pointer move. Returns the intents to apply, in order.
    pub fn pointer_move(
        &mut self,
        pointer: PointerPosition,
        now_ms: u64,
        frame: &LayoutFrame<'_>,
    ) -> Vec<LayoutAction> {
        match &mut self.phase {
            InteractionPhase::Idle => Vec::new(),
            InteractionPhase::Pressing(press) => {
                // The long press may have elapsed before the host got round to ticking.
                if !long_press_fired(press, now_ms) {
                    if press.origin.distance_to(pointer) > PRESS_MOVE_TOLERANCE_PX {
                        self.phase = InteractionPhase::Idle;
                    }
                    return Vec::new();
                }
                let mut drag = DragSession::lifted(press.target, pointer);
                update_edge_flip(&mut drag, now_ms, frame);
                let intents = drag_intents(&mut drag, frame).into_iter().collect();
                self.phase = InteractionPhase::Dragging(drag);
                intents
            }
            InteractionPhase::Resizing(resize) => resize_intents(resize, pointer, frame.geometry),
            InteractionPhase::Dragging(drag) => {
                drag.pointer = pointer;
                update_edge_flip(drag, now_ms, frame);
                drag_intents(drag, frame).into_iter().collect()
            }
        }
    }

    /// Advances timers to `now_ms`: lifts a long press into a drag and fires edge flips.
    pub fn tick(&mut self, now_ms: u64, frame: &LayoutFrame<'_>) -> Vec<LayoutAction> {
        match &mut self.phase {
            InteractionPhase::Pressing(press) => {
                if long_press_fired(press, now_ms) {
                    let mut drag = DragSession::lifted(press.target, press.origin);
                    update_edge_flip(&mut drag, now_ms, frame);
                    self.phase = InteractionPhase::Dragging(drag);
                }
                Vec::new()
            }
            InteractionPhase::Dragging(drag) => flip_intents(drag, now_ms, frame),
            InteractionPhase::Idle | InteractionPhase::Resizing(_) => Vec::new(),
        }
    }

    /// Ends the current session. A press that never became a drag is a click.
    pub fn pointer_up(&mut self) -> Vec<LayoutAction> {
        match std::mem::take(&mut self.phase) {
            InteractionPhase::Pressing(press) => vec![LayoutAction::ActivateItem {
                item_id: press.target.item_id,
            }],
            InteractionPhase::Idle
            | InteractionPhase::Dragging(_)
            | InteractionPhase::Resizing(_) => Vec::new(),
        }
    }

    /// Pointer capture was lost. Ends any session without activating; committed moves stay.
    pub fn cancel(&mut self) {
        self.phase = InteractionPhase::Idle;
    }

    /// Records where the dragged item ended up after the reducer applied the last intents.
    pub fn sync_drag_position(&mut self, region: Region, index: usize) {
        if let InteractionPhase::Dragging(drag) = &mut self.phase {
            drag.region = region;
            drag.index = index;
        }
    }
}

fn long_press_fired(press: &mut PressSession, now_ms: u64) -> bool {
    press
        .long_press
        .as_mut()
        .is_some_and(|timer| timer.poll(now_ms) > 0)
}

fn resize_intents(
    resize: &mut ResizeSession,
    pointer: PointerPosition,
    geometry: &GridGeometry,
) -> Vec<LayoutAction> {
    if !geometry.is_measured() {
        return Vec::new();
    }
    let span = |start: i32, delta_px: f64, cell_px: f64| {
        let delta = (delta_px / cell_px).round();
        (f64::from(start) + delta).clamp(1.0, f64::from(MAX_WIDGET_SPAN)) as i32
    };
    let next = Footprint::new(
        span(
            resize.start.w,
            pointer.x - resize.origin.x,
            geometry.cell_width,
        ),
        span(
            resize.start.h,
            pointer.y - resize.origin.y,
            geometry.cell_height,
        ),
    );
    if next == resize.current {
        return Vec::new();
    }
    resize.current = next;
    vec![LayoutAction::ResizeItem {
        item_id: resize.item_id,
        w: next.w,
        h: next.h,
    }]
}

/// Arms, keeps, or cancels the edge-flip timer for the pointer's current position.
fn update_edge_flip(drag: &mut DragSession, now_ms: u64, frame: &LayoutFrame<'_>) {
    let wanted = edge_flip_direction(drag.pointer.x, frame.viewport.width)
        .filter(|direction| can_flip(*direction, frame.current_page, frame.page_count));
    match (wanted, &drag.edge_flip) {
        (Some(direction), Some(flip)) if flip.direction == direction => {}
        (Some(direction), _) => {
            drag.edge_flip = Some(EdgeFlip {
                direction,
                timer: Timer::repeating(now_ms, EDGE_FLIP_INTERVAL_MS),
            });
        }
        (None, _) => drag.edge_flip = None,
    }
}

fn flip_intents(
    drag: &mut DragSession,
    now_ms: u64,
    frame: &LayoutFrame<'_>,
) -> Vec<LayoutAction> {
    let Some(flip) = drag.edge_flip.as_mut() else {
        return Vec::new();
    };
    let direction = flip.direction;
    let fires = flip.timer.poll(now_ms);

    let mut page = frame.current_page;
    let mut intents = Vec::new();
    for _ in 0..fires {
        if !can_flip(direction, page, frame.page_count) {
            break;
        }
        page = match direction {
            FlipDirection::Previous => page - 1,
            FlipDirection::Next => page + 1,
        };
        intents.push(LayoutAction::FlipPage {
            direction,
            page_count: frame.page_count,
        });
    }
    if !can_flip(direction, page, frame.page_count) {
        drag.edge_flip = None;
    }
    intents
}

fn can_flip(direction: FlipDirection, page: u32, page_count: u32) -> bool {
    match direction {
        FlipDirection::Previous => page > 0,
        FlipDirection::Next => page + 1 < page_count,
    }
}

/// The single move a drag at its current pointer position proposes, if any.
///
/// The dock is checked first so its slop area wins over the grid cells underneath it.
fn drag_intents(drag: &mut DragSession, frame: &LayoutFrame<'_>) -> Option<LayoutAction> {
    if let Some(dock) = frame.dock.filter(|dock| dock.contains(drag.pointer)) {
        if drag.region == Region::Desktop && frame.dock_full {
            if !drag.dock_full_logged {
                leptos::logging::warn!("dock is full; keeping {:?} on the desktop", drag.item_id);
                drag.dock_full_logged = true;
            }
            return None;
        }
        let slot = dock.slot_index(drag.pointer, frame.dock_len)?;
        return propose_move(drag, Region::Dock, slot);
    }

    if !frame.geometry.is_measured() {
        return None;
    }
    let cell = grid_cell_at(drag.pointer, frame.grid_origin, frame.geometry)?;
    let index = desktop_insertion_index(frame.packed, frame.desktop_ids, frame.current_page, cell);
    propose_move(drag, Region::Desktop, index)
}

fn propose_move(drag: &DragSession, target: Region, index: usize) -> Option<LayoutAction> {
    if target == drag.region {
        // Same-region indices are read before removal, so `index + 1` also means "stay put".
        let resulting = if index > drag.index { index - 1 } else { index };
        if resulting == drag.index {
            return None;
        }
    }
    Some(LayoutAction::MoveItem {
        item_id: drag.item_id,
        target,
        index,
    })
}
