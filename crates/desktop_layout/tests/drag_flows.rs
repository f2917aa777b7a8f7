use std::rc::Rc;

use desktop_layout::{
    DesktopItem, DockFrame, ItemId, ItemKind, LayoutAction, LayoutEffect, LayoutRuntime,
    LayoutSnapshot, LayoutState, PointerPosition, Region, Viewport,
};
use platform_host::ManualClock;

const LONG_PRESS_MS: u64 = 800;

/// 1920 x 900 viewport: an 8 x 2 grid of 150 x 110 px cells anchored at the origin, and a dock
/// whose slot `n` starts at x = 610 + 60n.
fn runtime_with(state: LayoutState) -> (LayoutRuntime, ManualClock) {
    let clock = ManualClock::starting_at(0);
    let mut runtime = LayoutRuntime::new(state, Rc::new(clock.clone()));
    runtime.set_viewport(Viewport::new(1920.0, 900.0));
    runtime.set_grid_origin(PointerPosition::new(0.0, 0.0));
    runtime.set_dock_frame(Some(DockFrame {
        left: 600.0,
        top: 780.0,
        width: 520.0,
        height: 80.0,
        padding: 10.0,
        slot_width: 60.0,
    }));
    (runtime, clock)
}

fn lift(runtime: &mut LayoutRuntime, clock: &ManualClock, item_id: ItemId, at: PointerPosition) {
    assert!(runtime.pointer_down(item_id, at), "press {item_id:?}");
    clock.advance(LONG_PRESS_MS);
    runtime.tick();
    assert_eq!(runtime.controller().dragged_item(), Some(item_id));
}

fn ids(items: Vec<&DesktopItem>) -> Vec<u64> {
    items.into_iter().map(|item| item.id.0).collect()
}

fn icon(id: u64) -> DesktopItem {
    DesktopItem::icon(ItemId(id), format!("icon {id}"), format!("https://{id}.test"))
}

#[test]
fn dragging_a_desktop_icon_into_the_dock_then_along_it() {
    let (mut runtime, clock) = runtime_with(LayoutState::default());
    lift(&mut runtime, &clock, ItemId(7), PointerPosition::new(375.0, 55.0));

    runtime.pointer_move(PointerPosition::new(670.0, 800.0));
    assert_eq!(ids(runtime.dock_items()), vec![1, 7, 2, 3, 4, 5]);
    assert_eq!(ids(runtime.desktop_items()), vec![6, 8, 9, 10]);

    runtime.pointer_move(PointerPosition::new(850.0, 800.0));
    runtime.pointer_up();

    assert_eq!(ids(runtime.dock_items()), vec![1, 2, 3, 7, 4, 5]);
    assert_eq!(runtime.state().store.dock_slots().len(), 8);
    assert_eq!(
        runtime.take_effects(),
        vec![LayoutEffect::PersistLayout, LayoutEffect::PersistLayout]
    );
    assert!(runtime.controller().is_idle());
}

#[test]
fn move_arriving_before_the_long_press_tick_still_lifts() {
    let (mut runtime, clock) = runtime_with(LayoutState::default());
    assert!(runtime.pointer_down(ItemId(7), PointerPosition::new(375.0, 55.0)));
    clock.advance(900);
    runtime.pointer_move(PointerPosition::new(400.0, 55.0));
    runtime.tick();

    assert_eq!(runtime.controller().dragged_item(), Some(ItemId(7)));
    runtime.pointer_up();
    assert!(runtime.take_effects().is_empty(), "no activation and no move");
}

#[test]
fn full_dock_refuses_desktop_items_and_keeps_them_in_place() {
    let (mut runtime, clock) = runtime_with(LayoutState::default());
    for id in [8, 9, 10] {
        runtime
            .dispatch(LayoutAction::MoveItem {
                item_id: ItemId(id),
                target: Region::Dock,
                index: 99,
            })
            .expect("fill dock");
    }
    assert!(runtime.state().store.is_dock_full());
    let dock_before = ids(runtime.dock_items());

    lift(&mut runtime, &clock, ItemId(7), PointerPosition::new(375.0, 55.0));
    runtime.pointer_move(PointerPosition::new(670.0, 800.0));
    runtime.pointer_up();

    assert_eq!(ids(runtime.dock_items()), dock_before);
    assert_eq!(ids(runtime.desktop_items()), vec![6, 7]);
}

#[test]
fn dock_widget_dragged_to_desktop_front_packs_as_single_cell() {
    let mut slots = vec![
        Some(DesktopItem::widget(ItemId(1), "clock", 2, 2)),
        Some(icon(2)),
    ];
    slots.resize(8, None);
    slots.push(Some(icon(3)));
    slots.push(Some(icon(4)));
    let state = LayoutState::from_snapshot(LayoutSnapshot {
        schema_version: 1,
        dock_capacity: 8,
        slots,
    });
    let (mut runtime, clock) = runtime_with(state);

    lift(&mut runtime, &clock, ItemId(1), PointerPosition::new(640.0, 800.0));
    runtime.pointer_move(PointerPosition::new(75.0, 55.0));
    runtime.pointer_up();

    assert_eq!(ids(runtime.desktop_items()), vec![1, 3, 4]);
    let first = &runtime.packed_layout()[0];
    assert_eq!(first.item.id, ItemId(1));
    assert_eq!((first.x, first.y, first.page, first.w, first.h), (0, 0, 0, 1, 1));
    assert_eq!(runtime.state().store.dock_slots()[0], None);
    assert_eq!(
        runtime.state().store.dock_slots()[1].as_ref().map(|item| item.id),
        Some(ItemId(2))
    );
}

#[test]
fn holding_at_the_left_edge_flips_back_once_per_interval_and_stops() {
    let (mut runtime, clock) = runtime_with(LayoutState::default());
    for n in 0..30 {
        runtime
            .add_item(
                ItemKind::Icon {
                    title: format!("extra {n}"),
                    url: format!("https://extra{n}.test"),
                    color: None,
                    opens_in_window: false,
                },
                Default::default(),
            )
            .expect("add icon");
    }
    assert_eq!(runtime.page_count(), 3);
    runtime
        .dispatch(LayoutAction::SetPage {
            page: 1,
            page_count: 3,
        })
        .expect("go to page 1");
    let _ = runtime.take_effects();

    lift(&mut runtime, &clock, ItemId(7), PointerPosition::new(900.0, 55.0));
    runtime.pointer_move(PointerPosition::new(10.0, 300.0));

    clock.advance(599);
    runtime.tick();
    assert_eq!(runtime.current_page(), 1);

    clock.advance(1);
    runtime.tick();
    assert_eq!(runtime.current_page(), 0);

    for _ in 0..3 {
        clock.advance(600);
        runtime.tick();
        assert_eq!(runtime.current_page(), 0);
    }
    assert_eq!(runtime.next_deadline_ms(), None);
    runtime.pointer_up();
    assert!(runtime.take_effects().is_empty(), "page flips are not persisted");
}

#[test]
fn live_resize_reflows_neighbours_on_every_move() {
    let (mut runtime, _) = runtime_with(LayoutState::default());
    runtime
        .dispatch(LayoutAction::SetEditMode { enabled: true })
        .expect("edit mode");

    // Notes widget (id 10) is 2x1 at (5, 0); the add-button trails at (7, 0).
    assert!(runtime.begin_resize(ItemId(10), PointerPosition::new(1050.0, 110.0)));
    runtime.pointer_move(PointerPosition::new(1350.0, 110.0));

    let placed = |id: ItemId| {
        runtime
            .packed_layout()
            .iter()
            .find(|placed| placed.item.id == id)
            .map(|placed| (placed.x, placed.y, placed.w, placed.h))
    };
    assert_eq!(placed(ItemId(10)), Some((2, 1, 4, 1)));
    assert_eq!(placed(ItemId::ADD_BUTTON), Some((5, 0, 1, 1)));

    runtime.pointer_up();
    assert_eq!(runtime.take_effects(), vec![LayoutEffect::PersistLayout]);
}

#[test]
fn resize_handle_requires_edit_mode_and_a_widget() {
    let (mut runtime, _) = runtime_with(LayoutState::default());
    assert!(!runtime.begin_resize(ItemId(10), PointerPosition::new(0.0, 0.0)));
    runtime
        .dispatch(LayoutAction::SetEditMode { enabled: true })
        .expect("edit mode");
    assert!(!runtime.begin_resize(ItemId(7), PointerPosition::new(0.0, 0.0)));
    assert!(!runtime.begin_resize(ItemId(3), PointerPosition::new(0.0, 0.0)));
}

#[test]
fn deleting_and_reappending_the_last_item_repacks_identically() {
    let (mut runtime, _) = runtime_with(LayoutState::default());
    let before = runtime.packed_layout().to_vec();
    let notes = runtime
        .desktop_items()
        .last()
        .map(|item| (*item).clone())
        .expect("last desktop item");

    runtime
        .dispatch(LayoutAction::DeleteItem { item_id: notes.id })
        .expect("delete");
    runtime
        .dispatch(LayoutAction::AppendItem { item: notes })
        .expect("re-append");

    assert_eq!(runtime.packed_layout(), before.as_slice());
}

#[test]
fn dragging_the_add_button_is_a_click() {
    let (mut runtime, clock) = runtime_with(LayoutState::default());
    assert!(runtime.pointer_down(ItemId::ADD_BUTTON, PointerPosition::new(1125.0, 55.0)));
    clock.advance(LONG_PRESS_MS * 2);
    runtime.tick();
    assert_eq!(runtime.controller().dragged_item(), None);
    runtime.pointer_up();
    assert_eq!(runtime.take_effects(), vec![LayoutEffect::RequestAddItem]);
}
