use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::store::LayoutStore;

pub const LAYOUT_SCHEMA_VERSION: u32 = 1;
/// Reserved dock slots (`R`): indices `[0, R)` of the layout array.
pub const DEFAULT_DOCK_CAPACITY: usize = 8;
/// Largest widget span on either axis, in grid cells.
pub const MAX_WIDGET_SPAN: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl ItemId {
    /// Reserved id of the synthetic add-button appended to packing input.
    pub const ADD_BUTTON: ItemId = ItemId(u64::MAX);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Dock,
    Desktop,
}

/// Width and height of an item in grid cells.
///
/// Raw spans are kept as loaded; [`Footprint::cells`] yields the normalized (>= 1) spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    #[serde(default = "unit_span", deserialize_with = "lenient_span")]
    pub w: i32,
    #[serde(default = "unit_span", deserialize_with = "lenient_span")]
    pub h: i32,
}

impl Footprint {
    pub const UNIT: Footprint = Footprint { w: 1, h: 1 };

    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Spans with zero or negative values replaced by 1.
    pub fn cells(self) -> (u32, u32) {
        (self.w.max(1) as u32, self.h.max(1) as u32)
    }

    /// Clamps both spans into `[1, MAX_WIDGET_SPAN]`.
    pub fn clamped_to_widget_range(self) -> Self {
        Self {
            w: self.w.clamp(1, MAX_WIDGET_SPAN),
            h: self.h.clamp(1, MAX_WIDGET_SPAN),
        }
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::UNIT
    }
}

fn unit_span() -> i32 {
    1
}

// Footprints come from user-editable blobs; anything that is not a usable number loads as 1.
fn lenient_span<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let span = match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
            .map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            .unwrap_or(1),
        Value::String(s) => s.trim().parse::<i32>().unwrap_or(1),
        _ => 1,
    };
    Ok(span)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// Shortcut icon. Activation either opens `url` or asks the window manager for an app window.
    Icon {
        title: String,
        url: String,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        opens_in_window: bool,
    },
    /// Live widget (clock, notes, weather, ...). `content` is opaque to the layout core.
    Widget {
        widget: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        content: Value,
    },
    /// Synthetic trailing item that only exists in packing input; never persisted.
    AddButton,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesktopItem {
    pub id: ItemId,
    #[serde(default)]
    pub footprint: Footprint,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl DesktopItem {
    pub fn icon(id: ItemId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            footprint: Footprint::UNIT,
            kind: ItemKind::Icon {
                title: title.into(),
                url: url.into(),
                color: None,
                opens_in_window: false,
            },
        }
    }

    pub fn app_icon(id: ItemId, title: impl Into<String>, url: impl Into<String>) -> Self {
        let mut item = Self::icon(id, title, url);
        if let ItemKind::Icon {
            opens_in_window, ..
        } = &mut item.kind
        {
            *opens_in_window = true;
        }
        item
    }

    pub fn widget(id: ItemId, widget: impl Into<String>, w: i32, h: i32) -> Self {
        Self {
            id,
            footprint: Footprint::new(w, h),
            kind: ItemKind::Widget {
                widget: widget.into(),
                title: None,
                content: Value::Null,
            },
        }
    }

    pub fn add_button() -> Self {
        Self {
            id: ItemId::ADD_BUTTON,
            footprint: Footprint::UNIT,
            kind: ItemKind::AddButton,
        }
    }

    pub fn is_widget(&self) -> bool {
        matches!(self.kind, ItemKind::Widget { .. })
    }

    pub fn is_add_button(&self) -> bool {
        matches!(self.kind, ItemKind::AddButton) || self.id == ItemId::ADD_BUTTON
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(default = "enabled")]
    pub dock_visible: bool,
    #[serde(default = "enabled")]
    pub show_add_button: bool,
}

fn enabled() -> bool {
    true
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            dock_visible: true,
            show_add_button: true,
        }
    }
}

/// Persisted shape of the layout: one flat array, dock slots first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub schema_version: u32,
    pub dock_capacity: usize,
    #[serde(deserialize_with = "lenient_slots")]
    pub slots: Vec<Option<DesktopItem>>,
}

// A single corrupt entry turns into an empty slot instead of discarding the whole layout.
fn lenient_slots<'de, D>(deserializer: D) -> Result<Vec<Option<DesktopItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(decode_slots(raw))
}

pub(crate) fn decode_slots(raw: Vec<Value>) -> Vec<Option<DesktopItem>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            if value.is_null() {
                return None;
            }
            match serde_json::from_value::<DesktopItem>(value) {
                Ok(item) => Some(item),
                Err(err) => {
                    leptos::logging::warn!("dropping unreadable layout slot {index}: {err}");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: PointerPosition) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Reducer-owned state: the layout store plus the small amount of shell state around it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    pub store: LayoutStore,
    pub settings: LayoutSettings,
    pub current_page: u32,
    pub edit_mode: bool,
    pub next_item_id: u64,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::from_snapshot(default_snapshot())
    }
}

impl LayoutState {
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            schema_version: LAYOUT_SCHEMA_VERSION,
            dock_capacity: self.store.dock_capacity(),
            slots: self.store.layout_array(),
        }
    }

    pub fn from_snapshot(snapshot: LayoutSnapshot) -> Self {
        let store = LayoutStore::from_layout_array(snapshot.slots, snapshot.dock_capacity);
        let next_item_id = store.max_item_id().map_or(1, |id| id.0.saturating_add(1));
        Self {
            store,
            settings: LayoutSettings::default(),
            current_page: 0,
            edit_mode: false,
            next_item_id,
        }
    }

    /// Hands out a fresh id for a new item.
    pub fn allocate_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id = self.next_item_id.saturating_add(1);
        id
    }
}

/// First-run layout.
pub fn default_snapshot() -> LayoutSnapshot {
    let mut slots = vec![
        Some(DesktopItem::icon(ItemId(1), "Search", "https://www.google.com")),
        Some(DesktopItem::icon(ItemId(2), "Mail", "https://mail.google.com")),
        Some(DesktopItem::app_icon(ItemId(3), "Notes", "app://notes")),
        Some(DesktopItem::app_icon(ItemId(4), "Calculator", "app://calculator")),
        Some(DesktopItem::app_icon(ItemId(5), "Settings", "app://settings")),
    ];
    slots.resize(DEFAULT_DOCK_CAPACITY, None);

    let mut clock = DesktopItem::widget(ItemId(6), "clock", 2, 2);
    if let ItemKind::Widget { content, .. } = &mut clock.kind {
        *content = json!({ "format": "24h" });
    }
    slots.push(Some(clock));
    slots.push(Some(DesktopItem::icon(ItemId(7), "GitHub", "https://github.com")));
    slots.push(Some(DesktopItem::icon(ItemId(8), "YouTube", "https://www.youtube.com")));
    slots.push(Some(DesktopItem::icon(ItemId(9), "Wikipedia", "https://www.wikipedia.org")));
    slots.push(Some(DesktopItem::widget(ItemId(10), "notes", 2, 1)));

    LayoutSnapshot {
        schema_version: LAYOUT_SCHEMA_VERSION,
        dock_capacity: DEFAULT_DOCK_CAPACITY,
        slots,
    }
}
