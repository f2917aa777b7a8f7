//! Desktop layout engine for the new-tab shell.
//!
//! Items live in two regions: a dock of fixed, position-stable slots and an ordered desktop that
//! is bin-packed onto paginated grids. Pointer events go through the interaction controller,
//! which proposes [`LayoutAction`]s; [`reduce_layout`] applies them and emits [`LayoutEffect`]s
//! for the host to execute.

pub mod geometry;
pub mod host;
pub mod interaction;
pub mod model;
pub mod packing;
pub mod persistence;
pub mod reducer;
pub mod runtime;
pub mod store;
pub mod timers;

pub use geometry::{GridGeometry, Viewport};
pub use hit_test::{DockFrame, FlipDirection};
pub use host::{ActivationHost, LayoutHostContext, NoopActivationHost};
pub use interaction::{InteractionController, InteractionPhase, LayoutFrame, PressTarget};
pub use model::*;
pub use packing::{pack, page_count, PackedItem, Placeable};
pub use persistence::{
    load_layout_settings, load_layout_snapshot, persist_layout_settings, persist_layout_snapshot,
};
pub use reducer::{reduce_layout, LayoutAction, LayoutEffect};
pub use runtime::LayoutRuntime;
pub use store::{LayoutError, LayoutStore};
