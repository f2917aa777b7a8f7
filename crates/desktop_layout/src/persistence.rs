//! Layout persistence adapters over the host storage ports.

use platform_host::{
    load_app_state_with_migration, load_pref_with, save_app_state_with, save_pref_with,
    AppStateEnvelope, AppStateStore, PrefsStore, LAYOUT_STATE_NAMESPACE,
};
use serde_json::Value;

use crate::model::{
    decode_slots, LayoutSettings, LayoutSnapshot, LayoutState, DEFAULT_DOCK_CAPACITY,
    LAYOUT_SCHEMA_VERSION,
};

/// Preference key for [`LayoutSettings`].
pub const LAYOUT_SETTINGS_KEY: &str = "desktop.layout.settings.v1";

/// Upgrades older layout envelopes.
///
/// Schema 0 stored the bare layout array with the default dock capacity.
fn migrate_layout_snapshot(
    schema_version: u32,
    envelope: &AppStateEnvelope,
) -> Result<Option<LayoutSnapshot>, String> {
    match schema_version {
        0 => {
            let Value::Array(raw) = envelope.payload.clone() else {
                return Err("schema 0 layout payload is not an array".to_string());
            };
            leptos::logging::log!("migrating layout snapshot from schema 0");
            Ok(Some(LayoutSnapshot {
                schema_version: LAYOUT_SCHEMA_VERSION,
                dock_capacity: DEFAULT_DOCK_CAPACITY,
                slots: decode_slots(raw),
            }))
        }
        _ => Ok(None),
    }
}

/// Loads the persisted layout, `None` on first run or when the stored schema is unknown.
///
/// # Errors
///
/// Returns an error when the store fails or the payload cannot be decoded.
pub async fn load_layout_snapshot<S: AppStateStore + ?Sized>(
    store: &S,
) -> Result<Option<LayoutSnapshot>, String> {
    load_app_state_with_migration(
        store,
        LAYOUT_STATE_NAMESPACE,
        LAYOUT_SCHEMA_VERSION,
        migrate_layout_snapshot,
    )
    .await
}

/// Persists the current layout array.
///
/// # Errors
///
/// Returns an error when serialization or the store save fails.
pub async fn persist_layout_snapshot<S: AppStateStore + ?Sized>(
    store: &S,
    state: &LayoutState,
) -> Result<(), String> {
    save_app_state_with(
        store,
        LAYOUT_STATE_NAMESPACE,
        LAYOUT_SCHEMA_VERSION,
        &state.snapshot(),
    )
    .await
}

/// Loads persisted settings; missing fields take their defaults.
///
/// # Errors
///
/// Returns an error when the store fails or the stored JSON is malformed.
pub async fn load_layout_settings<S: PrefsStore + ?Sized>(
    store: &S,
) -> Result<Option<LayoutSettings>, String> {
    load_pref_with(store, LAYOUT_SETTINGS_KEY).await
}

/// Persists layout settings.
///
/// # Errors
///
/// Returns an error when serialization or the store save fails.
pub async fn persist_layout_settings<S: PrefsStore + ?Sized>(
    store: &S,
    settings: &LayoutSettings,
) -> Result<(), String> {
    save_pref_with(store, LAYOUT_SETTINGS_KEY, settings).await
}
