//! Typed host-domain contracts shared by the desktop layout core and its platform adapters.
//!
//! This crate is the boundary for persistence and time. It exposes the versioned state envelope,
//! the durable [`AppStateStore`] and lightweight [`PrefsStore`] ports with in-memory and no-op
//! adapters, and the [`Clock`] abstraction that drives interaction timers. Browser-backed adapters
//! implement these traits outside of this crate.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;
pub mod time;

pub use storage::app_state::{
    build_app_state_envelope, load_app_state_with_migration, migrate_envelope_payload,
    save_app_state_with, AppStateEnvelope, AppStateStore, AppStateStoreFuture,
    MemoryAppStateStore, NoopAppStateStore, APP_STATE_ENVELOPE_VERSION, LAYOUT_STATE_NAMESPACE,
};
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsStore, PrefsStoreFuture,
};
pub use time::{
    next_monotonic_timestamp_ms, unix_time_ms_now, Clock, ManualClock, SystemClock,
};
