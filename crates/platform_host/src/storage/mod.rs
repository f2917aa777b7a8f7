//! Persistence contracts for durable layout state and lightweight settings.

pub mod app_state;
pub mod prefs;
