//! Host-side execution of reducer effects and boot hydration.
//!
//! The layout core only emits [`LayoutEffect`] intents. This module owns the injected ports those
//! intents are carried out against: durable layout storage, lightweight prefs, and whatever opens
//! windows and links in the surrounding shell.

use std::rc::Rc;

use leptos::logging;
use platform_host::{AppStateStore, NoopAppStateStore, NoopPrefsStore, PrefsStore};

use crate::model::{default_snapshot, ItemId, LayoutState};
use crate::persistence;
use crate::reducer::{LayoutAction, LayoutEffect};

/// Shell services that react to item activation.
pub trait ActivationHost {
    /// Opens the app behind an icon flagged to open in a window.
    fn open_app_window(&self, item_id: ItemId, url: &str);
    /// Opens a URL outside the shell.
    fn open_external_url(&self, url: &str);
    /// Starts the "add item" flow.
    fn request_add_item(&self);
}

#[derive(Debug, Clone, Copy, Default)]
/// Activation host that ignores every request.
pub struct NoopActivationHost;

impl ActivationHost for NoopActivationHost {
    fn open_app_window(&self, _item_id: ItemId, _url: &str) {}

    fn open_external_url(&self, _url: &str) {}

    fn request_add_item(&self) {}
}

#[derive(Clone)]
/// Service bundle the layout runtime's effects are executed against.
pub struct LayoutHostContext {
    app_state: Rc<dyn AppStateStore>,
    prefs: Rc<dyn PrefsStore>,
    activation: Rc<dyn ActivationHost>,
}

impl Default for LayoutHostContext {
    fn default() -> Self {
        Self {
            app_state: Rc::new(NoopAppStateStore),
            prefs: Rc::new(NoopPrefsStore),
            activation: Rc::new(NoopActivationHost),
        }
    }
}

impl LayoutHostContext {
    pub fn new(
        app_state: Rc<dyn AppStateStore>,
        prefs: Rc<dyn PrefsStore>,
        activation: Rc<dyn ActivationHost>,
    ) -> Self {
        Self {
            app_state,
            prefs,
            activation,
        }
    }

    /// Returns the configured layout persistence service.
    pub fn app_state_store(&self) -> Rc<dyn AppStateStore> {
        self.app_state.clone()
    }

    /// Returns the configured preference service.
    pub fn prefs_store(&self) -> Rc<dyn PrefsStore> {
        self.prefs.clone()
    }

    /// Loads persisted settings and layout and returns the actions that hydrate a runtime.
    ///
    /// On first run the default layout is seeded and written back so later boots find it. Load
    /// failures are logged and fall back to the defaults.
    pub async fn boot(&self) -> Vec<LayoutAction> {
        let mut actions = Vec::new();

        match persistence::load_layout_settings(self.prefs.as_ref()).await {
            Ok(Some(settings)) => actions.push(LayoutAction::HydrateSettings { settings }),
            Ok(None) => {}
            Err(err) => logging::warn!("layout settings load failed: {err}"),
        }

        let snapshot = match persistence::load_layout_snapshot(self.app_state.as_ref()).await {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => {
                let seeded = LayoutState::from_snapshot(default_snapshot());
                if let Err(err) =
                    persistence::persist_layout_snapshot(self.app_state.as_ref(), &seeded).await
                {
                    logging::warn!("seeding default layout failed: {err}");
                }
                None
            }
            Err(err) => {
                logging::warn!("layout snapshot load failed: {err}");
                None
            }
        };
        actions.push(LayoutAction::HydrateLayout {
            snapshot: snapshot.unwrap_or_else(default_snapshot),
        });
        actions
    }

    /// Executes a single [`LayoutEffect`] emitted by the reducer against `state`.
    pub async fn run_effect(&self, effect: LayoutEffect, state: &LayoutState) {
        match effect {
            LayoutEffect::PersistLayout => {
                if let Err(err) =
                    persistence::persist_layout_snapshot(self.app_state.as_ref(), state).await
                {
                    logging::warn!("persist layout failed: {err}");
                }
            }
            LayoutEffect::PersistSettings => {
                if let Err(err) =
                    persistence::persist_layout_settings(self.prefs.as_ref(), &state.settings)
                        .await
                {
                    logging::warn!("persist layout settings failed: {err}");
                }
            }
            LayoutEffect::OpenAppWindow { item_id, url } => {
                self.activation.open_app_window(item_id, &url)
            }
            LayoutEffect::OpenExternalUrl(url) => self.activation.open_external_url(&url),
            LayoutEffect::RequestAddItem => self.activation.request_add_item(),
        }
    }
}
