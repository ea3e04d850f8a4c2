//! Settings state container.
//!
//! [`SettingsStore`] owns the current [`SettingsState`]. It is created by the
//! composition root, restored once from storage, and every dispatched action
//! is reduced and then written back. Persistence is best effort: failures are
//! logged and never alter the state.

use crate::models::settings::{SettingsAction, SettingsState, SETTINGS_STORAGE_KEY};
use crate::services::storage::{safely_get_item, safely_set_item, KeyValueStore};

/// Observer notified after each dispatch.
pub type Subscriber = Box<dyn FnMut(&SettingsState)>;

/// Injectable owner of the settings state.
pub struct SettingsStore<S: KeyValueStore> {
    state: SettingsState,
    storage: S,
    subscribers: Vec<Subscriber>,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Store starting from the default state, without reading `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            state: SettingsState::default(),
            storage,
            subscribers: Vec::new(),
        }
    }

    /// Store restored from `storage`.
    ///
    /// A missing entry yields the default state. A corrupt entry is removed
    /// and also yields the default state.
    pub fn restore(mut storage: S) -> Self {
        let state = match safely_get_item::<SettingsState, _>(&mut storage, SETTINGS_STORAGE_KEY) {
            Ok(Some(state)) => state.restored(),
            Ok(None) => SettingsState::default(),
            Err(e) => {
                log::warn!("[store] Discarding stored settings: {}", e);
                SettingsState::default()
            }
        };

        Self {
            state,
            storage,
            subscribers: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &SettingsState {
        &self.state
    }

    /// Backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Register an observer called after every dispatch.
    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    /// Apply `action`, persist the new state if it changed, and notify
    /// subscribers.
    pub fn dispatch(&mut self, action: SettingsAction) {
        log::debug!("[store] dispatch {:?}", action);

        let previous = self.state.clone();
        self.state = previous.clone().reduce(action);

        if self.state != previous {
            if let Err(e) = safely_set_item(&mut self.storage, SETTINGS_STORAGE_KEY, &self.state) {
                log::warn!("[store] Failed to persist settings: {}", e);
            }
        }

        for subscriber in &mut self.subscribers {
            subscriber(&self.state);
        }
    }
}
