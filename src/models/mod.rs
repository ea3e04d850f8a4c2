//! Data models for the application.
//!
//! These models are plain serializable values: users and repositories as
//! returned by the GitHub API, and the settings state the UI layer renders.

pub mod settings;
pub mod user;

// Re-exports for convenient access
pub use settings::{Blacklist, SettingsAction, SettingsPhase, SettingsState, SETTINGS_STORAGE_KEY};
pub use user::{Repository, User, UserId};
