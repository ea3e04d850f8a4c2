//! Business logic services.
//!
//! This module contains the GitHub client, the settings acquisition pipeline,
//! and the persistence layer behind the settings store.
//!
//! Services are designed to be testable and independent of the terminal front end.

pub mod github_client;
pub mod settings_pipeline;
pub mod storage;
pub mod store;

pub use github_client::{GitHubClient, GitHubClientConfig};
pub use settings_pipeline::SettingsPipeline;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::SettingsStore;
