//! Settings form commands.
//!
//! The form holds the operator's raw input. Submission validates it locally
//! and only reaches the network once both fields are filled in.

use crate::error::AppError;
use crate::models::settings::{SettingsAction, SettingsPhase, SettingsState};
use crate::models::user::User;
use crate::services::settings_pipeline::SettingsPipeline;
use crate::services::storage::KeyValueStore;
use crate::services::store::SettingsStore;
use std::fmt::Write;

pub const USER_LOGIN_REQUIRED: &str = "Please enter the user login.";
pub const REPOSITORY_NAME_REQUIRED: &str = "Please enter the repository name.";

/// Editable form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    UserLogin,
    RepositoryName,
}

/// Raw settings input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub user_login: String,
    pub repository_name: String,
}

impl SettingsForm {
    pub fn new(user_login: impl Into<String>, repository_name: impl Into<String>) -> Self {
        Self {
            user_login: user_login.into(),
            repository_name: repository_name.into(),
        }
    }

    /// Form prefilled from the current settings.
    pub fn from_state(state: &SettingsState) -> Self {
        Self::new(state.user_login(), state.repository_name())
    }

    /// Whether the form may be submitted in `state`.
    pub fn can_submit(state: &SettingsState) -> bool {
        !state.is_loading && !state.has_errors()
    }

    /// Update one field, clearing stale field errors first.
    pub fn on_input_change<S: KeyValueStore>(
        &mut self,
        store: &mut SettingsStore<S>,
        field: FormField,
        value: &str,
    ) {
        if store.state().has_errors() {
            store.dispatch(SettingsAction::ResetErrors);
        }

        match field {
            FormField::UserLogin => self.user_login = value.to_string(),
            FormField::RepositoryName => self.repository_name = value.to_string(),
        }
    }

    /// Validate and submit.
    ///
    /// Empty fields get a `TypeError` each and nothing is fetched.
    pub async fn submit<S: KeyValueStore>(
        &self,
        store: &mut SettingsStore<S>,
        pipeline: &SettingsPipeline,
    ) -> SettingsPhase {
        let user_login = self.user_login.trim();
        let repository_name = self.repository_name.trim();

        if user_login.is_empty() || repository_name.is_empty() {
            log::debug!("[settings] form rejected, missing input");
            if user_login.is_empty() {
                store.dispatch(SettingsAction::SetUserError(AppError::type_error(
                    USER_LOGIN_REQUIRED,
                )));
            }
            if repository_name.is_empty() {
                store.dispatch(SettingsAction::SetRepositoryError(AppError::type_error(
                    REPOSITORY_NAME_REQUIRED,
                )));
            }
            return store.state().phase();
        }

        pipeline
            .fetch_settings(store, user_login, repository_name)
            .await
    }
}

/// Human-readable summary of the settings.
pub fn describe(state: &SettingsState) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "User:        {}", or_unset(state.user_login()));
    let _ = writeln!(out, "Repository:  {}", or_unset(state.repository_name()));

    let logins = |users: Vec<&User>| {
        if users.is_empty() {
            "(none)".to_string()
        } else {
            users
                .iter()
                .map(|user| user.login.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }
    };
    let _ = writeln!(out, "Reviewers:   {}", logins(state.reviewers()));
    let _ = writeln!(out, "Blacklisted: {}", logins(state.blacklisted()));

    if let Some(error) = &state.user_error {
        let _ = writeln!(out, "User error:  {}", error.user_message());
    }
    if let Some(error) = &state.repository_error {
        let _ = writeln!(out, "Repository error: {}", error.user_message());
    }

    out
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
