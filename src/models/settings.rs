//! Settings state and its reducer.
//!
//! [`SettingsState`] is only ever changed by [`SettingsState::reduce`], a pure
//! total function over the closed [`SettingsAction`] set. Reviewer and
//! blacklist views are derived on every read and never stored.

use crate::error::AppError;
use crate::models::user::{Repository, User, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Storage key the settings blob is persisted under.
pub const SETTINGS_STORAGE_KEY: &str = "settings";

/// Contributor ids excluded from reviewer selection.
pub type Blacklist = BTreeSet<UserId>;

/// Reviewer settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsState {
    /// A settings fetch is in flight.
    pub is_loading: bool,

    /// The owning user.
    pub user: Option<User>,

    /// Repository the contributors were fetched from.
    pub repository_name: Option<String>,

    /// Contributors in API response order.
    pub contributors: Vec<User>,

    /// Ids excluded from selection.
    pub blacklist: Blacklist,

    /// Error scoped to the user login field.
    pub user_error: Option<AppError>,

    /// Error scoped to the repository name field.
    pub repository_error: Option<AppError>,
}

/// Transitions accepted by [`SettingsState::reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    /// A fetch started; prior field errors are cleared.
    FetchStart,
    /// Both lookups succeeded and validated.
    FetchSuccess { user: User, repository: Repository },
    /// At least one lookup failed.
    FetchFailure {
        user_error: Option<AppError>,
        repository_error: Option<AppError>,
    },
    SetUserError(AppError),
    SetRepositoryError(AppError),
    ResetErrors,
    ClearBlacklist,
    AddToBlacklist(Vec<UserId>),
    DeleteFromBlacklist(UserId),
}

/// Coarse lifecycle phase derived from the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsPhase {
    Idle,
    Loading,
    Success,
    Failure,
}

impl SettingsState {
    /// Apply one action and return the next state.
    pub fn reduce(self, action: SettingsAction) -> Self {
        match action {
            SettingsAction::FetchStart => Self {
                is_loading: true,
                user_error: None,
                repository_error: None,
                ..self
            },
            SettingsAction::FetchSuccess { user, repository } => Self {
                is_loading: false,
                blacklist: BTreeSet::from([user.id]),
                user: Some(user),
                repository_name: Some(repository.name),
                contributors: repository.contributors,
                ..self
            },
            SettingsAction::FetchFailure {
                user_error,
                repository_error,
            } => Self {
                is_loading: false,
                user_error,
                repository_error,
                ..self
            },
            SettingsAction::SetUserError(error) => Self {
                user_error: Some(error),
                ..self
            },
            SettingsAction::SetRepositoryError(error) => Self {
                repository_error: Some(error),
                ..self
            },
            SettingsAction::ResetErrors => Self {
                user_error: None,
                repository_error: None,
                ..self
            },
            SettingsAction::ClearBlacklist => Self {
                blacklist: Blacklist::new(),
                ..self
            },
            SettingsAction::AddToBlacklist(ids) => {
                let mut blacklist = self.blacklist;
                blacklist.extend(ids);
                Self { blacklist, ..self }
            }
            SettingsAction::DeleteFromBlacklist(id) => {
                let mut blacklist = self.blacklist;
                let _ = blacklist.remove(&id);
                Self { blacklist, ..self }
            }
        }
    }

    /// State as restored from storage: a fetch cannot survive a restart.
    pub fn restored(self) -> Self {
        Self {
            is_loading: false,
            ..self
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SettingsPhase {
        if self.is_loading {
            SettingsPhase::Loading
        } else if self.has_errors() {
            SettingsPhase::Failure
        } else if self.user.is_some() {
            SettingsPhase::Success
        } else {
            SettingsPhase::Idle
        }
    }

    /// Whether either field carries an error.
    pub fn has_errors(&self) -> bool {
        self.user_error.is_some() || self.repository_error.is_some()
    }

    /// Login of the owning user, or empty.
    pub fn user_login(&self) -> &str {
        self.user.as_ref().map_or("", |user| user.login.as_str())
    }

    /// Configured repository name, or empty.
    pub fn repository_name(&self) -> &str {
        self.repository_name.as_deref().unwrap_or("")
    }

    /// Contributors that may be picked: not blacklisted and not the owner.
    pub fn reviewers(&self) -> Vec<&User> {
        self.contributors_where(|id| !self.blacklist.contains(&id))
    }

    /// Contributors currently blacklisted, excluding the owner.
    pub fn blacklisted(&self) -> Vec<&User> {
        self.contributors_where(|id| self.blacklist.contains(&id))
    }

    fn contributors_where(&self, keep: impl Fn(UserId) -> bool) -> Vec<&User> {
        let Some(owner) = &self.user else {
            return Vec::new();
        };
        self.contributors
            .iter()
            .filter(|contributor| contributor.id != owner.id && keep(contributor.id))
            .collect()
    }
}
