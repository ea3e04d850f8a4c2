//! Blacklist commands.
//!
//! Operators name contributors by login; these helpers resolve logins to ids
//! against the loaded settings before dispatching blacklist actions.

use crate::error::AppError;
use crate::models::settings::SettingsAction;
use crate::models::user::{User, UserId};
use crate::services::storage::KeyValueStore;
use crate::services::store::SettingsStore;

pub const NOT_CONFIGURED_MESSAGE: &str = "Please configure a repository and user first.";
pub const LAST_REVIEWER_MESSAGE: &str = "At least one reviewer must remain selectable.";

fn find_login<'a>(users: &[&'a User], login: &str) -> Option<&'a User> {
    users
        .iter()
        .copied()
        .find(|user| user.login.eq_ignore_ascii_case(login))
}

/// Blacklist the reviewers named by `logins`.
///
/// Logins that are already blacklisted are skipped. Returns the ids that
/// were newly added.
pub fn add<S: KeyValueStore>(
    store: &mut SettingsStore<S>,
    logins: &[String],
) -> Result<Vec<UserId>, AppError> {
    let state = store.state();
    if state.user.is_none() {
        return Err(AppError::type_error(NOT_CONFIGURED_MESSAGE));
    }

    let reviewers = state.reviewers();
    let blacklisted = state.blacklisted();
    let mut ids = Vec::new();

    for login in logins {
        if let Some(user) = find_login(&reviewers, login) {
            if !ids.contains(&user.id) {
                ids.push(user.id);
            }
        } else if find_login(&blacklisted, login).is_none() {
            return Err(AppError::type_error(format!(
                "\"{}\" is not a contributor of {}.",
                login,
                state.repository_name()
            )));
        }
    }

    if ids.len() >= reviewers.len() && !ids.is_empty() {
        return Err(AppError::type_error(LAST_REVIEWER_MESSAGE));
    }

    if !ids.is_empty() {
        log::debug!("[settings] blacklisting {:?}", ids);
        store.dispatch(SettingsAction::AddToBlacklist(ids.clone()));
    }
    Ok(ids)
}

/// Make a blacklisted contributor selectable again.
pub fn remove<S: KeyValueStore>(
    store: &mut SettingsStore<S>,
    login: &str,
) -> Result<UserId, AppError> {
    let id = find_login(&store.state().blacklisted(), login)
        .map(|user| user.id)
        .ok_or_else(|| AppError::type_error(format!("\"{}\" is not blacklisted.", login)))?;

    store.dispatch(SettingsAction::DeleteFromBlacklist(id));
    Ok(id)
}

/// Empty the blacklist. The owner stays excluded from selection.
pub fn clear<S: KeyValueStore>(store: &mut SettingsStore<S>) {
    store.dispatch(SettingsAction::ClearBlacklist);
}
