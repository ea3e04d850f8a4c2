//! Settings acquisition pipeline.
//!
//! Looks up the user and the repository's contributors concurrently, waits
//! for both, validates each payload independently, and commits exactly one
//! success or failure transition. Nothing is adopted from a partial result.

use crate::error::AppError;
use crate::models::settings::{SettingsAction, SettingsPhase};
use crate::models::user::{Repository, User};
use crate::services::github_client::{FetchResult, GitHubClient};
use crate::services::storage::KeyValueStore;
use crate::services::store::SettingsStore;

/// Fewest contributors that can yield a reviewer other than the owner.
pub const MIN_CONTRIBUTORS: usize = 2;

/// Fetches settings from GitHub and drives the settings state machine.
#[derive(Debug, Clone)]
pub struct SettingsPipeline {
    client: GitHubClient,
}

impl SettingsPipeline {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    /// Load settings for `user_login`'s repository `repository_name`.
    ///
    /// Dispatches `FetchStart`, then a single `FetchSuccess` or
    /// `FetchFailure`, and returns the resulting phase.
    pub async fn fetch_settings<S: KeyValueStore>(
        &self,
        store: &mut SettingsStore<S>,
        user_login: &str,
        repository_name: &str,
    ) -> SettingsPhase {
        store.dispatch(SettingsAction::FetchStart);

        let action = self.resolve(user_login, repository_name).await;
        store.dispatch(action);

        let phase = store.state().phase();
        log::info!(
            "[settings] {}/{} loaded with phase {:?}",
            user_login,
            repository_name,
            phase
        );
        phase
    }

    /// Run both lookups concurrently and turn the settled pair into an action.
    pub async fn resolve(&self, user_login: &str, repository_name: &str) -> SettingsAction {
        let (user, contributors) = futures::join!(
            self.client.fetch_user(user_login),
            self.client.fetch_contributors(user_login, repository_name),
        );
        reconcile(repository_name, user, contributors)
    }
}

/// Validate both settled lookups and derive the final transition.
pub fn reconcile(
    repository_name: &str,
    user: FetchResult,
    contributors: FetchResult,
) -> SettingsAction {
    let user = user.and_then(User::from_payload);
    let contributors = contributors.and_then(User::list_from_payload);

    match (user, contributors) {
        (Ok(user), Ok(contributors)) if contributors.len() >= MIN_CONTRIBUTORS => {
            SettingsAction::FetchSuccess {
                user,
                repository: Repository {
                    name: repository_name.to_string(),
                    contributors,
                },
            }
        }
        (Ok(_), Ok(contributors)) => {
            log::debug!(
                "[settings] {} has only {} contributor(s)",
                repository_name,
                contributors.len()
            );
            SettingsAction::FetchFailure {
                user_error: None,
                repository_error: Some(AppError::invalid_data_length(format!(
                    "Repository \"{}\" has no potential reviewers.",
                    repository_name
                ))),
            }
        }
        (user, contributors) => SettingsAction::FetchFailure {
            user_error: user.err(),
            repository_error: contributors.err(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::{json, Value};

    fn user_json(id: i64, login: &str) -> Value {
        json!({ "id": id, "login": login, "avatar_url": format!("https://avatars.example/{}", login) })
    }

    #[test]
    fn test_success_keeps_order_and_strips_fields() {
        let mut carol = user_json(1, "carol");
        carol["site_admin"] = json!(false);

        let action = reconcile(
            "team",
            Ok(carol.clone()),
            Ok(json!([carol, user_json(2, "dave"), user_json(3, "erin")])),
        );

        let SettingsAction::FetchSuccess { user, repository } = action else {
            panic!("expected success, got {:?}", action);
        };
        assert_eq!(user.login, "carol");
        assert_eq!(repository.name, "team");
        let logins: Vec<_> = repository.contributors.iter().map(|u| u.login.as_str()).collect();
        assert_eq!(logins, vec!["carol", "dave", "erin"]);
    }

    #[test]
    fn test_single_contributor_is_invalid_data_length() {
        let action = reconcile("solo", Ok(user_json(1, "bob")), Ok(json!([user_json(1, "bob")])));

        let SettingsAction::FetchFailure {
            user_error,
            repository_error,
        } = action
        else {
            panic!("expected failure, got {:?}", action);
        };
        assert!(user_error.is_none());
        assert_eq!(repository_error.unwrap().kind, ErrorKind::InvalidDataLength);
    }

    #[test]
    fn test_transport_and_shape_errors_are_independent() {
        let action = reconcile(
            "repo",
            Err(AppError::not_found("User \"alice\" not found.")),
            Ok(json!({ "message": "not a list" })),
        );

        let SettingsAction::FetchFailure {
            user_error,
            repository_error,
        } = action
        else {
            panic!("expected failure, got {:?}", action);
        };
        assert_eq!(user_error.unwrap().kind, ErrorKind::NotFoundError);
        assert_eq!(
            repository_error.unwrap().kind,
            ErrorKind::InvalidResponseError
        );
    }

    #[test]
    fn test_one_sided_failure_leaves_other_side_absent() {
        let contributors = json!([user_json(1, "alice"), user_json(2, "bob")]);
        let action = reconcile(
            "repo",
            Err(AppError::not_found("User \"alice\" not found.")),
            Ok(contributors),
        );
        assert_eq!(
            action,
            SettingsAction::FetchFailure {
                user_error: Some(AppError::not_found("User \"alice\" not found.")),
                repository_error: None,
            }
        );

        let action = reconcile(
            "repo",
            Ok(json!("not a user")),
            Ok(json!([user_json(1, "alice"), user_json(2, "bob")])),
        );
        let SettingsAction::FetchFailure {
            user_error,
            repository_error,
        } = action
        else {
            panic!("expected failure, got {:?}", action);
        };
        assert_eq!(user_error.unwrap().kind, ErrorKind::InvalidResponseError);
        assert!(repository_error.is_none());
    }

    #[test]
    fn test_short_list_with_bad_user_reports_user_shape() {
        // Data length only matters once both sides are well-shaped.
        let action = reconcile("solo", Ok(json!(null)), Ok(json!([user_json(1, "bob")])));
        let SettingsAction::FetchFailure {
            user_error,
            repository_error,
        } = action
        else {
            panic!("expected failure, got {:?}", action);
        };
        assert_eq!(user_error.unwrap().kind, ErrorKind::InvalidResponseError);
        assert!(repository_error.is_none());
    }
}
