//! User and repository models.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable GitHub user id.
pub type UserId = i64;

/// Message attached to payloads that do not have the expected shape.
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid server response.";

/// A GitHub user reduced to the fields the roulette needs.
///
/// Any other fields present in an API payload are dropped on parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Unique, stable identity.
    pub id: UserId,

    /// Login name.
    pub login: String,

    /// Avatar image URL.
    pub avatar_url: String,
}

impl User {
    /// Validate a single user payload and strip extra fields.
    pub fn from_payload(value: Value) -> Result<Self, AppError> {
        // serde would also accept the positional `[id, login, avatar_url]` form.
        if !value.is_object() {
            return Err(AppError::invalid_response(INVALID_RESPONSE_MESSAGE)
                .with_cause("expected a JSON object"));
        }
        serde_json::from_value(value)
            .map_err(|e| AppError::invalid_response(INVALID_RESPONSE_MESSAGE).with_cause(e))
    }

    /// Validate a contributor listing: a sequence in which every element is a user.
    pub fn list_from_payload(value: Value) -> Result<Vec<Self>, AppError> {
        match value {
            Value::Array(items) => items.into_iter().map(Self::from_payload).collect(),
            _ => Err(AppError::invalid_response(INVALID_RESPONSE_MESSAGE)
                .with_cause("expected a JSON array")),
        }
    }
}

/// A repository and its contributors, in API response order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub contributors: Vec<User>,
}
