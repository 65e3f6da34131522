//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// External subject id from the identity provider (unique).
    pub subject_id: String,
    /// Unique handle, at most 16 characters.
    pub username: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub subject_id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}
