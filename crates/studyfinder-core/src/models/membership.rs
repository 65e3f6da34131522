//! Membership domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Join record linking a user to a group.
///
/// `username` is a denormalized snapshot of the member's handle; it is
/// rewritten whenever the user renames themselves so listings never show
/// a stale name. Unique on `(user_id, group_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub username: String,
    pub joined_at: DateTime<Utc>,
}
