//! Study-group listing domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::membership::Membership;

/// Listing status. Set to `Active` at creation; no transition exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Active,
}

/// A study-group listing. The owner is implicitly a member: their
/// membership row is created in the same transaction as the group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyGroup {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub subjects: Vec<String>,
    /// Optional link to an external scheduling tool.
    pub scheduling_link: Option<String>,
    pub session_dates: Vec<String>,
    /// Canonical 12-hour display form, e.g. `2:00 PM`.
    pub session_time: String,
    /// Free text or URL.
    pub location: String,
    pub status: GroupStatus,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudyGroup {
    pub owner_id: Uuid,
    /// Current username of the owner, snapshotted onto their membership.
    pub owner_username: String,
    pub name: String,
    pub bio: Option<String>,
    pub subjects: Vec<String>,
    pub scheduling_link: Option<String>,
    pub session_dates: Vec<String>,
    pub session_time: String,
    pub location: String,
}

/// Owner fields exposed in listings and API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// A group together with its owner summary and full membership list —
/// the persisted representation returned by every read path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetails {
    #[serde(flatten)]
    pub group: StudyGroup,
    pub owner: OwnerSummary,
    pub members: Vec<Membership>,
}
