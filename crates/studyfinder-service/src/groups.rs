//! Group lifecycle service — create, read, delete, and list study-group
//! listings.

use studyfinder_core::models::group::{CreateStudyGroup, GroupDetails};
use studyfinder_core::models::identity::Identity;
use studyfinder_core::models::user::User;
use studyfinder_core::repository::{GroupRepository, UserRepository};
use studyfinder_core::{FinderError, FinderResult};
use tracing::warn;
use uuid::Uuid;

use crate::feed::Feed;
use crate::timefmt::normalize_session_time;

/// Caller-supplied fields for a new study-group listing.
#[derive(Debug, Clone)]
pub struct CreateGroupInput {
    pub name: String,
    pub bio: Option<String>,
    pub subjects: Vec<String>,
    pub scheduling_link: Option<String>,
    pub session_dates: Vec<String>,
    /// 24-hour `HH:MM`; normalized to the 12-hour display form.
    pub session_time: String,
    pub location: String,
}

pub struct GroupService<G: GroupRepository, U: UserRepository> {
    group_repo: G,
    user_repo: U,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<G: GroupRepository, U: UserRepository> GroupService<G, U> {
    pub fn new(group_repo: G, user_repo: U) -> Self {
        Self {
            group_repo,
            user_repo,
        }
    }

    async fn require_user(&self, identity: Option<&Identity>) -> FinderResult<User> {
        let Some(identity) = identity else {
            return Err(FinderError::Unauthenticated);
        };
        self.user_repo.get_by_subject(&identity.subject_id).await
    }

    /// Create a listing. The caller becomes the owner and is a member
    /// from the first visible instant (owner membership is created in
    /// the same transaction as the group).
    pub async fn create(
        &self,
        identity: Option<&Identity>,
        input: CreateGroupInput,
    ) -> FinderResult<GroupDetails> {
        let user = self.require_user(identity).await?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(FinderError::validation("study group name is required"));
        }

        let subjects: Vec<String> = input
            .subjects
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if subjects.is_empty() {
            return Err(FinderError::validation("at least one subject is required"));
        }

        if input.session_dates.is_empty() {
            return Err(FinderError::validation(
                "at least one session date is required",
            ));
        }

        let session_time = normalize_session_time(&input.session_time)?;

        let location = input.location.trim().to_string();
        if location.is_empty() {
            return Err(FinderError::validation("location is required"));
        }

        self.group_repo
            .create(CreateStudyGroup {
                owner_id: user.id,
                owner_username: user.username,
                name,
                bio: blank_to_none(input.bio),
                subjects,
                scheduling_link: blank_to_none(input.scheduling_link),
                session_dates: input.session_dates,
                session_time,
                location,
            })
            .await
    }

    /// A single listing with its owner and membership list.
    pub async fn get_by_id(&self, id: Uuid) -> FinderResult<GroupDetails> {
        self.group_repo.get_by_id(id).await
    }

    /// Delete a listing the caller owns, cascading its memberships.
    ///
    /// "Doesn't exist" and "exists but isn't yours" produce the same
    /// `NotFound` so existence is not leaked to non-owners.
    pub async fn delete(&self, identity: Option<&Identity>, group_id: Uuid) -> FinderResult<()> {
        let user = match self.require_user(identity).await {
            Ok(user) => user,
            Err(FinderError::Unauthenticated) => return Err(FinderError::Unauthenticated),
            // A caller with no user record cannot own anything; collapse
            // into the same answer a non-owner gets.
            Err(FinderError::NotFound { .. }) => {
                return Err(FinderError::not_found("study group", group_id.to_string()));
            }
            Err(e) => return Err(e),
        };

        self.group_repo.delete_owned(user.id, group_id).await
    }

    /// Every listing, newest first. Store failure degrades to an empty
    /// feed so the caller's display never breaks; the failure is logged
    /// and flagged on the result.
    pub async fn list_all(&self) -> Feed {
        match self.group_repo.list_all().await {
            Ok(groups) => Feed {
                groups,
                degraded: false,
            },
            Err(e) => {
                warn!(error = %e, "group listing failed; serving empty feed");
                Feed {
                    groups: Vec::new(),
                    degraded: true,
                }
            }
        }
    }
}
