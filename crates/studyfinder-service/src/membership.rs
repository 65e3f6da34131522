//! Membership service — join, leave, and membership-filtered listings.

use studyfinder_core::models::group::GroupDetails;
use studyfinder_core::models::identity::Identity;
use studyfinder_core::models::membership::Membership;
use studyfinder_core::models::user::User;
use studyfinder_core::repository::{GroupRepository, MembershipRepository, UserRepository};
use studyfinder_core::{FinderError, FinderResult};
use tracing::warn;
use uuid::Uuid;

pub struct MembershipService<M, G, U>
where
    M: MembershipRepository,
    G: GroupRepository,
    U: UserRepository,
{
    membership_repo: M,
    group_repo: G,
    user_repo: U,
}

impl<M, G, U> MembershipService<M, G, U>
where
    M: MembershipRepository,
    G: GroupRepository,
    U: UserRepository,
{
    pub fn new(membership_repo: M, group_repo: G, user_repo: U) -> Self {
        Self {
            membership_repo,
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

    /// Whether the caller holds a membership in the group. Never errors:
    /// unauthenticated callers, unknown users, and store failures all
    /// answer `false` (failures are logged).
    pub async fn check_membership(&self, identity: Option<&Identity>, group_id: Uuid) -> bool {
        let user = match self.require_user(identity).await {
            Ok(user) => user,
            Err(FinderError::Unauthenticated) | Err(FinderError::NotFound { .. }) => return false,
            Err(e) => {
                warn!(error = %e, %group_id, "membership check failed");
                return false;
            }
        };

        match self.membership_repo.find(user.id, group_id).await {
            Ok(_) => true,
            Err(FinderError::NotFound { .. }) => false,
            Err(e) => {
                warn!(error = %e, %group_id, "membership check failed");
                false
            }
        }
    }

    /// Join a group, snapshotting the caller's current username onto the
    /// membership row.
    ///
    /// The unique index on `(user, group)` is the duplicate signal, so
    /// two concurrent joins resolve to one row and one `AlreadyMember`.
    pub async fn join(
        &self,
        identity: Option<&Identity>,
        group_id: Uuid,
    ) -> FinderResult<Membership> {
        let user = self.require_user(identity).await?;

        // The target listing must exist.
        self.group_repo.get_by_id(group_id).await?;

        match self
            .membership_repo
            .create(user.id, group_id, &user.username)
            .await
        {
            Ok(membership) => Ok(membership),
            Err(FinderError::Conflict { .. }) => Err(FinderError::AlreadyMember),
            Err(e) => Err(e),
        }
    }

    /// Leave a group. The owner cannot leave their own listing — they
    /// can only delete it.
    pub async fn leave(&self, identity: Option<&Identity>, group_id: Uuid) -> FinderResult<()> {
        let user = self.require_user(identity).await?;

        match self.group_repo.get_by_id(group_id).await {
            Ok(details) if details.group.owner_id == user.id => {
                return Err(FinderError::validation(
                    "the owner cannot leave their own study group; delete it instead",
                ));
            }
            Ok(_) => {}
            // Group already gone: any membership went with it, so the
            // delete below answers NotMember.
            Err(FinderError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        match self.membership_repo.delete(user.id, group_id).await {
            Ok(()) => Ok(()),
            Err(FinderError::NotFound { .. }) => Err(FinderError::NotMember),
            Err(e) => Err(e),
        }
    }

    /// Every group the caller holds a membership in, owned ones included.
    pub async fn get_user_groups(
        &self,
        identity: Option<&Identity>,
    ) -> FinderResult<Vec<GroupDetails>> {
        let user = self.require_user(identity).await?;
        self.group_repo.list_by_member(user.id).await
    }

    /// Every group the caller owns.
    pub async fn get_owned_groups(
        &self,
        identity: Option<&Identity>,
    ) -> FinderResult<Vec<GroupDetails>> {
        let user = self.require_user(identity).await?;
        self.group_repo.list_by_owner(user.id).await
    }

    /// Display rule: joined groups minus owned groups.
    pub async fn joined_excluding_owned(
        &self,
        identity: Option<&Identity>,
    ) -> FinderResult<Vec<GroupDetails>> {
        let user = self.require_user(identity).await?;
        let groups = self.group_repo.list_by_member(user.id).await?;
        Ok(groups
            .into_iter()
            .filter(|g| g.group.owner_id != user.id)
            .collect())
    }
}
