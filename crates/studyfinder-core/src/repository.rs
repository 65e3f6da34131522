//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations are expected to
//! push uniqueness to the store's indexes (subject id, username, the
//! `(user, group)` membership pair) and to wrap every multi-row mutation
//! in a single transaction.

use uuid::Uuid;

use crate::error::FinderResult;
use crate::models::{
    group::{CreateStudyGroup, GroupDetails},
    membership::Membership,
    user::{CreateUser, User},
};

pub trait UserRepository: Send + Sync {
    /// Insert a new user. A unique-index violation on `subject_id` or
    /// `username` surfaces as `Conflict`.
    fn create(&self, input: CreateUser) -> impl Future<Output = FinderResult<User>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FinderResult<User>> + Send;

    fn get_by_subject(&self, subject_id: &str)
    -> impl Future<Output = FinderResult<User>> + Send;

    fn get_by_username(&self, username: &str)
    -> impl Future<Output = FinderResult<User>> + Send;

    /// Rename a user and rewrite the username snapshot on every
    /// membership row they hold, in one transaction.
    fn update_username(
        &self,
        user_id: Uuid,
        new_username: &str,
    ) -> impl Future<Output = FinderResult<()>> + Send;

    /// Delete the user, every group they own, and every membership either
    /// of those implies — all or nothing.
    fn delete_cascading(&self, user_id: Uuid) -> impl Future<Output = FinderResult<()>> + Send;
}

pub trait GroupRepository: Send + Sync {
    /// Create the group and the owner's membership in one transaction.
    fn create(
        &self,
        input: CreateStudyGroup,
    ) -> impl Future<Output = FinderResult<GroupDetails>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FinderResult<GroupDetails>> + Send;

    /// Delete a group the caller owns, cascading its memberships.
    ///
    /// Returns the same `NotFound` whether the group is missing or owned
    /// by someone else, so existence is not leaked to non-owners.
    fn delete_owned(
        &self,
        owner_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = FinderResult<()>> + Send;

    /// All groups, newest first.
    fn list_all(&self) -> impl Future<Output = FinderResult<Vec<GroupDetails>>> + Send;

    fn list_by_owner(
        &self,
        owner_id: Uuid,
    ) -> impl Future<Output = FinderResult<Vec<GroupDetails>>> + Send;

    /// All groups where the user holds a membership, newest first.
    fn list_by_member(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = FinderResult<Vec<GroupDetails>>> + Send;

    /// Case-insensitive substring match on name or bio, newest first.
    /// The store performs the filtering; subject-tag matching is layered
    /// on top by the search service.
    fn search_name_bio(
        &self,
        query: &str,
    ) -> impl Future<Output = FinderResult<Vec<GroupDetails>>> + Send;
}

pub trait MembershipRepository: Send + Sync {
    fn find(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = FinderResult<Membership>> + Send;

    /// Insert a membership with the given username snapshot. The UNIQUE
    /// index on `(user_id, group_id)` is the authoritative duplicate
    /// signal; a violation surfaces as `Conflict`.
    fn create(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        username: &str,
    ) -> impl Future<Output = FinderResult<Membership>> + Send;

    /// Remove a membership. `NotFound` when no row matched.
    fn delete(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = FinderResult<()>> + Send;
}
