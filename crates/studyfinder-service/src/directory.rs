//! User directory service — first-contact provisioning and account
//! maintenance.

use studyfinder_core::models::identity::Identity;
use studyfinder_core::models::user::{CreateUser, User};
use studyfinder_core::repository::UserRepository;
use studyfinder_core::{FinderError, FinderResult};

use crate::config::ServiceConfig;

/// Maps authenticated identities to internal user records.
///
/// Generic over the repository implementation so the service layer has
/// no dependency on the database crate.
pub struct DirectoryService<U: UserRepository> {
    user_repo: U,
    config: ServiceConfig,
}

/// Candidate username for a fresh account: the provider's username if it
/// has one, otherwise the local part of the email, truncated.
fn derive_username(identity: &Identity, max_len: usize) -> String {
    let base = identity
        .username
        .clone()
        .unwrap_or_else(|| {
            identity
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        });
    base.chars().take(max_len).collect()
}

impl<U: UserRepository> DirectoryService<U> {
    pub fn new(user_repo: U, config: ServiceConfig) -> Self {
        Self { user_repo, config }
    }

    /// First-contact provisioning: return the existing record for this
    /// identity, or create one.
    ///
    /// Idempotent under concurrency: if a parallel first-sight call wins
    /// the insert, the unique index on the subject id rejects ours and we
    /// recover by re-reading the row it created. A rejection can also
    /// come from the username index when two subjects derive the same
    /// candidate handle; the re-read tells the cases apart.
    pub async fn sync(&self, identity: Option<&Identity>) -> FinderResult<Option<User>> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        match self.user_repo.get_by_subject(&identity.subject_id).await {
            Ok(user) => return Ok(Some(user)),
            Err(FinderError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let username = derive_username(identity, self.config.max_username_len);
        let created = self
            .user_repo
            .create(CreateUser {
                subject_id: identity.subject_id.clone(),
                username,
                name: identity.name.clone(),
                email: identity.email.clone(),
                avatar_url: identity.avatar_url.clone(),
            })
            .await;

        match created {
            Ok(user) => Ok(Some(user)),
            Err(conflict @ FinderError::Conflict { .. }) => {
                // Either we lost the first-sight race for this subject, or
                // another subject already holds the derived username. Only
                // the former leaves a row to recover.
                match self.user_repo.get_by_subject(&identity.subject_id).await {
                    Ok(user) => Ok(Some(user)),
                    Err(FinderError::NotFound { .. }) => Err(conflict),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// The caller's user record, or `None` when unauthenticated or not
    /// yet provisioned. Side-effect free.
    pub async fn get_current(&self, identity: Option<&Identity>) -> FinderResult<Option<User>> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        match self.user_repo.get_by_subject(&identity.subject_id).await {
            Ok(user) => Ok(Some(user)),
            Err(FinderError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Rename the caller. Succeeds as a no-op when the name is unchanged;
    /// on success every membership snapshot is rewritten in the same
    /// transaction as the user row.
    pub async fn update_username(
        &self,
        identity: Option<&Identity>,
        new_username: &str,
    ) -> FinderResult<()> {
        let Some(identity) = identity else {
            return Err(FinderError::Unauthenticated);
        };

        if new_username.chars().count() > self.config.max_username_len {
            return Err(FinderError::validation(format!(
                "username cannot exceed {} characters",
                self.config.max_username_len
            )));
        }

        let user = self.user_repo.get_by_subject(&identity.subject_id).await?;

        if user.username == new_username {
            return Ok(());
        }

        // Fast-path check; the unique index on username stays the
        // authoritative signal for concurrent renames.
        match self.user_repo.get_by_username(new_username).await {
            Ok(_) => return Err(FinderError::conflict("username already taken")),
            Err(FinderError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        match self.user_repo.update_username(user.id, new_username).await {
            Ok(()) => Ok(()),
            Err(FinderError::Conflict { .. }) => {
                Err(FinderError::conflict("username already taken"))
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the caller's account: every group they own (with its
    /// memberships), every membership they hold, and the user row — all
    /// or nothing.
    pub async fn delete_current(&self, identity: Option<&Identity>) -> FinderResult<()> {
        let Some(identity) = identity else {
            return Err(FinderError::Unauthenticated);
        };

        let user = self.user_repo.get_by_subject(&identity.subject_id).await?;
        self.user_repo.delete_cascading(user.id).await
    }
}
