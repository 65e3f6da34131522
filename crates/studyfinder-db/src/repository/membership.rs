//! SurrealDB implementation of [`MembershipRepository`].

use chrono::{DateTime, Utc};
use studyfinder_core::FinderResult;
use studyfinder_core::models::membership::Membership;
use studyfinder_core::repository::MembershipRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct MembershipRowWithId {
    record_id: String,
    user_id: String,
    group_id: String,
    username: String,
    joined_at: DateTime<Utc>,
}

impl MembershipRowWithId {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        let parse = |s: &str| {
            Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))
        };
        Ok(Membership {
            id: parse(&self.record_id)?,
            user_id: parse(&self.user_id)?,
            group_id: parse(&self.group_id)?,
            username: self.username,
            joined_at: self.joined_at,
        })
    }
}

/// SurrealDB implementation of the Membership repository.
#[derive(Clone)]
pub struct SurrealMembershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMembershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MembershipRepository for SurrealMembershipRepository<C> {
    async fn find(&self, user_id: Uuid, group_id: Uuid) -> FinderResult<Membership> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE user_id = $user_id AND group_id = $group_id",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: format!("{user_id}/{group_id}"),
        })?;

        Ok(row.try_into_membership()?)
    }

    async fn create(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        username: &str,
    ) -> FinderResult<Membership> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // No prior existence read: the UNIQUE index on (user_id, group_id)
        // decides, so two concurrent joins cannot both insert.
        let result = self
            .db
            .query(
                "CREATE type::record('membership', $id) SET \
                 user_id = $user_id, group_id = $group_id, \
                 username = $username",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", user_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::classify)?;

        let mut result = result.check().map_err(DbError::classify)?;

        #[derive(Debug, SurrealValue)]
        struct CreatedRow {
            username: String,
            joined_at: DateTime<Utc>,
        }

        let rows: Vec<CreatedRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: id_str,
        })?;

        Ok(Membership {
            id,
            user_id,
            group_id,
            username: row.username,
            joined_at: row.joined_at,
        })
    }

    async fn delete(&self, user_id: Uuid, group_id: Uuid) -> FinderResult<()> {
        let mut result = self
            .db
            .query(
                "DELETE membership \
                 WHERE user_id = $user_id AND group_id = $group_id \
                 RETURN BEFORE",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await
            .map_err(DbError::from)?;

        #[derive(Debug, SurrealValue)]
        struct DeletedRow {
            #[allow(dead_code)]
            user_id: String,
        }

        let removed: Vec<DeletedRow> = result.take(0).map_err(DbError::from)?;
        if removed.is_empty() {
            return Err(DbError::NotFound {
                entity: "membership".into(),
                id: format!("{user_id}/{group_id}"),
            }
            .into());
        }

        Ok(())
    }
}
