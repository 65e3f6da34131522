//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use studyfinder_core::FinderResult;
use studyfinder_core::models::user::{CreateUser, User};
use studyfinder_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    subject_id: String,
    username: String,
    name: String,
    email: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    subject_id: String,
    username: String,
    name: String,
    email: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> User {
        User {
            id,
            subject_id: self.subject_id,
            username: self.username,
            name: self.name,
            email: self.email,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            subject_id: self.subject_id,
            username: self.username,
            name: self.name,
            email: self.email,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn get_one(&self, column: &str, value: String) -> Result<User, DbError> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE {column} = $value"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("value", value.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: value,
        })?;

        row.try_into_user()
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> FinderResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 subject_id = $subject_id, username = $username, \
                 name = $name, email = $email, \
                 avatar_url = $avatar_url",
            )
            .bind(("id", id_str.clone()))
            .bind(("subject_id", input.subject_id))
            .bind(("username", input.username))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("avatar_url", input.avatar_url))
            .await
            .map_err(DbError::classify)?;

        // Unique-index violations (subject_id, username) surface here.
        let mut result = result.check().map_err(DbError::classify)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn get_by_id(&self, id: Uuid) -> FinderResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn get_by_subject(&self, subject_id: &str) -> FinderResult<User> {
        Ok(self.get_one("subject_id", subject_id.to_string()).await?)
    }

    async fn get_by_username(&self, username: &str) -> FinderResult<User> {
        Ok(self.get_one("username", username.to_string()).await?)
    }

    async fn update_username(&self, user_id: Uuid, new_username: &str) -> FinderResult<()> {
        let id_str = user_id.to_string();

        // The user row and every membership snapshot change together or
        // not at all. A unique-index violation on the new username rolls
        // the whole transaction back.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE type::record('user', $id) SET username = $username; \
                 UPDATE membership SET username = $username \
                 WHERE user_id = $id; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .bind(("username", new_username.to_string()))
            .await
            .map_err(DbError::classify)?;

        result.check().map_err(DbError::classify)?;

        Ok(())
    }

    async fn delete_cascading(&self, user_id: Uuid) -> FinderResult<()> {
        let id_str = user_id.to_string();

        // Owned groups, their memberships, the caller's own memberships,
        // and the user row go in a single transaction.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 LET $owned = (SELECT VALUE meta::id(id) FROM study_group \
                 WHERE owner_id = $id); \
                 DELETE membership WHERE group_id IN $owned; \
                 DELETE study_group WHERE owner_id = $id; \
                 DELETE membership WHERE user_id = $id; \
                 DELETE type::record('user', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::classify)?;

        Ok(())
    }
}
