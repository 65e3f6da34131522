//! SurrealDB implementation of [`GroupRepository`].
//!
//! Every read path returns [`GroupDetails`] — the group row joined with
//! its owner summary and full membership list. Listings batch the owner
//! and membership lookups per result set instead of per group.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use studyfinder_core::FinderResult;
use studyfinder_core::models::group::{
    CreateStudyGroup, GroupDetails, GroupStatus, OwnerSummary, StudyGroup,
};
use studyfinder_core::models::membership::Membership;
use studyfinder_core::repository::GroupRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GroupRowWithId {
    record_id: String,
    name: String,
    bio: Option<String>,
    subjects: Vec<String>,
    scheduling_link: Option<String>,
    session_dates: Vec<String>,
    session_time: String,
    location: String,
    status: String,
    owner_id: String,
    created_at: DateTime<Utc>,
}

/// Owner fields selected for listing assembly.
#[derive(Debug, SurrealValue)]
struct OwnerRow {
    record_id: String,
    username: String,
    name: String,
    avatar_url: Option<String>,
}

#[derive(Debug, SurrealValue)]
struct MembershipRow {
    record_id: String,
    user_id: String,
    group_id: String,
    username: String,
    joined_at: DateTime<Utc>,
}

/// Row struct for ownership checks.
#[derive(Debug, SurrealValue)]
struct OwnerIdRow {
    owner_id: String,
}

fn parse_status(s: &str) -> Result<GroupStatus, DbError> {
    match s {
        "active" => Ok(GroupStatus::Active),
        other => Err(DbError::Decode(format!("unknown group status: {other}"))),
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))
}

impl GroupRowWithId {
    fn try_into_group(self) -> Result<StudyGroup, DbError> {
        Ok(StudyGroup {
            id: parse_uuid(&self.record_id)?,
            name: self.name,
            bio: self.bio,
            subjects: self.subjects,
            scheduling_link: self.scheduling_link,
            session_dates: self.session_dates,
            session_time: self.session_time,
            location: self.location,
            status: parse_status(&self.status)?,
            owner_id: parse_uuid(&self.owner_id)?,
            created_at: self.created_at,
        })
    }
}

impl OwnerRow {
    fn try_into_summary(self) -> Result<OwnerSummary, DbError> {
        Ok(OwnerSummary {
            id: parse_uuid(&self.record_id)?,
            username: self.username,
            name: self.name,
            avatar_url: self.avatar_url,
        })
    }
}

impl MembershipRow {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        Ok(Membership {
            id: parse_uuid(&self.record_id)?,
            user_id: parse_uuid(&self.user_id)?,
            group_id: parse_uuid(&self.group_id)?,
            username: self.username,
            joined_at: self.joined_at,
        })
    }
}

/// SurrealDB implementation of the Group repository.
#[derive(Clone)]
pub struct SurrealGroupRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGroupRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Join a batch of group rows with their owners and memberships.
    async fn assemble(&self, rows: Vec<GroupRowWithId>) -> Result<Vec<GroupDetails>, DbError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let owner_ids: Vec<String> = rows.iter().map(|r| r.owner_id.clone()).collect();
        let group_ids: Vec<String> = rows.iter().map(|r| r.record_id.clone()).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, username, name, \
                 avatar_url FROM user WHERE meta::id(id) IN $owner_ids; \
                 SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE group_id IN $group_ids ORDER BY joined_at ASC;",
            )
            .bind(("owner_ids", owner_ids))
            .bind(("group_ids", group_ids))
            .await
            .map_err(DbError::from)?;

        let owner_rows: Vec<OwnerRow> = result.take(0).map_err(DbError::from)?;
        let membership_rows: Vec<MembershipRow> = result.take(1).map_err(DbError::from)?;

        let mut owners: HashMap<String, OwnerSummary> = HashMap::new();
        for row in owner_rows {
            owners.insert(row.record_id.clone(), row.try_into_summary()?);
        }

        let mut members: HashMap<String, Vec<Membership>> = HashMap::new();
        for row in membership_rows {
            let key = row.group_id.clone();
            members
                .entry(key)
                .or_default()
                .push(row.try_into_membership()?);
        }

        let mut details = Vec::with_capacity(rows.len());
        for row in rows {
            let owner = owners.get(&row.owner_id).cloned().ok_or_else(|| {
                DbError::NotFound {
                    entity: "user".into(),
                    id: row.owner_id.clone(),
                }
            })?;
            let group_members = members.remove(&row.record_id).unwrap_or_default();
            details.push(GroupDetails {
                group: row.try_into_group()?,
                owner,
                members: group_members,
            });
        }

        Ok(details)
    }

    async fn select_details(
        &self,
        query: &str,
        binding: (&'static str, String),
    ) -> Result<Vec<GroupDetails>, DbError> {
        let mut result = self
            .db
            .query(query)
            .bind(binding)
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRowWithId> = result.take(0).map_err(DbError::from)?;
        self.assemble(rows).await
    }
}

impl<C: Connection> GroupRepository for SurrealGroupRepository<C> {
    async fn create(&self, input: CreateStudyGroup) -> FinderResult<GroupDetails> {
        let group_id = Uuid::new_v4();
        let membership_id = Uuid::new_v4();

        // Group and owner membership are created atomically; the owner is
        // a member from the first visible instant.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('study_group', $group_id) SET \
                 name = $name, bio = $bio, subjects = $subjects, \
                 scheduling_link = $scheduling_link, \
                 session_dates = $session_dates, \
                 session_time = $session_time, location = $location, \
                 status = 'active', owner_id = $owner_id; \
                 CREATE type::record('membership', $membership_id) SET \
                 user_id = $owner_id, group_id = $group_id, \
                 username = $owner_username; \
                 COMMIT TRANSACTION;",
            )
            .bind(("group_id", group_id.to_string()))
            .bind(("membership_id", membership_id.to_string()))
            .bind(("name", input.name))
            .bind(("bio", input.bio))
            .bind(("subjects", input.subjects))
            .bind(("scheduling_link", input.scheduling_link))
            .bind(("session_dates", input.session_dates))
            .bind(("session_time", input.session_time))
            .bind(("location", input.location))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("owner_username", input.owner_username))
            .await
            .map_err(DbError::classify)?;

        result.check().map_err(DbError::classify)?;

        self.get_by_id(group_id).await
    }

    async fn get_by_id(&self, id: Uuid) -> FinderResult<GroupDetails> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('study_group', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRowWithId> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "study group".into(),
                id: id_str,
            }
            .into());
        }

        let mut details = self.assemble(rows).await?;
        Ok(details.remove(0))
    }

    async fn delete_owned(&self, owner_id: Uuid, group_id: Uuid) -> FinderResult<()> {
        let id_str = group_id.to_string();

        // Missing and not-owned collapse into the same NotFound so the
        // caller cannot probe for existence.
        let mut check = self
            .db
            .query("SELECT owner_id FROM type::record('study_group', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OwnerIdRow> = check.take(0).map_err(DbError::from)?;
        let owned = rows
            .first()
            .is_some_and(|r| r.owner_id == owner_id.to_string());
        if !owned {
            return Err(DbError::NotFound {
                entity: "study group".into(),
                id: id_str,
            }
            .into());
        }

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE membership WHERE group_id = $id; \
                 DELETE type::record('study_group', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::classify)?;

        Ok(())
    }

    async fn list_all(&self) -> FinderResult<Vec<GroupDetails>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM study_group \
                 ORDER BY created_at DESC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(self.assemble(rows).await?)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> FinderResult<Vec<GroupDetails>> {
        Ok(self
            .select_details(
                "SELECT meta::id(id) AS record_id, * FROM study_group \
                 WHERE owner_id = $owner_id ORDER BY created_at DESC",
                ("owner_id", owner_id.to_string()),
            )
            .await?)
    }

    async fn list_by_member(&self, user_id: Uuid) -> FinderResult<Vec<GroupDetails>> {
        Ok(self
            .select_details(
                "SELECT meta::id(id) AS record_id, * FROM study_group \
                 WHERE meta::id(id) IN (\
                     SELECT VALUE group_id FROM membership \
                     WHERE user_id = $user_id\
                 ) \
                 ORDER BY created_at DESC",
                ("user_id", user_id.to_string()),
            )
            .await?)
    }

    async fn search_name_bio(&self, query: &str) -> FinderResult<Vec<GroupDetails>> {
        Ok(self
            .select_details(
                "SELECT meta::id(id) AS record_id, * FROM study_group \
                 WHERE string::contains(string::lowercase(name), $query) \
                 OR string::contains(string::lowercase(bio ?? ''), $query) \
                 ORDER BY created_at DESC",
                ("query", query.to_lowercase()),
            )
            .await?)
    }
}
